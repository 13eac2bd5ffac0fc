//! PostgreSQL-protocol type mappings.
//!
//! Redshift answers simple-query statements in text format. Column values are
//! decoded in two phases:
//! 1. `TypeCategory` classifies the column type name into a logical category
//! 2. `decode_column` extracts the value for that category
//!
//! Anything without a native scalar mapping (NUMERIC, dates, timestamps,
//! SUPER, ...) is returned as the server's text representation.

use crate::db::diagnostics::DriverError;
use crate::models::SqlValue;
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::{Column, Decode, Row, Type, TypeInfo};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Boolean,
    Binary,
    Text,
}

/// Classify a PostgreSQL/Redshift type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    match type_name.to_lowercase().as_str() {
        "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint" => TypeCategory::Integer,
        "float4" | "float8" | "real" | "double precision" => TypeCategory::Float,
        "bool" | "boolean" => TypeCategory::Boolean,
        "bytea" | "varbyte" => TypeCategory::Binary,
        _ => TypeCategory::Text,
    }
}

// =============================================================================
// Raw Text Support
// =============================================================================

/// Wrapper for a column value read as the server's raw text, whatever its type.
#[derive(Debug)]
pub struct RawText(pub String);

impl Type<sqlx::Postgres> for RawText {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawText {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawText(s.to_string()))
    }
}

// =============================================================================
// Row Decoding
// =============================================================================

/// Column names of a row, in order.
pub fn column_names(row: &PgRow) -> Vec<String> {
    row.columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect()
}

/// Decode every column of a row, in order.
///
/// A value that cannot be read even as text fails the whole row.
pub fn decode_row(row: &PgRow) -> Result<Vec<SqlValue>, DriverError> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| decode_column(row, idx, categorize_type(col.type_info().name())))
        .collect()
}

fn decode_column(
    row: &PgRow,
    idx: usize,
    category: TypeCategory,
) -> Result<SqlValue, DriverError> {
    match category {
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Boolean => decode_boolean(row, idx),
        TypeCategory::Binary => decode_binary(row, idx),
        TypeCategory::Text => decode_text(row, idx),
    }
}

fn decode_integer(row: &PgRow, idx: usize) -> Result<SqlValue, DriverError> {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return Ok(v.into());
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return Ok(v.map(i64::from).into());
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
        return Ok(v.map(i64::from).into());
    }
    decode_text(row, idx)
}

fn decode_float(row: &PgRow, idx: usize) -> Result<SqlValue, DriverError> {
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return Ok(v.into());
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return Ok(v.map(f64::from).into());
    }
    decode_text(row, idx)
}

fn decode_boolean(row: &PgRow, idx: usize) -> Result<SqlValue, DriverError> {
    match row.try_get::<Option<bool>, _>(idx) {
        Ok(v) => Ok(v.into()),
        Err(_) => decode_text(row, idx),
    }
}

fn decode_binary(row: &PgRow, idx: usize) -> Result<SqlValue, DriverError> {
    match row.try_get::<Option<Vec<u8>>, _>(idx) {
        Ok(v) => Ok(v.into()),
        Err(_) => decode_text(row, idx),
    }
}

fn decode_text(row: &PgRow, idx: usize) -> Result<SqlValue, DriverError> {
    let value = row.try_get::<Option<RawText>, _>(idx)?;
    Ok(value.map(|raw| raw.0).into())
}
