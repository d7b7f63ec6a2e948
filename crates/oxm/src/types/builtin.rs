// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in scalar converters.

use super::{ConversionError, TypeConverter};
use crate::object::Value;
use chrono::{NaiveDate, NaiveDateTime};

pub const STRING: &str = "string";
pub const INTEGER: &str = "integer";
pub const BOOLEAN: &str = "boolean";
pub const FLOAT: &str = "float";
pub const DATETIME: &str = "datetime";
pub const DATE: &str = "date";

/// Wire format written for `datetime` values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Space-separated form also accepted on read.
const DATETIME_FORMAT_SPACED: &str = "%Y-%m-%d %H:%M:%S";

/// Wire format for `date` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Non-string types treat an empty wire value as null.
fn non_empty(wire: Option<&str>) -> Option<&str> {
    wire.map(str::trim).filter(|s| !s.is_empty())
}

/// Text, passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl TypeConverter for StringType {
    fn name(&self) -> &str {
        STRING
    }

    fn to_wire(&self, value: &Value) -> Result<Option<String>, ConversionError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Err(ConversionError::mismatch(STRING, other)),
        }
    }

    fn to_native(&self, wire: Option<&str>) -> Result<Value, ConversionError> {
        Ok(wire.map_or(Value::Null, Value::from))
    }
}

/// Signed 64-bit integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

impl TypeConverter for IntegerType {
    fn name(&self) -> &str {
        INTEGER
    }

    fn to_wire(&self, value: &Value) -> Result<Option<String>, ConversionError> {
        match value {
            Value::Null => Ok(None),
            Value::Int(v) => Ok(Some(v.to_string())),
            other => Err(ConversionError::mismatch(INTEGER, other)),
        }
    }

    fn to_native(&self, wire: Option<&str>) -> Result<Value, ConversionError> {
        match non_empty(wire) {
            None => Ok(Value::Null),
            Some(s) => s
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| ConversionError::invalid(INTEGER, s, e)),
        }
    }
}

/// `true`/`false` (read also accepts `1`/`0`).
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl TypeConverter for BooleanType {
    fn name(&self) -> &str {
        BOOLEAN
    }

    fn to_wire(&self, value: &Value) -> Result<Option<String>, ConversionError> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(v) => Ok(Some(v.to_string())),
            other => Err(ConversionError::mismatch(BOOLEAN, other)),
        }
    }

    fn to_native(&self, wire: Option<&str>) -> Result<Value, ConversionError> {
        match non_empty(wire) {
            None => Ok(Value::Null),
            Some("true" | "1") => Ok(Value::Bool(true)),
            Some("false" | "0") => Ok(Value::Bool(false)),
            Some(s) => Err(ConversionError::invalid(
                BOOLEAN,
                s,
                "expected true, false, 1 or 0",
            )),
        }
    }
}

/// 64-bit float.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl TypeConverter for FloatType {
    fn name(&self) -> &str {
        FLOAT
    }

    fn to_wire(&self, value: &Value) -> Result<Option<String>, ConversionError> {
        match value {
            Value::Null => Ok(None),
            Value::Float(v) => Ok(Some(v.to_string())),
            Value::Int(v) => Ok(Some(v.to_string())),
            other => Err(ConversionError::mismatch(FLOAT, other)),
        }
    }

    fn to_native(&self, wire: Option<&str>) -> Result<Value, ConversionError> {
        match non_empty(wire) {
            None => Ok(Value::Null),
            Some(s) => s
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| ConversionError::invalid(FLOAT, s, e)),
        }
    }
}

/// Date and time without offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeType;

impl TypeConverter for DateTimeType {
    fn name(&self) -> &str {
        DATETIME
    }

    fn to_wire(&self, value: &Value) -> Result<Option<String>, ConversionError> {
        match value {
            Value::Null => Ok(None),
            Value::DateTime(v) => Ok(Some(v.format(DATETIME_FORMAT).to_string())),
            other => Err(ConversionError::mismatch(DATETIME, other)),
        }
    }

    fn to_native(&self, wire: Option<&str>) -> Result<Value, ConversionError> {
        let Some(s) = non_empty(wire) else {
            return Ok(Value::Null);
        };
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT_SPACED))
            .map(Value::DateTime)
            .map_err(|e| ConversionError::invalid(DATETIME, s, e))
    }
}

/// Calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl TypeConverter for DateType {
    fn name(&self) -> &str {
        DATE
    }

    fn to_wire(&self, value: &Value) -> Result<Option<String>, ConversionError> {
        match value {
            Value::Null => Ok(None),
            Value::Date(v) => Ok(Some(v.format(DATE_FORMAT).to_string())),
            Value::DateTime(v) => Ok(Some(v.date().format(DATE_FORMAT).to_string())),
            other => Err(ConversionError::mismatch(DATE, other)),
        }
    }

    fn to_native(&self, wire: Option<&str>) -> Result<Value, ConversionError> {
        let Some(s) = non_empty(wire) else {
            return Ok(Value::Null);
        };
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|e| ConversionError::invalid(DATE, s, e))
    }
}
