//! Typed field extraction
//!
//! Each helper returns `Some` only if the key is present and holds a value
//! of the requested type that fits its range. Integers stored as floats
//! (`10.0`) are rejected, matching the backend's integer encoding.

use serde_json::Value;

use super::ConfigDocument;

fn unsigned(document: &ConfigDocument, key: &str) -> Option<u64> {
    document.get(key).and_then(Value::as_u64)
}

/// Unsigned 8-bit integer field
pub fn u8_field(document: &ConfigDocument, key: &str) -> Option<u8> {
    unsigned(document, key).and_then(|v| u8::try_from(v).ok())
}

/// Unsigned 16-bit integer field
pub fn u16_field(document: &ConfigDocument, key: &str) -> Option<u16> {
    unsigned(document, key).and_then(|v| u16::try_from(v).ok())
}

/// Unsigned 32-bit integer field
pub fn u32_field(document: &ConfigDocument, key: &str) -> Option<u32> {
    unsigned(document, key).and_then(|v| u32::try_from(v).ok())
}

/// Signed 32-bit integer field
pub fn i32_field(document: &ConfigDocument, key: &str) -> Option<i32> {
    document
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
}

/// Numeric field as `f32`; integers are accepted
pub fn f32_field(document: &ConfigDocument, key: &str) -> Option<f32> {
    document.get(key).and_then(Value::as_f64).map(|v| v as f32)
}

/// Boolean field
pub fn bool_field(document: &ConfigDocument, key: &str) -> Option<bool> {
    document.get(key).and_then(Value::as_bool)
}

/// String field
pub fn str_field<'a>(document: &'a ConfigDocument, key: &str) -> Option<&'a str> {
    document.get(key).and_then(Value::as_str)
}
