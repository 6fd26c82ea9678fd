// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lenient value coercion for vendor JSON.
//!
//! Firmware releases disagree on field types: the same id may arrive as an
//! integer, a float or a numeric string. These helpers are applied once,
//! when a reply is turned into a typed record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::protocol::Payload;

/// Coerces an id-like value to an integer.
///
/// Accepts integers, finite floats (truncated) and all-digit strings.
/// Booleans are never ids.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

/// Returns the value as a mapping.
#[must_use]
pub fn as_map(value: &Value) -> Option<&Payload> {
    value.as_object()
}

/// Returns the trimmed string when it is non-empty.
#[must_use]
pub fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Truthiness of a vendor field: null, false, zero and empty values are
/// unset.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Reads `key` from `record` as an integer.
#[must_use]
pub fn int_field(record: &Payload, key: &str) -> Option<i64> {
    record.get(key).and_then(as_int)
}

// ============================================================================
// serde adapters
// ============================================================================

pub(crate) fn required_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    as_int(&value).ok_or_else(|| serde::de::Error::custom(format!("expected an id, got {value}")))
}

pub(crate) fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(as_int(&Value::deserialize(deserializer)?).unwrap_or(0))
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn as_int_accepts_numeric_shapes() {
        assert_eq!(as_int(&json!(7)), Some(7));
        assert_eq!(as_int(&json!(-3)), Some(-3));
        assert_eq!(as_int(&json!(2.9)), Some(2));
        assert_eq!(as_int(&json!("12")), Some(12));
    }

    #[test]
    fn as_int_rejects_non_ids() {
        assert_eq!(as_int(&json!(true)), None);
        assert_eq!(as_int(&json!("1a")), None);
        assert_eq!(as_int(&json!("-1")), None);
        assert_eq!(as_int(&json!("")), None);
        assert_eq!(as_int(&json!(null)), None);
        assert_eq!(as_int(&json!({"id": 1})), None);
    }

    #[test]
    fn non_empty_str_trims() {
        assert_eq!(non_empty_str(&json!("  HDMI 1 ")), Some("HDMI 1"));
        assert_eq!(non_empty_str(&json!("   ")), None);
        assert_eq!(non_empty_str(&json!(5)), None);
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!({"k": 0})));
    }
}
