// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input records from `input/readList` merged with `input/readDetail`.

use serde::Serialize;
use serde_json::Value;

use super::coerce::{as_int, int_field, is_truthy, non_empty_str};
use crate::protocol::Payload;

/// A physical input port.
///
/// Keys the engine does not interpret are kept in [`extra`](Self::extra)
/// and serialized back alongside the typed fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Input {
    /// Input id.
    #[serde(rename = "inputId")]
    pub input_id: i64,
    /// The `general` block (name, crop, etc.).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general: Option<Payload>,
    /// Remaining vendor keys.
    #[serde(flatten)]
    pub extra: Payload,
}

impl Input {
    /// Builds an input from a merged record. Returns `None` without a valid
    /// `inputId`.
    #[must_use]
    pub fn from_record(mut record: Payload) -> Option<Self> {
        let input_id = record.remove("inputId").as_ref().and_then(as_int)?;
        let general = match record.remove("general") {
            Some(Value::Object(general)) => Some(general),
            Some(other) => {
                record.insert("general".into(), other);
                None
            }
            None => None,
        };
        Some(Self {
            input_id,
            general,
            extra: record,
        })
    }

    /// Display name: `general.name`, then `name`, then `Input {id}`.
    #[must_use]
    pub fn name(&self) -> String {
        self.general
            .as_ref()
            .and_then(|g| g.get("name"))
            .and_then(non_empty_str)
            .or_else(|| self.extra.get("name").and_then(non_empty_str))
            .map_or_else(|| format!("Input {}", self.input_id), str::to_string)
    }

    /// Returns true when the vendor reports the input online.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.extra.get("online").is_some_and(is_truthy)
    }

    /// Signal status (`iSignal`).
    #[must_use]
    pub fn signal(&self) -> Option<i64> {
        int_field(&self.extra, "iSignal")
    }

    /// Interface type code.
    #[must_use]
    pub fn interface_type(&self) -> Option<i64> {
        int_field(&self.extra, "interfaceType")
    }

    /// Slot id, when reported.
    #[must_use]
    pub fn slot_id(&self) -> Option<i64> {
        int_field(&self.extra, "slotId")
    }

    /// Returns a vendor key not covered by a typed accessor.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::payload;
    use serde_json::json;

    #[test]
    fn from_record_splits_known_keys() {
        let input = Input::from_record(payload(json!({
            "inputId": 2,
            "online": 1,
            "iSignal": 1,
            "interfaceType": 7,
            "general": {"name": " HDMI 1 "},
            "resolution": {"width": 1920},
        })))
        .unwrap();

        assert_eq!(input.input_id, 2);
        assert_eq!(input.name(), "HDMI 1");
        assert!(input.is_online());
        assert_eq!(input.signal(), Some(1));
        assert_eq!(input.interface_type(), Some(7));
        assert_eq!(input.get("resolution"), Some(&json!({"width": 1920})));
        assert!(input.get("inputId").is_none());
    }

    #[test]
    fn from_record_requires_id() {
        assert!(Input::from_record(payload(json!({"online": 1}))).is_none());
        assert!(Input::from_record(payload(json!({"inputId": true}))).is_none());
    }

    #[test]
    fn name_fallbacks() {
        let plain = Input::from_record(payload(json!({"inputId": 4, "name": "SDI"}))).unwrap();
        assert_eq!(plain.name(), "SDI");

        let bare = Input::from_record(payload(json!({"inputId": 5, "general": 3}))).unwrap();
        assert_eq!(bare.name(), "Input 5");
        assert!(bare.general.is_none());
        assert_eq!(bare.get("general"), Some(&json!(3)));
    }

    #[test]
    fn serializes_vendor_shape() {
        let record = payload(json!({"inputId": 1, "online": 0, "general": {"name": "A"}}));
        let input = Input::from_record(record.clone()).unwrap();
        assert_eq!(serde_json::to_value(&input).unwrap(), Value::Object(record));
    }
}
