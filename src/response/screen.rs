// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Screen and preset lists.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{lenient_string, required_int};

/// A screen from `screen/readList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    /// Screen id.
    #[serde(rename = "screenId", deserialize_with = "required_int")]
    pub screen_id: i64,
    /// Screen name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

/// A preset from `preset/readList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Preset id.
    #[serde(rename = "presetId", deserialize_with = "required_int")]
    pub preset_id: i64,
    /// Preset name, possibly empty.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl Preset {
    /// Returns the label shown for this preset: its name, or `Preset {id}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use novastar_h::response::Preset;
    ///
    /// let preset = Preset { preset_id: 4, name: String::new() };
    /// assert_eq!(preset.label(), "Preset 4");
    /// ```
    #[must_use]
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            synthetic_preset_label(self.preset_id)
        } else {
            self.name.clone()
        }
    }
}

/// Label for a preset id that has no name or is not listed.
#[must_use]
pub fn synthetic_preset_label(preset_id: i64) -> String {
    format!("Preset {preset_id}")
}

/// Parses the entries of `reply[key]`, dropping entries that do not parse.
pub(crate) fn parse_list<T: DeserializeOwned>(reply: &Value, key: &str) -> Vec<T> {
    let Some(entries) = reply.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match T::deserialize(entry) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(key, error = %e, "Dropping list entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_screens() {
        let reply = json!({"screens": [
            {"screenId": 0, "name": "Main"},
            {"screenId": "1"},
            {"name": "no id"},
        ]});
        let screens: Vec<Screen> = parse_list(&reply, "screens");

        assert_eq!(screens.len(), 2);
        assert_eq!(screens[0].name, "Main");
        assert_eq!(screens[1].screen_id, 1);
        assert_eq!(screens[1].name, "");
    }

    #[test]
    fn parse_presets_missing_key() {
        let presets: Vec<Preset> = parse_list(&json!({"other": []}), "presets");
        assert!(presets.is_empty());
        let presets: Vec<Preset> = parse_list(&json!([]), "presets");
        assert!(presets.is_empty());
    }

    #[test]
    fn preset_label_prefers_name() {
        let named = Preset {
            preset_id: 1,
            name: "Show A".into(),
        };
        assert_eq!(named.label(), "Show A");
        assert_eq!(synthetic_preset_label(9), "Preset 9");
    }
}
