// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background entries from `bkg/readAllList`.

use serde::Serialize;
use serde_json::Value;

use super::coerce::as_int;

/// A stored background image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Background {
    /// Background id.
    #[serde(rename = "bkgId")]
    pub bkg_id: i64,
    /// Name from `general.name`, else `name`, else `BKG {id}`.
    pub name: String,
}

impl Background {
    /// Parses one list entry. Returns `None` without a valid `bkgId`.
    #[must_use]
    pub fn from_value(entry: &Value) -> Option<Self> {
        let bkg_id = entry.get("bkgId").and_then(as_int)?;
        let name = entry
            .get("general")
            .and_then(|g| g.get("name"))
            .and_then(Value::as_str)
            .or_else(|| entry.get("name").and_then(Value::as_str))
            .map_or_else(|| format!("BKG {bkg_id}"), str::to_string);
        Some(Self { bkg_id, name })
    }

    /// Parses a list reply, sorted by id. Returns `None` when the reply is
    /// not a list.
    #[must_use]
    pub fn parse_list(reply: &Value) -> Option<Vec<Self>> {
        let entries = reply.as_array()?;
        let mut parsed: Vec<Self> = entries.iter().filter_map(Self::from_value).collect();
        parsed.sort_by_key(|b| b.bkg_id);
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_precedence() {
        let general = Background::from_value(&json!({
            "bkgId": 1, "name": "outer", "general": {"name": "inner"}
        }))
        .unwrap();
        assert_eq!(general.name, "inner");

        let outer = Background::from_value(&json!({"bkgId": 2, "name": "outer"})).unwrap();
        assert_eq!(outer.name, "outer");

        let synthetic = Background::from_value(&json!({"bkgId": 3, "general": {}})).unwrap();
        assert_eq!(synthetic.name, "BKG 3");
    }

    #[test]
    fn parse_list_sorts_and_drops_invalid() {
        let list = Background::parse_list(&json!([
            {"bkgId": 5},
            {"name": "no id"},
            "junk",
            {"bkgId": 0, "name": "Black"},
        ]))
        .unwrap();

        let ids: Vec<_> = list.iter().map(|b| b.bkg_id).collect();
        assert_eq!(ids, vec![0, 5]);
    }

    #[test]
    fn parse_list_rejects_non_list() {
        assert!(Background::parse_list(&json!({"bkgs": []})).is_none());
    }
}
