// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audio option lists.

use serde::Serialize;
use serde_json::Value;

use super::coerce::{as_int, non_empty_str};
use crate::protocol::Payload;

const INPUT_ID_KEYS: [&str; 4] = ["audioInputId", "inputId", "inputChannelMode", "id"];
const OUTPUT_ID_KEYS: [&str; 4] = ["audioOutputId", "outputId", "outputChannelMode", "id"];
const INPUT_CONTAINERS: [&str; 3] = ["inputs", "audioInputs", "inputList"];
const OUTPUT_CONTAINERS: [&str; 3] = ["outputs", "audioOutputs", "outputList"];

/// A selectable audio input or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioOption {
    /// Option id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl AudioOption {
    /// Creates an option.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

fn normalize(items: &[Value], id_keys: &[&str], prefix: &str) -> Vec<AudioOption> {
    let mut options: Vec<AudioOption> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let id = id_keys
                .iter()
                .find_map(|key| item.get(*key).and_then(as_int))?;
            let name = ["name", "defaultName"]
                .iter()
                .find_map(|key| item.get(*key).and_then(non_empty_str))
                .map_or_else(|| format!("{prefix} {id}"), str::to_string);
            Some(AudioOption { id, name })
        })
        .collect();
    options.sort_by_key(|o| o.id);
    options
}

fn first_non_empty(
    container: &Payload,
    keys: &[&str],
    id_keys: &[&str],
    prefix: &str,
) -> Vec<AudioOption> {
    keys.iter()
        .filter_map(|key| container.get(*key).and_then(Value::as_array))
        .map(|items| normalize(items, id_keys, prefix))
        .find(|options| !options.is_empty())
        .unwrap_or_default()
}

/// Audio input options listed in `container`.
#[must_use]
pub fn input_options(container: &Payload) -> Vec<AudioOption> {
    first_non_empty(container, &INPUT_CONTAINERS, &INPUT_ID_KEYS, "Audio Input")
}

/// Audio output options listed in `container`.
#[must_use]
pub fn output_options(container: &Payload) -> Vec<AudioOption> {
    first_non_empty(container, &OUTPUT_CONTAINERS, &OUTPUT_ID_KEYS, "Audio Output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::payload;
    use serde_json::json;

    #[test]
    fn outputs_use_id_key_order_and_sort() {
        let container = payload(json!({
            "outputs": [
                {"outputId": 3, "name": "Line"},
                {"audioOutputId": 1, "outputId": 9, "defaultName": "HDMI"},
                {"name": "no id"},
                "junk",
            ]
        }));

        assert_eq!(
            output_options(&container),
            vec![AudioOption::new(1, "HDMI"), AudioOption::new(3, "Line")]
        );
    }

    #[test]
    fn falls_through_empty_containers() {
        let container = payload(json!({
            "inputs": [{"name": "no id"}],
            "audioInputs": [{"inputChannelMode": "2", "name": "  "}],
        }));

        assert_eq!(input_options(&container), vec![AudioOption::new(2, "Audio Input 2")]);
        assert!(output_options(&container).is_empty());
    }
}
