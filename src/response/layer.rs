// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layer records from `layer/detailList` merged with `layer/readDetail`.

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::coerce::{as_int, int_field, non_empty_str};
use crate::protocol::Payload;

/// A compositing layer on a screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Layer id.
    #[serde(rename = "layerId")]
    pub layer_id: i64,
    /// The `general` block; required for layer audio writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general: Option<Payload>,
    /// Geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<Payload>,
    /// The routed input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LayerSource>,
    /// Audio availability and open state.
    #[serde(rename = "audioStatus", skip_serializing_if = "Option::is_none")]
    pub audio_status: Option<AudioStatus>,
    /// Remaining vendor keys.
    #[serde(flatten)]
    pub extra: Payload,
}

/// A layer's `source` block.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSource {
    /// Routed input id.
    pub input_id: Option<i64>,
    /// Slot id of the routed input.
    pub slot_id: Option<i64>,
    /// Interface type of the routed input.
    pub interface_type: Option<i64>,
    /// Source name, trimmed.
    pub name: Option<String>,
    /// The block as reported.
    pub raw: Payload,
}

/// A layer's `audioStatus` block.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStatus {
    /// `isAvailable == 1`.
    pub is_available: bool,
    /// `isOpen == 1`.
    pub is_open: bool,
    /// The block as reported.
    pub raw: Payload,
}

impl LayerSource {
    fn from_map(raw: Payload) -> Self {
        Self {
            input_id: int_field(&raw, "inputId"),
            slot_id: int_field(&raw, "slotId"),
            interface_type: int_field(&raw, "interfaceType"),
            name: raw.get("name").and_then(non_empty_str).map(str::to_string),
            raw,
        }
    }
}

impl AudioStatus {
    fn from_map(raw: Payload) -> Self {
        Self {
            is_available: int_field(&raw, "isAvailable") == Some(1),
            is_open: int_field(&raw, "isOpen") == Some(1),
            raw,
        }
    }
}

impl Serialize for LayerSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl Serialize for AudioStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Takes `key` out of `record` when it is a mapping; other values stay.
fn take_map(record: &mut Payload, key: &str) -> Option<Payload> {
    match record.remove(key) {
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            record.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

impl Layer {
    /// Builds a layer from a merged record. Returns `None` without a valid
    /// `layerId`.
    #[must_use]
    pub fn from_record(mut record: Payload) -> Option<Self> {
        let layer_id = record.remove("layerId").as_ref().and_then(as_int)?;
        Some(Self {
            layer_id,
            general: take_map(&mut record, "general"),
            window: take_map(&mut record, "window"),
            source: take_map(&mut record, "source").map(LayerSource::from_map),
            audio_status: take_map(&mut record, "audioStatus").map(AudioStatus::from_map),
            extra: record,
        })
    }

    /// Returns true when the layer can carry audio (`isAvailable == 1`).
    #[must_use]
    pub fn is_audio_available(&self) -> bool {
        self.audio_status.as_ref().is_some_and(|s| s.is_available)
    }

    /// Returns true when the layer's audio is open (`isOpen == 1`).
    #[must_use]
    pub fn is_audio_open(&self) -> bool {
        self.audio_status.as_ref().is_some_and(|s| s.is_open)
    }

    /// Layer name from `general.name`, else `Layer {id}`.
    #[must_use]
    pub fn name(&self) -> String {
        self.general
            .as_ref()
            .and_then(|g| g.get("name"))
            .and_then(non_empty_str)
            .map_or_else(|| format!("Layer {}", self.layer_id), str::to_string)
    }

    /// Label used for this layer as an audio input option.
    ///
    /// # Examples
    ///
    /// ```
    /// use novastar_h::response::Layer;
    /// use serde_json::json;
    ///
    /// let record = json!({"layerId": 2, "source": {"name": "Camera"}});
    /// let layer = Layer::from_record(record.as_object().unwrap().clone()).unwrap();
    /// assert_eq!(layer.audio_label(), "Camera (Layer 2)");
    /// ```
    #[must_use]
    pub fn audio_label(&self) -> String {
        let source = self
            .source
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("Input");
        format!("{source} (Layer {})", self.layer_id)
    }

    /// Returns a vendor key not covered by a typed field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// The lowest id among layers whose audio is open.
#[must_use]
pub fn selected_audio_layer(layers: &[Layer]) -> Option<i64> {
    layers
        .iter()
        .filter(|l| l.is_audio_open())
        .map(|l| l.layer_id)
        .min()
}

/// Ids of layers whose audio is open, in list order.
#[must_use]
pub fn open_audio_layers(layers: &[Layer]) -> Vec<i64> {
    layers
        .iter()
        .filter(|l| l.is_audio_open())
        .map(|l| l.layer_id)
        .collect()
}
