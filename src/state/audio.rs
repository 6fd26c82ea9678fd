// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audio routing derived from layers and audio reads.

use serde::Serialize;
use serde_json::Value;

use crate::protocol::Payload;
use crate::response::coerce::as_int;
use crate::response::{AudioOption, Layer, input_options, output_options, selected_audio_layer};
use crate::types::Volume;

/// The audio sources a poll reads from.
///
/// `screen_audio` is the `audio` block of `screen/readDetail`; `detail` and
/// `list` are the first successful audio detail and list fallback reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioSources<'a> {
    /// Merged layers of the screen.
    pub layers: &'a [Layer],
    /// `audio` block of the screen detail.
    pub screen_audio: Option<&'a Payload>,
    /// Audio detail reply.
    pub detail: Option<&'a Payload>,
    /// Audio list reply.
    pub list: Option<&'a Payload>,
}

/// Derived audio routing of a screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioState {
    /// Selectable inputs.
    pub inputs: Vec<AudioOption>,
    /// Selectable outputs.
    pub outputs: Vec<AudioOption>,
    /// Layer whose audio is open, lowest id first.
    pub input_id: Option<i64>,
    /// Active output.
    pub output_id: Option<i64>,
    /// Output volume.
    pub volume: Option<Volume>,
    /// Output mute.
    pub muted: Option<bool>,
}

/// First key present in `record`, even when its value is unusable.
fn first_present<'a>(record: &'a Payload, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(*key))
}

#[allow(clippy::cast_possible_truncation)]
fn volume_of(record: &Payload) -> Option<Volume> {
    let value = first_present(record, &["volume", "outputVolume"])?;
    let level = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))?;
    Some(Volume::clamped(level))
}

#[allow(clippy::cast_possible_truncation)]
fn muted_of(record: &Payload) -> Option<bool> {
    match first_present(record, &["mute", "muted"])? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(|n| n != 0),
        _ => None,
    }
}

impl AudioState {
    /// Derives the audio routing.
    ///
    /// The input options and selection come from layers (`isAvailable` and
    /// `isOpen`). List-endpoint inputs are used only when no layer is
    /// eligible. Outputs come from the list read, else the detail read, else
    /// the screen block. The screen block overrides output id, volume and
    /// mute read from the detail.
    ///
    /// # Examples
    ///
    /// ```
    /// use novastar_h::state::{AudioSources, AudioState};
    /// use serde_json::json;
    ///
    /// let block = json!({"outputChannelMode": 2, "volume": 140});
    /// let audio = AudioState::derive(AudioSources {
    ///     screen_audio: block.as_object(),
    ///     ..AudioSources::default()
    /// });
    /// assert_eq!(audio.output_id, Some(2));
    /// assert_eq!(audio.volume.map(|v| v.value()), Some(100));
    /// assert_eq!(audio.input_id, None);
    /// ```
    #[must_use]
    pub fn derive(sources: AudioSources<'_>) -> Self {
        let mut inputs: Vec<AudioOption> = sources
            .layers
            .iter()
            .filter(|l| l.is_audio_available())
            .map(|l| AudioOption::new(l.layer_id, l.audio_label()))
            .collect();
        inputs.sort_by_key(|o| o.id);

        let mut state = Self {
            input_id: selected_audio_layer(sources.layers),
            ..Self::default()
        };

        if let Some(list) = sources.list {
            state.outputs = output_options(list);
            if inputs.is_empty() {
                inputs = input_options(list);
            }
        }

        if let Some(detail) = sources.detail {
            state.output_id = first_present(
                detail,
                &["audioOutputId", "outputId", "outputChannelMode"],
            )
            .and_then(as_int);
            state.volume = volume_of(detail);
            state.muted = muted_of(detail);
            if state.outputs.is_empty() {
                state.outputs = output_options(detail);
            }
        }

        if let Some(block) = sources.screen_audio {
            if let Some(id) = block.get("outputChannelMode").and_then(as_int) {
                state.output_id = Some(id);
            }
            if let Some(volume) = volume_of(block) {
                state.volume = Some(volume);
            }
            if let Some(muted) = muted_of(block) {
                state.muted = Some(muted);
            }
            if state.outputs.is_empty() {
                state.outputs = output_options(block);
            }
        }

        state.inputs = inputs;
        state
    }
}
