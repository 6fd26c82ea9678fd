// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audio routing writes.
//!
//! The audio input of a screen is whichever layer has `audioStatus.isOpen`
//! set. Selecting an input therefore toggles layers, and every toggle is a
//! fallback table because firmware releases disagree on the endpoint and
//! payload shape.

use serde_json::json;

use super::Device;
use crate::protocol::{
    LayerOpenWrite, Transport, audio_input_writes, audio_output_writes, audio_volume_writes,
    extend, first_success, layer_open_writes,
};
use crate::response::Layer;
use crate::response::coerce::as_map;
use crate::types::{Target, Volume};

/// Debug trace emitted only with verbose logging enabled.
macro_rules! verbose {
    ($device:expr, $($arg:tt)+) => {
        if $device.verbose_logging {
            tracing::debug!($($arg)+);
        }
    };
}

/// Audio selection observed after a write.
#[derive(Debug)]
struct Selection {
    applied: bool,
    selected: Option<i64>,
    open: Vec<i64>,
}

impl Selection {
    fn observe(layers: &[Layer], layer_id: i64) -> Self {
        let open: Vec<i64> = layers
            .iter()
            .filter(|l| l.is_audio_available() && l.is_audio_open())
            .map(|l| l.layer_id)
            .collect();
        Self {
            applied: open == [layer_id],
            selected: open.iter().copied().min(),
            open,
        }
    }
}

impl<T: Transport> Device<T> {
    /// Selects the active audio output.
    pub async fn set_audio_output(&self, target: Target, output_id: i64) -> bool {
        let screen_audio = self.screen_audio(target).await;
        let candidates = audio_output_writes(&target.payload(), screen_audio.as_ref(), output_id);
        first_success(&self.transport, &candidates).await.is_some()
    }

    /// Sets the output volume, clamped to 0-100.
    pub async fn set_audio_volume(&self, target: Target, volume: i64) -> bool {
        let volume = Volume::clamped(volume);
        let screen_audio = self.screen_audio(target).await;
        let candidates =
            audio_volume_writes(&target.payload(), screen_audio.as_ref(), volume.value());
        first_success(&self.transport, &candidates).await.is_some()
    }

    /// Makes `layer_id` the only layer with open audio.
    ///
    /// Only layers with `audioStatus.isAvailable == 1` take part. Other open
    /// layers are closed before the target is opened; when a forced re-read
    /// does not confirm the selection the order is reversed, and as a last
    /// resort the layer's source input is routed with a screen-level write.
    /// Returns true only when a re-read shows the target as the single open
    /// layer.
    pub async fn set_audio_input(&self, target: Target, layer_id: i64) -> bool {
        let layers = self.layers(target).await;
        let eligible: Vec<&Layer> = layers.iter().filter(|l| l.is_audio_available()).collect();
        verbose!(
            self,
            screen_id = target.screen_id,
            layer_id,
            eligible = ?eligible.iter().map(|l| l.layer_id).collect::<Vec<_>>(),
            "Audio input set requested"
        );

        if eligible.is_empty() {
            verbose!(self, "Audio input set aborted: no layer carries audio");
            return false;
        }
        let Some(selected) = eligible.iter().copied().find(|l| l.layer_id == layer_id) else {
            verbose!(self, layer_id, "Audio input set aborted: layer not eligible");
            return false;
        };

        let mut any_updated = false;
        let mut selected_updated = false;

        for layer in eligible
            .iter()
            .filter(|l| l.layer_id != layer_id && l.is_audio_open())
        {
            any_updated |= self.write_layer_open(target, layer, false).await;
        }
        if self.write_layer_open(target, selected, true).await {
            any_updated = true;
            selected_updated = true;
        }

        let mut selection = self.observe_selection(target, layer_id).await;
        if !selection.applied {
            verbose!(
                self,
                layer_id,
                selected = ?selection.selected,
                open = ?selection.open,
                "Audio input not applied, retrying open-then-close"
            );

            let retry_layers = self.fresh_layers(target).await;
            let retry_selected = retry_layers
                .iter()
                .find(|l| l.is_audio_available() && l.layer_id == layer_id);
            if let Some(layer) = retry_selected
                && self.write_layer_open(target, layer, true).await
            {
                any_updated = true;
                selected_updated = true;
            }
            for layer in retry_layers
                .iter()
                .filter(|l| l.is_audio_available() && l.layer_id != layer_id && l.is_audio_open())
            {
                any_updated |= self.write_layer_open(target, layer, false).await;
            }

            selection = self.observe_selection(target, layer_id).await;
            if !selection.applied {
                let routed = retry_selected.unwrap_or(selected);
                self.route_screen_audio(target, routed).await;
                selection = self.observe_selection(target, layer_id).await;
                if selection.applied {
                    any_updated = true;
                    selected_updated = true;
                }
            }

            if !selection.applied {
                tracing::warn!(
                    screen_id = target.screen_id,
                    layer_id,
                    selected = ?selection.selected,
                    open = ?selection.open,
                    "Audio input selection could not be applied"
                );
            }
        }

        verbose!(
            self,
            layer_id,
            any_updated,
            selected_updated,
            applied = selection.applied,
            "Audio input set complete"
        );
        any_updated && selected_updated && selection.applied
    }

    async fn observe_selection(&self, target: Target, layer_id: i64) -> Selection {
        Selection::observe(&self.fresh_layers(target).await, layer_id)
    }

    /// Routes the layer's source input through screen-level audio writes.
    async fn route_screen_audio(&self, target: Target, layer: &Layer) {
        let source = layer.source.as_ref();
        let input_id = source.and_then(|s| s.input_id).unwrap_or(layer.layer_id);
        let screen_audio = self.screen_audio(target).await;
        let candidates = audio_input_writes(
            &target.payload(),
            screen_audio.as_ref(),
            input_id,
            source.and_then(|s| s.slot_id),
            source.and_then(|s| s.interface_type),
        );
        verbose!(
            self,
            layer_id = layer.layer_id,
            input_id,
            candidates = candidates.len(),
            "Audio input screen-level fallback"
        );
        let routed = first_success(&self.transport, &candidates).await.is_some();
        verbose!(self, routed, "Audio input screen-level fallback done");
    }

    /// Opens or closes one layer's audio. Skipped without a `general` record.
    async fn write_layer_open(&self, target: Target, layer: &Layer, open: bool) -> bool {
        let Some(audio_status) = layer.audio_status.as_ref() else {
            return false;
        };
        let detail = self.layer_detail(target, layer.layer_id).await;
        let general = detail
            .as_ref()
            .and_then(|d| d.get("general"))
            .and_then(as_map)
            .or(layer.general.as_ref());
        let Some(general) = general else {
            verbose!(self, layer_id = layer.layer_id, "Layer audio write skipped: no general record");
            return false;
        };

        let write = LayerOpenWrite {
            base: extend(&target.payload(), json!({"layerId": layer.layer_id})),
            layer_id: layer.layer_id,
            general,
            audio_status: &audio_status.raw,
            detail: detail.as_ref(),
            window: layer.window.as_ref(),
            source: layer.source.as_ref().map(|s| &s.raw),
            open,
        };

        for candidate in layer_open_writes(&write) {
            verbose!(
                self,
                layer_id = layer.layer_id,
                endpoint = candidate.endpoint,
                payload = %serde_json::Value::Object(candidate.payload.clone()),
                "Layer audio write attempt"
            );
            if self
                .transport
                .send(candidate.endpoint, &candidate.payload)
                .await
                .is_some()
            {
                verbose!(self, layer_id = layer.layer_id, endpoint = candidate.endpoint, "Layer audio write accepted");
                return true;
            }
        }
        verbose!(self, layer_id = layer.layer_id, open, "Layer audio write failed on every candidate");
        false
    }
}
