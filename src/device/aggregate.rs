// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reads and snapshot aggregation.

use serde_json::{Value, json};

use super::Device;
use crate::error::ProtocolError;
use crate::protocol::{
    Payload, Transport, audio_detail_reads, audio_list_reads, extend, first_success, payload,
};
use crate::response::coerce::{as_int, as_map, is_truthy};
use crate::response::{Background, DeviceStatusInfo, Input, Layer, Preset, Screen, parse_list};
use crate::state::{AudioSources, AudioState, DeviceState};
use crate::types::{Brightness, Target};

/// Keeps a mapping reply, dropping empty ones.
fn non_empty_map(reply: Option<Value>) -> Option<Payload> {
    match reply {
        Some(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}

/// Mapping entries of the list under `key`.
fn records(reply: Option<&Value>, key: &str) -> Vec<Payload> {
    reply
        .and_then(|r| r.get(key))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(as_map).cloned().collect())
        .unwrap_or_default()
}

fn device_request(device_id: i64) -> Payload {
    payload(json!({"deviceId": device_id}))
}

/// Brightness from a screen detail, 100 when unknown.
fn brightness_of(screen_detail: Option<&Payload>) -> Brightness {
    screen_detail
        .and_then(|d| d.get("brightness"))
        .and_then(as_int)
        .map(Brightness::clamped)
        .unwrap_or_default()
}

impl<T: Transport> Device<T> {
    /// Lists the screens of a device. `None` when the read fails.
    pub async fn screens(&self, device_id: i64) -> Option<Vec<Screen>> {
        let reply = self
            .transport
            .send("screen/readList", &device_request(device_id))
            .await?;
        Some(parse_list(&reply, "screens"))
    }

    /// Lists the presets of a screen.
    pub async fn presets(&self, target: Target) -> Vec<Preset> {
        self.transport
            .send("preset/readList", &target.payload())
            .await
            .map(|reply| parse_list(&reply, "presets"))
            .unwrap_or_default()
    }

    /// The playing preset id, `-1` when none is playing or the read fails.
    pub async fn current_preset(&self, target: Target) -> i64 {
        self.transport
            .send("preset/readPlay", &target.payload())
            .await
            .and_then(|reply| reply.get("presetId").and_then(as_int))
            .unwrap_or(-1)
    }

    /// Reads `screen/readDetail`.
    pub async fn screen_detail(&self, target: Target) -> Option<Payload> {
        non_empty_map(self.transport.send("screen/readDetail", &target.payload()).await)
    }

    /// The `audio` block of the screen detail.
    pub async fn screen_audio(&self, target: Target) -> Option<Payload> {
        let mut detail = self.screen_detail(target).await?;
        match detail.remove("audio") {
            Some(Value::Object(audio)) => Some(audio),
            _ => None,
        }
    }

    /// Reads the screen brightness, 100 when unknown.
    pub async fn brightness(&self, target: Target) -> Brightness {
        brightness_of(self.screen_detail(target).await.as_ref())
    }

    /// Reads temperature, device and signal status codes.
    pub async fn device_status(&self, device_id: i64) -> DeviceStatusInfo {
        self.transport
            .send("device/readDetail", &device_request(device_id))
            .await
            .map(|reply| DeviceStatusInfo::from_value(&reply))
            .unwrap_or_default()
    }

    // ========== Inputs ==========

    /// Raw entries of `input/readList`.
    pub async fn input_list(&self, device_id: i64) -> Vec<Payload> {
        let reply = self
            .transport
            .send("input/readList", &device_request(device_id))
            .await;
        records(reply.as_ref(), "inputs")
    }

    /// Reads `input/readDetail` for one input.
    pub async fn input_detail(&self, device_id: i64, input_id: i64) -> Option<Payload> {
        let request = extend(&device_request(device_id), json!({"inputId": input_id}));
        non_empty_map(self.transport.send("input/readDetail", &request).await)
    }

    /// Inputs merged with cached detail records.
    pub async fn inputs(&self, device_id: i64) -> Vec<Input> {
        let entries = self.input_list(device_id).await;
        let mut cache = self.inputs.lock().await;
        cache
            .refresh(entries, |input_id| self.input_detail(device_id, input_id))
            .await
    }

    // ========== Layers ==========

    /// Raw entries of `layer/detailList` (`screenLayers`, else `layers`).
    pub async fn layer_list(&self, target: Target) -> Vec<Payload> {
        let reply = self
            .transport
            .send("layer/detailList", &target.payload())
            .await;
        let key = ["screenLayers", "layers"]
            .into_iter()
            .find(|key| reply.as_ref().and_then(|r| r.get(*key)).is_some_and(is_truthy))
            .unwrap_or("screenLayers");
        records(reply.as_ref(), key)
    }

    /// Reads `layer/readDetail` for one layer.
    pub async fn layer_detail(&self, target: Target, layer_id: i64) -> Option<Payload> {
        let request = extend(&target.payload(), json!({"layerId": layer_id}));
        non_empty_map(self.transport.send("layer/readDetail", &request).await)
    }

    /// Layers merged with cached detail records.
    pub async fn layers(&self, target: Target) -> Vec<Layer> {
        let entries = self.layer_list(target).await;
        let mut cache = self.layers.lock().await;
        cache
            .refresh(entries, |layer_id| self.layer_detail(target, layer_id))
            .await
    }

    /// Layers re-read with every detail refreshed.
    pub(crate) async fn fresh_layers(&self, target: Target) -> Vec<Layer> {
        self.layers.lock().await.force_refresh();
        self.layers(target).await
    }

    // ========== Backgrounds ==========

    /// Backgrounds, re-read on the cache's cadence.
    pub async fn backgrounds(&self, device_id: i64) -> Vec<Background> {
        let request = device_request(device_id);
        let mut cache = self.backgrounds.lock().await;
        cache
            .refresh(|| self.transport.send("bkg/readAllList", &request))
            .await
    }

    // ========== Aggregation ==========

    /// Derives audio routing from the layers, the screen `audio` block and
    /// the audio fallback reads.
    pub async fn audio_state(
        &self,
        target: Target,
        layers: &[Layer],
        screen_audio: Option<&Payload>,
    ) -> AudioState {
        let base = target.payload();
        let detail = non_empty_map(first_success(&self.transport, &audio_detail_reads(&base)).await);
        let list = non_empty_map(
            first_success(&self.transport, &audio_list_reads(&base, target.device_id)).await,
        );

        AudioState::derive(AudioSources {
            layers,
            screen_audio,
            detail: detail.as_ref(),
            list: list.as_ref(),
        })
    }

    /// Records the playing preset; a change forces a detail refresh.
    async fn note_preset(&self, preset_id: i64) {
        let changed = {
            let mut last = self.last_preset_id.lock();
            let changed = last.is_some_and(|previous| previous != preset_id);
            *last = Some(preset_id);
            changed
        };
        if changed {
            tracing::debug!(preset_id, "Preset changed, forcing detail refresh");
            self.force_detail_refresh().await;
        }
    }

    /// Builds a full snapshot of one screen.
    ///
    /// Only the screen list is required; every other read falls back to
    /// its default. Local flags (fade-to-black, freeze, background) are
    /// left for the caller to overlay.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::NoResponse` when `screen/readList` yields no
    /// result. No further request is made in that case.
    pub async fn get_state(&self, target: Target) -> Result<DeviceState, ProtocolError> {
        let screens = self
            .screens(target.device_id)
            .await
            .ok_or_else(|| ProtocolError::NoResponse {
                endpoint: "screen/readList".to_string(),
            })?;

        let mut state = DeviceState::for_target(target);
        state.screens = screens;
        state.presets = self.presets(target).await;
        state.current_preset_id = self.current_preset(target).await;
        self.note_preset(state.current_preset_id).await;

        let screen_detail = self.screen_detail(target).await;
        state.brightness = brightness_of(screen_detail.as_ref());
        state.set_status(self.device_status(target.device_id).await);

        state.inputs = self.inputs(target.device_id).await;
        state.layers = self.layers(target).await;
        state.backgrounds = self.backgrounds(target.device_id).await;

        let screen_audio = screen_detail
            .as_ref()
            .and_then(|d| d.get("audio"))
            .and_then(as_map);
        let audio = self.audio_state(target, &state.layers, screen_audio).await;
        state.set_audio(audio);

        tracing::debug!(
            screen_id = target.screen_id,
            inputs = state.inputs.len(),
            layers = state.layers.len(),
            preset = state.current_preset_id,
            "State aggregated"
        );
        Ok(state)
    }
}
