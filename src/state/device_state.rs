// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Aggregated device snapshot.

use serde::Serialize;

use super::AudioState;
use crate::response::{
    AudioOption, Background, DeviceStatusInfo, Input, Layer, Preset, Screen,
    synthetic_preset_label,
};
use crate::types::{Brightness, Target, Volume};

/// Snapshot of one screen of a Novastar H-series processor.
///
/// A new snapshot is built on every poll. `ftb_active`, `freeze_active` and
/// the background selection are not read from the device; the
/// [`Coordinator`](crate::Coordinator) re-applies them after each poll.
///
/// # Examples
///
/// ```
/// use novastar_h::state::DeviceState;
///
/// let state = DeviceState::new(0, 1);
/// assert_eq!(state.brightness.value(), 100);
/// assert_eq!(state.current_preset_id, -1);
/// assert_eq!(state.current_preset_label(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceState {
    /// Device id within the cascade.
    pub device_id: i64,
    /// Screen the snapshot describes.
    pub screen_id: i64,
    /// Screen brightness.
    pub brightness: Brightness,
    /// Raw temperature status code.
    pub temp_status: Option<i64>,
    /// Raw device status code.
    pub device_status: Option<i64>,
    /// Signal status of the first power entry.
    pub signal_status: Option<i64>,
    /// Fade-to-black engaged by this client.
    pub ftb_active: bool,
    /// Freeze engaged by this client.
    pub freeze_active: bool,
    /// Active preset, negative when none is playing.
    pub current_preset_id: i64,
    /// Background layer enabled by this client.
    pub background_enabled: bool,
    /// Background selected by this client.
    pub background_id: Option<i64>,
    /// Screens of the device.
    pub screens: Vec<Screen>,
    /// Presets of the screen.
    pub presets: Vec<Preset>,
    /// Inputs merged with their detail records.
    pub inputs: Vec<Input>,
    /// Layers merged with their detail records.
    pub layers: Vec<Layer>,
    /// Backgrounds of the screen.
    pub backgrounds: Vec<Background>,
    /// Selectable audio inputs.
    pub audio_inputs: Vec<AudioOption>,
    /// Selectable audio outputs.
    pub audio_outputs: Vec<AudioOption>,
    /// Layer whose audio is open.
    pub audio_input_id: Option<i64>,
    /// Active audio output.
    pub audio_output_id: Option<i64>,
    /// Output volume.
    pub audio_volume: Option<Volume>,
    /// Output mute.
    pub audio_muted: Option<bool>,
}

impl DeviceState {
    /// Creates an empty snapshot for a screen.
    #[must_use]
    pub fn new(device_id: i64, screen_id: i64) -> Self {
        Self {
            device_id,
            screen_id,
            brightness: Brightness::default(),
            temp_status: None,
            device_status: None,
            signal_status: None,
            ftb_active: false,
            freeze_active: false,
            current_preset_id: -1,
            background_enabled: false,
            background_id: None,
            screens: Vec::new(),
            presets: Vec::new(),
            inputs: Vec::new(),
            layers: Vec::new(),
            backgrounds: Vec::new(),
            audio_inputs: Vec::new(),
            audio_outputs: Vec::new(),
            audio_input_id: None,
            audio_output_id: None,
            audio_volume: None,
            audio_muted: None,
        }
    }

    /// Creates an empty snapshot for a target.
    #[must_use]
    pub fn for_target(target: Target) -> Self {
        Self::new(target.device_id, target.screen_id)
    }

    /// Copies device status codes into the snapshot.
    pub fn set_status(&mut self, status: DeviceStatusInfo) {
        self.temp_status = status.temp_status;
        self.device_status = status.device_status;
        self.signal_status = status.signal_status;
    }

    /// Copies derived audio state into the snapshot.
    pub fn set_audio(&mut self, audio: AudioState) {
        self.audio_inputs = audio.inputs;
        self.audio_outputs = audio.outputs;
        self.audio_input_id = audio.input_id;
        self.audio_output_id = audio.output_id;
        self.audio_volume = audio.volume;
        self.audio_muted = audio.muted;
    }

    /// Returns whether a preset is playing.
    #[must_use]
    pub fn has_active_preset(&self) -> bool {
        self.current_preset_id >= 0
    }

    /// Label of the active preset.
    ///
    /// An id missing from [`presets`](Self::presets) renders as
    /// `"Preset {id}"`.
    #[must_use]
    pub fn current_preset_label(&self) -> Option<String> {
        if !self.has_active_preset() {
            return None;
        }
        Some(
            self.preset(self.current_preset_id)
                .map_or_else(|| synthetic_preset_label(self.current_preset_id), Preset::label),
        )
    }

    /// Labels of all presets, in list order.
    #[must_use]
    pub fn preset_labels(&self) -> Vec<String> {
        self.presets.iter().map(Preset::label).collect()
    }

    /// Resolves a preset label to its id.
    ///
    /// Known labels are matched first, then the synthetic `"Preset {n}"`
    /// form is parsed.
    #[must_use]
    pub fn preset_id_for_label(&self, label: &str) -> Option<i64> {
        if let Some(preset) = self.presets.iter().find(|p| p.label() == label) {
            return Some(preset.preset_id);
        }
        label
            .strip_prefix("Preset ")
            .and_then(|rest| rest.trim().parse::<i64>().ok())
            .filter(|id| *id >= 0)
    }

    /// Looks up a preset by id.
    #[must_use]
    pub fn preset(&self, preset_id: i64) -> Option<&Preset> {
        self.presets.iter().find(|p| p.preset_id == preset_id)
    }

    /// Looks up a layer by id.
    #[must_use]
    pub fn layer(&self, layer_id: i64) -> Option<&Layer> {
        self.layers.iter().find(|l| l.layer_id == layer_id)
    }

    /// Looks up an input by id.
    #[must_use]
    pub fn input(&self, input_id: i64) -> Option<&Input> {
        self.inputs.iter().find(|i| i.input_id == input_id)
    }

    /// Looks up a background by id.
    #[must_use]
    pub fn background(&self, bkg_id: i64) -> Option<&Background> {
        self.backgrounds.iter().find(|b| b.bkg_id == bkg_id)
    }

    /// Label of the selected audio input option.
    #[must_use]
    pub fn audio_input_label(&self) -> Option<&str> {
        let id = self.audio_input_id?;
        self.audio_inputs
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.name.as_str())
    }

    /// Label of the selected audio output option.
    #[must_use]
    pub fn audio_output_label(&self) -> Option<&str> {
        let id = self.audio_output_id?;
        self.audio_outputs
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.name.as_str())
    }
}
