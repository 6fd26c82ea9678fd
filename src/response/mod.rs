// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed records for Novastar OpenAPI replies.
//!
//! Replies are loosely typed mappings whose field types vary between
//! firmware releases. Each record here is built once at the boundary:
//! ids are coerced with [`coerce::as_int`], entries without a valid id are
//! dropped, and keys the engine does not interpret are retained so nothing
//! the device reports is lost.

mod audio;
mod background;
pub mod coerce;
mod device_info;
mod input;
mod layer;
mod screen;

pub use audio::{AudioOption, input_options, output_options};
pub use background::Background;
pub use device_info::{DeviceInfo, DeviceStatusInfo};
pub use input::Input;
pub use layer::{AudioStatus, Layer, LayerSource, open_audio_layers, selected_audio_layer};
pub(crate) use screen::parse_list;
pub use screen::{Preset, Screen, synthetic_preset_label};
