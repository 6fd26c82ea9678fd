// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state snapshots.
//!
//! A [`DeviceState`] is rebuilt on every poll from the device's replies.
//! [`AudioState`] is the audio routing derived during aggregation, and
//! [`LocalState`] holds the flags only this client knows about, overlaid
//! onto each fresh snapshot.
//!
//! # Examples
//!
//! ```
//! use novastar_h::state::{DeviceState, LocalState};
//!
//! let mut state = DeviceState::new(0, 0);
//! let local = LocalState { freeze_active: true, ..LocalState::default() };
//! local.apply_to(&mut state);
//!
//! assert!(state.freeze_active);
//! ```

mod audio;
mod device_state;
mod local;

pub use audio::{AudioSources, AudioState};
pub use device_state::DeviceState;
pub use local::{BackgroundSelection, LocalState};
