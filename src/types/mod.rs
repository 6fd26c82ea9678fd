// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for processor control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time.
//!
//! # Types
//!
//! - [`Brightness`] - Screen brightness (0-100%)
//! - [`Volume`] - Audio output volume (0-100)
//! - [`Target`] - Device/screen addressing
//! - [`InputSource`] - Input routed to a layer

mod brightness;
mod input_source;
mod target;
mod volume;

pub use brightness::Brightness;
pub use input_source::InputSource;
pub use target::Target;
pub use volume::Volume;
