// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request-bounding caches owned by a [`Device`](crate::Device).
//!
//! Inputs and layers are listed every poll but their detail records are
//! only re-read when the list-level signature of an entry changes, on a
//! periodic boundary, or after a write that forces a refresh. Backgrounds
//! use a list-only cache with the same cadence.

mod background;
mod detail;

pub use background::BackgroundCache;
pub use detail::{CacheEntry, DEFAULT_REFRESH_INTERVAL, DetailCache};
