// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layer source routing.

use serde::{Deserialize, Serialize};

/// An input routed to a layer by `layer/writeSource`.
///
/// Negative ids are clamped to zero when the request is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSource {
    /// Input id.
    pub input_id: i64,
    /// Interface type of the input.
    pub interface_type: i64,
    /// Slot the input sits in.
    pub slot_id: i64,
}

impl InputSource {
    /// Routes `input_id` with interface type and slot zero.
    #[must_use]
    pub const fn new(input_id: i64) -> Self {
        Self {
            input_id,
            interface_type: 0,
            slot_id: 0,
        }
    }

    /// Sets the interface type.
    #[must_use]
    pub const fn with_interface_type(mut self, interface_type: i64) -> Self {
        self.interface_type = interface_type;
        self
    }

    /// Sets the slot id.
    #[must_use]
    pub const fn with_slot_id(mut self, slot_id: i64) -> Self {
        self.slot_id = slot_id;
        self
    }
}
