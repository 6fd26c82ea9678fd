// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device/screen addressing.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::protocol::{Payload, payload};

/// The device and screen a request is addressed to.
///
/// # Examples
///
/// ```
/// use novastar_h::types::Target;
/// use serde_json::json;
///
/// let target = Target::new(0, 1);
/// assert_eq!(
///     serde_json::Value::Object(target.payload()),
///     json!({"deviceId": 0, "screenId": 1})
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Device id within the processor cascade.
    pub device_id: i64,
    /// Screen id on that device.
    pub screen_id: i64,
}

impl Target {
    /// Creates a target.
    #[must_use]
    pub const fn new(device_id: i64, screen_id: i64) -> Self {
        Self {
            device_id,
            screen_id,
        }
    }

    /// `{screenId, deviceId}`.
    #[must_use]
    pub fn payload(&self) -> Payload {
        payload(json!({"screenId": self.screen_id, "deviceId": self.device_id}))
    }

    /// `{deviceId}`.
    #[must_use]
    pub fn device_payload(&self) -> Payload {
        payload(json!({"deviceId": self.device_id}))
    }
}
