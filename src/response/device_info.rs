// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `device/readDetail` parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{as_int, lenient_int, lenient_string};

/// Identity of a processor, read once at setup.
///
/// Missing or mistyped fields default to `0` or an empty string.
///
/// # Examples
///
/// ```
/// use novastar_h::response::DeviceInfo;
/// use serde_json::json;
///
/// let info = DeviceInfo::from_value(&json!({
///     "deviceId": 1, "modelId": 5, "name": "H5", "sn": "NS123", "status": 1
/// }));
/// assert_eq!(info.serial, "NS123");
/// assert!(info.is_ready());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device id.
    #[serde(rename = "deviceId", default, deserialize_with = "lenient_int")]
    pub device_id: i64,
    /// Vendor model id.
    #[serde(rename = "modelId", default, deserialize_with = "lenient_int")]
    pub model_id: i64,
    /// Device name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Serial number.
    #[serde(rename = "sn", default, deserialize_with = "lenient_string")]
    pub serial: String,
    /// Protocol/firmware version.
    #[serde(rename = "protoVersion", default, deserialize_with = "lenient_string")]
    pub firmware: String,
    /// MAC address.
    #[serde(rename = "MAC", default, deserialize_with = "lenient_string")]
    pub mac: String,
    /// `0` busy, `1` ready.
    #[serde(default, deserialize_with = "lenient_int")]
    pub status: i64,
}

impl DeviceInfo {
    /// Parses a `device/readDetail` reply; anything but a mapping yields the
    /// default record.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Unexpected device detail shape");
            Self::default()
        })
    }

    /// Returns true when the processor reports itself ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == 1
    }

    /// Display name used when the device reports none.
    #[must_use]
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        if self.model_id != 0 {
            format!("Novastar {}", self.model_id)
        } else {
            "Novastar H Series".to_string()
        }
    }
}

/// Health fields of `device/readDetail`, refreshed every poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStatusInfo {
    /// Temperature status code (`temp`).
    pub temp_status: Option<i64>,
    /// Device status (`status`): `0` busy, `1` ready.
    pub device_status: Option<i64>,
    /// Signal power status (`powerList[0].iSignal`).
    pub signal_status: Option<i64>,
}

impl DeviceStatusInfo {
    /// Extracts the health fields from a `device/readDetail` reply.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::default();
        };
        let number = |v: &Value| v.is_number().then(|| as_int(v)).flatten();
        Self {
            temp_status: record.get("temp").and_then(number),
            device_status: record.get("status").and_then(number),
            signal_status: record
                .get("powerList")
                .and_then(Value::as_array)
                .and_then(|list| list.first())
                .and_then(|first| first.get("iSignal"))
                .and_then(number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_full_detail() {
        let info = DeviceInfo::from_value(&json!({
            "deviceId": 0,
            "modelId": 12,
            "name": "Stage",
            "sn": "ABC",
            "protoVersion": "1.2.3",
            "MAC": "00:11:22:33:44:55",
            "status": 0,
            "temp": 1,
        }));

        assert_eq!(info.model_id, 12);
        assert_eq!(info.firmware, "1.2.3");
        assert_eq!(info.mac, "00:11:22:33:44:55");
        assert!(!info.is_ready());
    }

    #[test]
    fn missing_and_mistyped_fields_default() {
        let info = DeviceInfo::from_value(&json!({"deviceId": "3", "name": null, "sn": 42}));
        assert_eq!(info.device_id, 3);
        assert_eq!(info.name, "");
        assert_eq!(info.serial, "");
        assert_eq!(info.status, 0);

        assert_eq!(DeviceInfo::from_value(&json!([1, 2])), DeviceInfo::default());
    }

    #[test]
    fn display_name_fallbacks() {
        let mut info = DeviceInfo::default();
        assert_eq!(info.display_name(), "Novastar H Series");
        info.model_id = 7;
        assert_eq!(info.display_name(), "Novastar 7");
        info.name = "FOH".into();
        assert_eq!(info.display_name(), "FOH");
    }

    #[test]
    fn status_info_reads_power_list() {
        let status = DeviceStatusInfo::from_value(&json!({
            "temp": 0,
            "status": 1.0,
            "powerList": [{"iSignal": 2}, {"iSignal": 0}],
        }));

        assert_eq!(status.temp_status, Some(0));
        assert_eq!(status.device_status, Some(1));
        assert_eq!(status.signal_status, Some(2));
    }

    #[test]
    fn status_info_ignores_non_numbers() {
        let status = DeviceStatusInfo::from_value(&json!({
            "temp": "hot",
            "powerList": [],
        }));
        assert_eq!(status, DeviceStatusInfo::default());
    }
}
