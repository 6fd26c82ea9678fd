// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level API for one Novastar H-series processor.
//!
//! A [`Device`] wraps a [`Transport`] and owns the detail caches for inputs,
//! layers and backgrounds. Reads never fail: a missing reply degrades to the
//! field's default. Writes report a plain `bool` and invalidate the caches
//! they affect.
//!
//! ```no_run
//! use novastar_h::Device;
//! use novastar_h::types::Target;
//!
//! # async fn example() -> novastar_h::Result<()> {
//! let device = Device::http("192.168.1.10")
//!     .with_credentials("project", "secret")
//!     .build()?;
//!
//! let target = Target::new(0, 0);
//! let state = device.get_state(target).await?;
//! println!("brightness {}", state.brightness);
//!
//! device.set_brightness(target, 80).await;
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod audio;
#[cfg(feature = "http")]
mod builder;

#[cfg(feature = "http")]
pub use builder::DeviceBuilder;

use parking_lot::Mutex as SyncMutex;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::cache::{BackgroundCache, DEFAULT_REFRESH_INTERVAL, DetailCache};
use crate::protocol::{Payload, Transport, extend};
use crate::response::{DeviceInfo, Input, Layer};
use crate::types::{Brightness, InputSource, Target};

/// Crop id that keeps the original source framing.
pub const FULL_CROP: i64 = 255;

/// A Novastar H-series processor reached through a transport.
///
/// # Type Parameter
///
/// `T` is the [`Transport`] used for every request; `HttpClient` in
/// production, anything else in tests.
#[derive(Debug)]
pub struct Device<T: Transport> {
    transport: T,
    inputs: Mutex<DetailCache<Input>>,
    layers: Mutex<DetailCache<Layer>>,
    backgrounds: Mutex<BackgroundCache>,
    last_preset_id: SyncMutex<Option<i64>>,
    refresh_interval: u32,
    verbose_logging: bool,
}

impl<T: Transport> Device<T> {
    /// Creates a device over `transport` with the default refresh interval.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_refresh_interval(transport, DEFAULT_REFRESH_INTERVAL)
    }

    /// Creates a device whose caches re-read details every
    /// `refresh_interval`-th poll.
    #[must_use]
    pub fn with_refresh_interval(transport: T, refresh_interval: u32) -> Self {
        Self {
            transport,
            inputs: Mutex::new(DetailCache::new(refresh_interval)),
            layers: Mutex::new(DetailCache::new(refresh_interval)),
            backgrounds: Mutex::new(BackgroundCache::new(refresh_interval)),
            last_preset_id: SyncMutex::new(None),
            refresh_interval,
            verbose_logging: false,
        }
    }

    /// Enables per-attempt traces for audio input writes.
    #[must_use]
    pub fn with_verbose_logging(mut self, enabled: bool) -> Self {
        self.verbose_logging = enabled;
        self
    }

    /// Polls between periodic detail re-reads.
    #[must_use]
    pub fn refresh_interval(&self) -> u32 {
        self.refresh_interval
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends an arbitrary request and returns its payload.
    pub async fn send_raw(&self, endpoint: &str, payload: &Payload) -> Option<Value> {
        self.transport.send(endpoint, payload).await
    }

    /// Returns whether the processor answers `device/readDetail`.
    pub async fn can_connect(&self) -> bool {
        self.transport
            .send("device/readDetail", &Target::default().device_payload())
            .await
            .is_some()
    }

    /// Reads the identity of the processor. Missing fields default.
    pub async fn device_info(&self) -> DeviceInfo {
        self.transport
            .send("device/readDetail", &Target::default().device_payload())
            .await
            .map(|reply| DeviceInfo::from_value(&reply))
            .unwrap_or_default()
    }

    /// Requests a detail re-read of inputs and layers on the next poll.
    pub async fn force_detail_refresh(&self) {
        self.inputs.lock().await.force_refresh();
        self.layers.lock().await.force_refresh();
    }

    async fn write(&self, endpoint: &str, payload: Payload) -> bool {
        let accepted = self.transport.send(endpoint, &payload).await.is_some();
        if !accepted {
            tracing::debug!(endpoint, "Write not accepted");
        }
        accepted
    }

    // ========== Screen ==========

    /// Sets the screen brightness, clamped to 0-100.
    pub async fn set_brightness(&self, target: Target, level: i64) -> bool {
        let brightness = Brightness::clamped(level);
        self.write(
            "screen/writeBrightness",
            extend(&target.payload(), json!({"brightness": brightness.value()})),
        )
        .await
    }

    /// Engages (`true`) or releases fade-to-black over `transition_time`
    /// seconds.
    pub async fn set_ftb(&self, target: Target, blackout: bool, transition_time: u32) -> bool {
        self.write(
            "screen/ftb",
            extend(
                &target.payload(),
                json!({"type": i64::from(!blackout), "time": transition_time}),
            ),
        )
        .await
    }

    /// Freezes or unfreezes the screen output.
    pub async fn set_freeze(&self, target: Target, freeze: bool) -> bool {
        self.write(
            "screen/writeFreeze",
            extend(&target.payload(), json!({"enable": i64::from(freeze)})),
        )
        .await
    }

    /// Shows or hides a background. Negative ids are sent as zero.
    pub async fn set_background(&self, target: Target, bkg_id: i64, enabled: bool) -> bool {
        let accepted = self
            .write(
                "screen/writeBKG",
                extend(
                    &target.payload(),
                    json!({"enable": i64::from(enabled), "bkgId": bkg_id.max(0)}),
                ),
            )
            .await;
        if accepted {
            self.backgrounds.lock().await.force_refresh();
        }
        accepted
    }

    // ========== Presets ==========

    /// Plays a preset.
    pub async fn load_preset(&self, target: Target, preset_id: i64) -> bool {
        let accepted = self
            .write(
                "preset/play",
                extend(&target.payload(), json!({"presetId": preset_id})),
            )
            .await;
        if accepted {
            self.force_detail_refresh().await;
        }
        accepted
    }

    // ========== Layers ==========

    /// Routes an input to a layer, or clears the layer's source with `None`.
    ///
    /// [`FULL_CROP`] keeps the original framing.
    pub async fn set_layer_source(
        &self,
        target: Target,
        layer_id: i64,
        source: Option<InputSource>,
        crop_id: i64,
    ) -> bool {
        let (source_type, source) = match source {
            Some(source) => (1, source),
            None => (0, InputSource::default()),
        };
        let payload = extend(
            &target.payload(),
            json!({
                "layerId": layer_id,
                "sourceType": source_type,
                "slotId": source.slot_id.max(0),
                "interfaceType": source.interface_type.max(0),
                "inputId": source.input_id.max(0),
                "cropId": crop_id,
            }),
        );

        let accepted = self.write("layer/writeSource", payload).await;
        if accepted {
            self.force_detail_refresh().await;
        }
        accepted
    }
}
