// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic reconciliation of one screen.
//!
//! A [`Coordinator`] owns a [`Device`] and polls it on a fixed interval.
//! Every successful poll is overlaid with the [`LocalState`] flags the
//! device does not report, published on a watch channel and announced on
//! the [`EventBus`]. A failed poll keeps the last snapshot and bumps the
//! failure counter in [`PollHealth`].
//!
//! Polls and writes share one in-flight guard: a write waits for a running
//! poll, and a tick that finds the guard taken is skipped.
//!
//! # Examples
//!
//! ```no_run
//! use novastar_h::{Coordinator, CoordinatorConfig, Device};
//!
//! # async fn example() -> novastar_h::Result<()> {
//! let device = Device::http("192.168.1.10").build()?;
//! let coordinator = Coordinator::start(device, CoordinatorConfig::new()).await;
//!
//! let mut rx = coordinator.subscribe_state();
//! while rx.changed().await.is_ok() {
//!     if let Some(state) = rx.borrow().as_ref() {
//!         println!("preset {:?}", state.current_preset_label());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod health;

pub use config::CoordinatorConfig;
pub use health::PollHealth;

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex as SyncMutex;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::device::Device;
use crate::error::{DeviceError, Error, ProtocolError};
use crate::event::{CoordinatorEvent, CoordinatorId, EventBus};
use crate::protocol::{Payload, Transport};
use crate::response::Preset;
use crate::state::{BackgroundSelection, DeviceState, LocalState};
use crate::types::{InputSource, Target};

#[cfg(feature = "http")]
use crate::protocol::{HttpClient, HttpConfig};

struct Shared<T: Transport> {
    id: CoordinatorId,
    device: Device<T>,
    config: CoordinatorConfig,
    guard: Mutex<()>,
    local: SyncMutex<LocalState>,
    health: SyncMutex<PollHealth>,
    state_tx: watch::Sender<Option<DeviceState>>,
    events: EventBus,
}

impl<T: Transport> Shared<T> {
    /// Runs one cycle. The caller holds `guard`.
    async fn poll(&self) -> Result<(), ProtocolError> {
        match self.device.get_state(self.config.target()).await {
            Ok(mut state) => {
                self.local.lock().apply_to(&mut state);
                let at = Utc::now();
                self.health.lock().record_success(at);
                self.state_tx.send_replace(Some(state));
                self.events.publish(CoordinatorEvent::StateUpdated {
                    coordinator_id: self.id,
                    at,
                });
                tracing::trace!(coordinator = %self.id, "Snapshot published");
                Ok(())
            }
            Err(e) => {
                let consecutive_failures = self.health.lock().record_failure();
                tracing::warn!(
                    coordinator = %self.id,
                    consecutive_failures,
                    error = %e,
                    "Poll failed"
                );
                self.events.publish(CoordinatorEvent::PollFailed {
                    coordinator_id: self.id,
                    consecutive_failures,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Stores a local flag change and republishes the current snapshot.
    fn update_local(&self, update: impl FnOnce(&mut LocalState)) {
        let local = {
            let mut local = self.local.lock();
            update(&mut local);
            *local
        };
        let modified = self.state_tx.send_if_modified(|state| match state {
            Some(state) => {
                local.apply_to(state);
                true
            }
            None => false,
        });
        if modified {
            self.events.publish(CoordinatorEvent::StateUpdated {
                coordinator_id: self.id,
                at: Utc::now(),
            });
        }
    }
}

async fn run<T: Transport + 'static>(shared: Arc<Shared<T>>, mut shutdown: watch::Receiver<bool>) {
    let period = shared.config.poll_interval();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Ok(_busy) = shared.guard.try_lock() else {
                    tracing::debug!(coordinator = %shared.id, "Cycle in flight, tick skipped");
                    continue;
                };
                let _ = shared.poll().await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!(coordinator = %shared.id, "Coordinator stopped");
    shared.events.publish(CoordinatorEvent::Stopped {
        coordinator_id: shared.id,
    });
}

/// Polls one screen of a processor and serializes writes against it.
///
/// Dropping the coordinator signals the poll task to stop; use
/// [`shutdown`](Self::shutdown) to wait for it.
pub struct Coordinator<T: Transport + 'static> {
    shared: Arc<Shared<T>>,
    shutdown_tx: watch::Sender<bool>,
    task: SyncMutex<Option<JoinHandle<()>>>,
}

impl<T: Transport + 'static> std::fmt::Debug for Coordinator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("id", &self.shared.id)
            .field("config", &self.shared.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<T: Transport + 'static> Coordinator<T> {
    /// Runs a first poll and starts the polling task.
    ///
    /// A failed first poll is recorded in [`health`](Self::health) and
    /// leaves [`state`](Self::state) empty until a later poll succeeds.
    /// The device keeps its own refresh interval; the config's applies only
    /// to devices built by [`connect`](Coordinator::connect).
    pub async fn start(device: Device<T>, config: CoordinatorConfig) -> Self {
        Self::start_with_events(device, config, EventBus::new()).await
    }

    /// Like [`start`](Self::start), publishing on an existing bus.
    pub async fn start_with_events(
        device: Device<T>,
        config: CoordinatorConfig,
        events: EventBus,
    ) -> Self {
        if config.refresh_interval() != device.refresh_interval() {
            tracing::debug!(
                device = device.refresh_interval(),
                config = config.refresh_interval(),
                "Refresh interval taken from the device"
            );
        }
        let (state_tx, _) = watch::channel(None);
        let shared = Arc::new(Shared {
            id: CoordinatorId::new(),
            device,
            config,
            guard: Mutex::new(()),
            local: SyncMutex::new(LocalState::default()),
            health: SyncMutex::new(PollHealth::default()),
            state_tx,
            events,
        });

        tracing::info!(
            coordinator = %shared.id,
            device_id = shared.config.target().device_id,
            screen_id = shared.config.target().screen_id,
            "Coordinator starting"
        );
        {
            let _busy = shared.guard.lock().await;
            let _ = shared.poll().await;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(Arc::clone(&shared), shutdown_rx));

        Self {
            shared,
            shutdown_tx,
            task: SyncMutex::new(Some(task)),
        }
    }

    /// Returns the coordinator id carried by its events.
    #[must_use]
    pub fn id(&self) -> CoordinatorId {
        self.shared.id
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.shared.config
    }

    /// Returns the polled device.
    #[must_use]
    pub fn device(&self) -> &Device<T> {
        &self.shared.device
    }

    fn target(&self) -> Target {
        self.shared.config.target()
    }

    /// Returns true until [`shutdown`](Self::shutdown) is called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !*self.shutdown_tx.borrow()
    }

    /// Returns the latest snapshot, if any poll has succeeded.
    #[must_use]
    pub fn state(&self) -> Option<DeviceState> {
        self.shared.state_tx.borrow().clone()
    }

    /// Returns a receiver of snapshots.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<Option<DeviceState>> {
        self.shared.state_tx.subscribe()
    }

    /// Returns the event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Subscribes to this coordinator's events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.shared.events.subscribe()
    }

    /// Returns the poll health.
    #[must_use]
    pub fn health(&self) -> PollHealth {
        self.shared.health.lock().clone()
    }

    /// Presets of the latest snapshot.
    #[must_use]
    pub fn presets(&self) -> Vec<Preset> {
        self.shared
            .state_tx
            .borrow()
            .as_ref()
            .map(|state| state.presets.clone())
            .unwrap_or_default()
    }

    /// Label of the active preset in the latest snapshot.
    #[must_use]
    pub fn current_preset_label(&self) -> Option<String> {
        self.shared
            .state_tx
            .borrow()
            .as_ref()
            .and_then(DeviceState::current_preset_label)
    }

    async fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        if !self.is_running() {
            tracing::debug!(coordinator = %self.shared.id, "Coordinator stopped, request dropped");
            return None;
        }
        Some(self.shared.guard.lock().await)
    }

    /// Polls now, waiting for any cycle in flight.
    ///
    /// # Errors
    ///
    /// Returns error if the coordinator is stopped or the screen list
    /// cannot be read.
    pub async fn refresh(&self) -> Result<(), Error> {
        let Some(_busy) = self.lock().await else {
            return Err(DeviceError::Stopped.into());
        };
        Ok(self.shared.poll().await?)
    }

    /// Polls after an accepted device-side write so the snapshot reflects it.
    async fn settle(&self, accepted: bool) -> bool {
        if accepted {
            let _ = self.shared.poll().await;
        }
        accepted
    }

    // ========== Local flags ==========

    /// Engages or releases fade-to-black.
    pub async fn set_blackout(&self, blackout: bool) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self.shared.device.set_ftb(self.target(), blackout, 0).await;
        if accepted {
            self.shared.update_local(|local| local.ftb_active = blackout);
        }
        accepted
    }

    /// Freezes or unfreezes the output.
    pub async fn set_freeze(&self, freeze: bool) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self.shared.device.set_freeze(self.target(), freeze).await;
        if accepted {
            self.shared.update_local(|local| local.freeze_active = freeze);
        }
        accepted
    }

    /// Shows or hides a background.
    pub async fn set_background(&self, bkg_id: i64, enabled: bool) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self
            .shared
            .device
            .set_background(self.target(), bkg_id, enabled)
            .await;
        if accepted {
            self.shared.update_local(|local| {
                local.background = Some(BackgroundSelection {
                    enabled,
                    bkg_id: bkg_id.max(0),
                });
            });
        }
        accepted
    }

    // ========== Device writes ==========

    /// Sets the screen brightness, clamped to 0-100.
    pub async fn set_brightness(&self, level: i64) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self.shared.device.set_brightness(self.target(), level).await;
        self.settle(accepted).await
    }

    /// Plays a preset by id.
    pub async fn set_active_preset(&self, preset_id: i64) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self.shared.device.load_preset(self.target(), preset_id).await;
        self.settle(accepted).await
    }

    /// Plays the preset shown as `label`.
    ///
    /// Known preset names resolve first, then synthetic `Preset N` labels.
    /// Anything else returns false without a request.
    pub async fn select_preset_option(&self, label: &str) -> bool {
        let target = self.target();
        let preset_id = self
            .state()
            .unwrap_or_else(|| DeviceState::for_target(target))
            .preset_id_for_label(label);
        match preset_id {
            Some(preset_id) => self.set_active_preset(preset_id).await,
            None => {
                tracing::debug!(coordinator = %self.shared.id, label, "Unknown preset label");
                false
            }
        }
    }

    /// Routes an input to a layer, or clears it with `None`.
    pub async fn set_layer_source(
        &self,
        layer_id: i64,
        source: Option<InputSource>,
        crop_id: i64,
    ) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self
            .shared
            .device
            .set_layer_source(self.target(), layer_id, source, crop_id)
            .await;
        self.settle(accepted).await
    }

    /// Makes `layer_id` the only layer with open audio.
    pub async fn set_audio_input(&self, layer_id: i64) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self.shared.device.set_audio_input(self.target(), layer_id).await;
        self.settle(accepted).await
    }

    /// Selects the audio output.
    pub async fn set_audio_output(&self, output_id: i64) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self.shared.device.set_audio_output(self.target(), output_id).await;
        self.settle(accepted).await
    }

    /// Sets the output volume, clamped to 0-100.
    pub async fn set_audio_volume(&self, volume: i64) -> bool {
        let Some(_busy) = self.lock().await else {
            return false;
        };
        let accepted = self.shared.device.set_audio_volume(self.target(), volume).await;
        self.settle(accepted).await
    }

    /// Sends an arbitrary request when raw commands are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::RawCommandsDisabled`] unless enabled with
    /// [`CoordinatorConfig::with_raw_commands`], and
    /// [`DeviceError::Stopped`] after shutdown.
    pub async fn send_raw(&self, endpoint: &str, payload: &Payload) -> Result<Option<Value>, Error> {
        if !self.shared.config.allow_raw_commands() {
            return Err(DeviceError::RawCommandsDisabled.into());
        }
        let Some(_busy) = self.lock().await else {
            return Err(DeviceError::Stopped.into());
        };
        tracing::debug!(coordinator = %self.shared.id, endpoint, "Raw command");
        Ok(self.shared.device.send_raw(endpoint, payload).await)
    }

    /// Stops polling and waits for the task to finish.
    ///
    /// A cycle in flight runs to completion first.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        let task = self.task.lock().take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            tracing::warn!(coordinator = %self.shared.id, error = %e, "Poll task ended abnormally");
        }
    }
}

#[cfg(feature = "http")]
impl Coordinator<HttpClient> {
    /// Builds an HTTP device from `http` and starts polling it.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub async fn connect(http: HttpConfig, config: CoordinatorConfig) -> Result<Self, Error> {
        let device = Device::http_config(http)
            .with_refresh_interval(config.refresh_interval())
            .build()?;
        Ok(Self::start(device, config).await)
    }
}

impl<T: Transport + 'static> Drop for Coordinator<T> {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}
