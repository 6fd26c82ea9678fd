// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `novastar_h` - A Rust library to poll and control Novastar H-series LED
//! display processors.
//!
//! The processors expose a signed JSON OpenAPI over HTTP. This library
//! speaks that API, hides the differences between firmware generations
//! behind ordered endpoint fallbacks and keeps one coherent snapshot of a
//! screen up to date.
//!
//! # Supported Features
//!
//! - **Screen control**: Brightness, fade-to-black, freeze, backgrounds
//! - **Presets**: List, play by id or by label, active preset tracking
//! - **Layers**: Input routing and layer-based audio selection
//! - **Audio**: Output selection and volume across firmware variants
//! - **Polling**: Interval reconciliation with cached detail reads
//! - **Discovery**: Scanning a network for processors
//!
//! # Quick Start
//!
//! ## One-off reads and writes
//!
//! ```no_run
//! use novastar_h::{Device, Target};
//!
//! #[tokio::main]
//! async fn main() -> novastar_h::Result<()> {
//!     let device = Device::http("192.168.1.10")
//!         .with_credentials("project-id", "secret-key")
//!         .build()?;
//!
//!     let target = Target::new(0, 0);
//!     let state = device.get_state(target).await?;
//!     println!("Preset: {:?}", state.current_preset_label());
//!
//!     device.set_brightness(target, 75).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Continuous polling
//!
//! ```no_run
//! use std::time::Duration;
//! use novastar_h::{Coordinator, CoordinatorConfig, HttpConfig};
//!
//! #[tokio::main]
//! async fn main() -> novastar_h::Result<()> {
//!     let config = CoordinatorConfig::new().with_poll_interval(Duration::from_secs(5));
//!     let coordinator = Coordinator::connect(HttpConfig::new("192.168.1.10"), config).await?;
//!
//!     coordinator.select_preset_option("Show B").await;
//!     coordinator.set_blackout(true).await;
//!
//!     let mut events = coordinator.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod coordinator;
mod device;
#[cfg(feature = "http")]
pub mod discovery;
pub mod error;
pub mod event;
pub mod protocol;
pub mod response;
pub mod state;
pub mod types;

pub use coordinator::{Coordinator, CoordinatorConfig, PollHealth};
#[cfg(feature = "http")]
pub use device::DeviceBuilder;
pub use device::{Device, FULL_CROP};
pub use error::{CodecError, DeviceError, Error, ProtocolError, Result, ValueError};
pub use event::{CoordinatorEvent, CoordinatorId, EventBus};
pub use protocol::{Payload, Transport};
#[cfg(feature = "http")]
pub use protocol::{HttpClient, HttpConfig};
pub use response::{Background, DeviceInfo, Input, Layer, Preset, Screen};
pub use state::{AudioState, DeviceState, LocalState};
pub use types::{Brightness, InputSource, Target, Volume};
