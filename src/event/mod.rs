// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events published by coordinators.
//!
//! The latest snapshot is carried by each coordinator's watch channel. The
//! [`EventBus`] announces lifecycle changes (new snapshot, failed poll,
//! shutdown) on a tokio broadcast channel so several subscribers can follow
//! one or more coordinators.
//!
//! # Examples
//!
//! ```
//! use novastar_h::event::{CoordinatorEvent, CoordinatorId, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(CoordinatorEvent::Stopped { coordinator_id: CoordinatorId::new() });
//! assert!(rx.try_recv().is_ok());
//! ```

mod coordinator_event;
mod coordinator_id;
mod event_bus;

pub use coordinator_event::CoordinatorEvent;
pub use coordinator_id::CoordinatorId;
pub use event_bus::EventBus;
