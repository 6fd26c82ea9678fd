// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator lifecycle events.

use chrono::{DateTime, Utc};

use super::CoordinatorId;

/// An event published by a [`Coordinator`](crate::Coordinator).
///
/// The snapshot itself travels on the coordinator's watch channel; events
/// only announce that something happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A new snapshot was published.
    StateUpdated {
        /// The publishing coordinator.
        coordinator_id: CoordinatorId,
        /// When the snapshot was published.
        at: DateTime<Utc>,
    },
    /// A poll produced no snapshot.
    PollFailed {
        /// The polling coordinator.
        coordinator_id: CoordinatorId,
        /// Failed polls in a row, including this one.
        consecutive_failures: u32,
        /// Why the poll failed.
        error: String,
    },
    /// The coordinator stopped polling.
    Stopped {
        /// The stopped coordinator.
        coordinator_id: CoordinatorId,
    },
}

impl CoordinatorEvent {
    /// Returns the coordinator that published this event.
    #[must_use]
    pub fn coordinator_id(&self) -> CoordinatorId {
        match self {
            Self::StateUpdated { coordinator_id, .. }
            | Self::PollFailed { coordinator_id, .. }
            | Self::Stopped { coordinator_id } => *coordinator_id,
        }
    }

    /// Returns true for [`PollFailed`](Self::PollFailed).
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::PollFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinator_id_of_every_variant() {
        let id = CoordinatorId::new();
        let events = [
            CoordinatorEvent::StateUpdated {
                coordinator_id: id,
                at: Utc::now(),
            },
            CoordinatorEvent::PollFailed {
                coordinator_id: id,
                consecutive_failures: 2,
                error: "no response".into(),
            },
            CoordinatorEvent::Stopped { coordinator_id: id },
        ];

        assert!(events.iter().all(|e| e.coordinator_id() == id));
        assert_eq!(
            events.iter().filter(|e| e.is_failure()).count(),
            1
        );
    }
}
