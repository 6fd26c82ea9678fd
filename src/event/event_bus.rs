// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting coordinator events.

use tokio::sync::broadcast;

use super::CoordinatorEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast channel for [`CoordinatorEvent`]s.
///
/// Every subscriber gets its own copy of each event published after it
/// subscribed.
///
/// # Capacity
///
/// The event bus has a fixed capacity (default 256). If the channel fills
/// up because a subscriber is slow, older events are dropped for that
/// subscriber, which then receives `RecvError::Lagged`.
///
/// # Examples
///
/// ```
/// use novastar_h::event::{CoordinatorEvent, CoordinatorId, EventBus};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// let coordinator_id = CoordinatorId::new();
/// bus.publish(CoordinatorEvent::Stopped { coordinator_id });
///
/// assert_eq!(rx.try_recv().unwrap().coordinator_id(), coordinator_id);
/// ```
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus buffering up to `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event. Without subscribers the event is discarded.
    pub fn publish(&self, event: CoordinatorEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CoordinatorId;

    fn stopped(coordinator_id: CoordinatorId) -> CoordinatorEvent {
        CoordinatorEvent::Stopped { coordinator_id }
    }

    #[test]
    fn subscriber_count_follows_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_delivers_to_every_subscriber() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = CoordinatorId::new();
        bus.publish(stopped(id));

        assert_eq!(rx1.recv().await.unwrap().coordinator_id(), id);
        assert_eq!(rx2.recv().await.unwrap().coordinator_id(), id);
    }

    #[tokio::test]
    async fn clones_share_the_channel() {
        let bus = EventBus::with_capacity(4);
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        let id = CoordinatorId::new();
        clone.publish(stopped(id));

        assert_eq!(rx.recv().await.unwrap(), stopped(id));
    }
}
