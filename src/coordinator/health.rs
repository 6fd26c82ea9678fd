// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of the most recent polls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollHealth {
    /// Failed polls in a row. Reset by a successful poll.
    pub consecutive_failures: u32,
    /// Whether the last poll produced a snapshot.
    pub last_update_success: bool,
    /// When the last snapshot was published.
    pub last_updated: Option<DateTime<Utc>>,
}

impl PollHealth {
    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) {
        self.consecutive_failures = 0;
        self.last_update_success = true;
        self.last_updated = Some(at);
    }

    pub(crate) fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_update_success = false;
        self.consecutive_failures
    }
}
