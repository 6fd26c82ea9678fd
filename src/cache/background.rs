// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! List-only cache for backgrounds.

use std::future::Future;

use serde_json::Value;

use super::DEFAULT_REFRESH_INTERVAL;
use crate::response::Background;

/// Cached background list.
///
/// The list is re-read when empty, every `refresh_interval`-th call, or
/// after [`force_refresh`](Self::force_refresh). Anything but a list reply
/// keeps the previous entries.
#[derive(Debug)]
pub struct BackgroundCache {
    entries: Vec<Background>,
    refresh_counter: u64,
    force_refresh: bool,
    refresh_interval: u64,
}

impl Default for BackgroundCache {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

impl BackgroundCache {
    /// Creates an empty cache. An interval of zero is treated as one.
    #[must_use]
    pub fn new(refresh_interval: u32) -> Self {
        Self {
            entries: Vec::new(),
            refresh_counter: 0,
            force_refresh: false,
            refresh_interval: u64::from(refresh_interval.max(1)),
        }
    }

    /// Requests a re-read on the next call.
    pub fn force_refresh(&mut self) {
        self.force_refresh = true;
    }

    /// Returns whether a forced refresh is pending.
    #[must_use]
    pub fn is_force_pending(&self) -> bool {
        self.force_refresh
    }

    /// The cached entries.
    #[must_use]
    pub fn entries(&self) -> &[Background] {
        &self.entries
    }

    /// Returns the background list, re-reading it through `fetch` when due.
    pub async fn refresh<F, Fut>(&mut self, fetch: F) -> Vec<Background>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<Value>>,
    {
        self.refresh_counter += 1;
        let periodic = self.refresh_counter % self.refresh_interval == 0;

        if self.entries.is_empty() || periodic || self.force_refresh {
            self.force_refresh = false;
            match fetch().await.as_ref().and_then(Background::parse_list) {
                Some(entries) => self.entries = entries,
                None => tracing::debug!("Background list read failed, keeping cache"),
            }
        }

        self.entries.clone()
    }
}
