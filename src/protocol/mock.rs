// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory transport for unit tests.

use parking_lot::Mutex;
use serde_json::Value;

use super::{Payload, Transport};

type Handler = Box<dyn Fn(&str, &Payload) -> Option<Value> + Send + Sync>;

/// A transport that answers through a closure and records every call.
pub(crate) struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<(String, Payload)>>,
}

impl MockTransport {
    pub(crate) fn new(
        handler: impl Fn(&str, &Payload) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A transport on which every request fails.
    pub(crate) fn offline() -> Self {
        Self::new(|_, _| None)
    }

    /// All recorded calls in order.
    pub(crate) fn calls(&self) -> Vec<(String, Payload)> {
        self.calls.lock().clone()
    }

    /// Payloads sent to `endpoint`, in order.
    pub(crate) fn calls_to(&self, endpoint: &str) -> Vec<Payload> {
        self.calls
            .lock()
            .iter()
            .filter(|(e, _)| e == endpoint)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub(crate) fn count(&self, endpoint: &str) -> usize {
        self.calls.lock().iter().filter(|(e, _)| e == endpoint).count()
    }

    pub(crate) fn endpoints(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(e, _)| e.clone()).collect()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl Transport for MockTransport {
    async fn send(&self, endpoint: &str, payload: &Payload) -> Option<Value> {
        self.calls
            .lock()
            .push((endpoint.to_string(), payload.clone()));
        (self.handler)(endpoint, payload)
    }
}
