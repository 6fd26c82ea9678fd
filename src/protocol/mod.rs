// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol for the Novastar H-series OpenAPI.
//!
//! The processor exposes a stateless HTTP API: every call is a `POST` to
//! `http://{host}:{port}/open/api/{endpoint}` carrying a signed envelope.
//!
//! # Layers
//!
//! - [`Codec`]: builds the signed `{body, sign, pId, timeStamp}` envelope and
//!   handles optional DES payload encryption
//! - [`Transport`]: the single network touch point; one request, one
//!   optional result
//! - [`HttpClient`]: the reqwest-backed [`Transport`]
//! - [`first_success`]: tries ordered [`Candidate`]s until one answers
//!
//! Transport failures never surface as errors. A request either yields a
//! payload (`Some`) or it does not (`None`); the reason is logged at debug
//! level.

pub mod codec;
mod fallback;
#[cfg(feature = "http")]
mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use codec::{Codec, SignedEnvelope};
pub use fallback::{
    Candidate, LayerOpenWrite, audio_detail_reads, audio_input_writes, audio_list_reads,
    audio_output_writes, audio_volume_writes, first_success, layer_open_writes,
};
#[cfg(feature = "http")]
pub use http::{HttpClient, HttpConfig};

use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};

/// A business payload: the JSON object placed in the envelope body.
pub type Payload = Map<String, Value>;

/// Sends one request to the processor.
///
/// Implementations must be stateless with respect to requests and safe to
/// call concurrently. `None` means the request produced no usable result:
/// network error, timeout, non-200 status, vendor error, or an unparseable
/// reply.
pub trait Transport: Send + Sync {
    /// Posts `payload` to `endpoint` and returns the unwrapped response body.
    fn send(&self, endpoint: &str, payload: &Payload)
    -> impl Future<Output = Option<Value>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        endpoint: &str,
        payload: &Payload,
    ) -> impl Future<Output = Option<Value>> + Send {
        (**self).send(endpoint, payload)
    }
}

/// Converts a `json!` object literal into a [`Payload`].
///
/// Non-object values yield an empty payload.
#[must_use]
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Returns a copy of `base` with the extra entries of `extra` inserted.
#[must_use]
pub fn extend(base: &Payload, extra: Value) -> Payload {
    let mut out = base.clone();
    out.extend(payload(extra));
    out
}
