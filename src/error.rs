// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `novastar_h` library.
//!
//! Most device operations deliberately do not surface errors: transport
//! failures collapse into "no result" and write operations report a plain
//! `bool`. The types here cover what remains: value validation, client
//! setup, request encoding and gated operations.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },
}

/// Errors related to talking to the processor over HTTP.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with an HTTP status other than 200.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// The device answered with a non-zero application status.
    #[error("API error {status}: {message}")]
    Api {
        /// The vendor status code (`-1` when the field was missing).
        status: i64,
        /// The vendor message, if any.
        message: String,
    },

    /// A request produced no usable result.
    #[error("no response from {endpoint}")]
    NoResponse {
        /// The endpoint that was called.
        endpoint: String,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Encrypting or decrypting a request body failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Errors raised while sealing or opening an encrypted body.
///
/// These never escape the codec's public API, which falls back to the
/// plaintext payload or an empty mapping instead.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The cipher rejected the derived key.
    #[error("invalid cipher key length")]
    InvalidKey,

    /// The ciphertext was not valid base64.
    #[error("invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Padding was invalid after decryption.
    #[error("invalid block padding")]
    Padding,

    /// The payload could not be converted to or from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The decrypted body was not UTF-8.
    #[error("decrypted body is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Raw command passthrough has not been enabled in the configuration.
    #[error("raw commands are disabled")]
    RawCommandsDisabled,

    /// The coordinator has been shut down.
    #[error("coordinator is stopped")]
    Stopped,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
