// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signed request envelope for the Novastar OpenAPI.
//!
//! Every request body is wrapped as `{body, sign, pId, timeStamp}`:
//!
//! - Encryption disabled: `sign = base64(hex(md5(timeStamp + pId)))` and the
//!   body is sent as a JSON object.
//! - Encryption enabled: the body JSON is DES-ECB encrypted (PKCS5 padding,
//!   key = first 8 bytes of the secret key, NUL padded), base64-encoded and
//!   sent as a string; `sign = base64(hex(md5(body + timeStamp + pId +
//!   secretKey)))`.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use cipher::block_padding::Pkcs7;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use md5::{Digest, Md5};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::protocol::Payload;

type DesEcbEnc = ecb::Encryptor<des::Des>;
type DesEcbDec = ecb::Decryptor<des::Des>;

/// A signed request ready to be POSTed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedEnvelope {
    /// The business payload, or its base64 ciphertext.
    pub body: Value,
    /// Base64 of the hex MD5 signature.
    pub sign: String,
    /// Project id from the device's OpenAPI settings.
    #[serde(rename = "pId")]
    pub project_id: String,
    /// Epoch milliseconds as a decimal string.
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
}

/// Builds and opens signed envelopes for one device connection.
#[derive(Clone)]
pub struct Codec {
    project_id: String,
    secret_key: String,
    encryption: bool,
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("project_id", &self.project_id)
            .field("secret_key", &"<redacted>")
            .field("encryption", &self.encryption)
            .finish()
    }
}

impl Codec {
    /// Creates a codec for the given credentials.
    #[must_use]
    pub fn new(
        project_id: impl Into<String>,
        secret_key: impl Into<String>,
        encryption: bool,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            secret_key: secret_key.into(),
            encryption,
        }
    }

    /// Returns whether payload encryption is enabled.
    #[must_use]
    pub fn encryption(&self) -> bool {
        self.encryption
    }

    /// Returns the project id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Seals a payload with the current time.
    #[must_use]
    pub fn seal(&self, payload: &Payload) -> SignedEnvelope {
        self.seal_at(payload, &chrono::Utc::now().timestamp_millis().to_string())
    }

    /// Seals a payload with an explicit timestamp.
    ///
    /// If encryption fails the plaintext payload is sent instead; its JSON
    /// text is then what gets signed.
    #[must_use]
    pub fn seal_at(&self, payload: &Payload, timestamp: &str) -> SignedEnvelope {
        let (body, signed_body) = if self.encryption {
            match self.encrypt(payload) {
                Ok(ciphertext) => (Value::String(ciphertext.clone()), ciphertext),
                Err(e) => {
                    tracing::warn!(error = %e, "Encryption failed, sending unencrypted body");
                    let plain = Value::Object(payload.clone());
                    let text = plain.to_string();
                    (plain, text)
                }
            }
        } else {
            (Value::Object(payload.clone()), String::new())
        };

        SignedEnvelope {
            body,
            sign: self.signature(&signed_body, timestamp),
            project_id: self.project_id.clone(),
            timestamp: timestamp.to_string(),
        }
    }

    /// Computes the request signature.
    ///
    /// `body` is ignored when encryption is disabled.
    #[must_use]
    pub fn signature(&self, body: &str, timestamp: &str) -> String {
        let message = if self.encryption {
            format!("{body}{timestamp}{}{}", self.project_id, self.secret_key)
        } else {
            format!("{timestamp}{}", self.project_id)
        };
        let digest = hex::encode(Md5::digest(message.as_bytes()));
        BASE64.encode(digest)
    }

    /// Opens a response payload.
    ///
    /// String bodies are decrypted when encryption is enabled; a body that
    /// cannot be decrypted becomes an empty mapping. Everything else passes
    /// through unchanged.
    #[must_use]
    pub fn open(&self, body: Value) -> Value {
        match body {
            Value::String(ciphertext) if self.encryption => {
                self.decrypt(&ciphertext).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Decryption failed, discarding body");
                    Value::Object(Map::new())
                })
            }
            other => other,
        }
    }

    /// Encrypts a payload into base64 ciphertext.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if the payload cannot be serialized or the key is
    /// rejected.
    pub fn encrypt(&self, payload: &Payload) -> Result<String, CodecError> {
        let plaintext = serde_json::to_vec(payload)?;
        let cipher =
            DesEcbEnc::new_from_slice(&self.cipher_key()).map_err(|_| CodecError::InvalidKey)?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(&plaintext);
        Ok(BASE64.encode(ciphertext))
    }

    /// Decrypts base64 ciphertext into JSON.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` on invalid base64, padding, UTF-8 or JSON.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Value, CodecError> {
        let raw = BASE64.decode(ciphertext.trim())?;
        let cipher =
            DesEcbDec::new_from_slice(&self.cipher_key()).map_err(|_| CodecError::InvalidKey)?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&raw)
            .map_err(|_| CodecError::Padding)?;
        let text = String::from_utf8(plaintext)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn cipher_key(&self) -> [u8; 8] {
        let mut key = [0u8; 8];
        let bytes = self.secret_key.as_bytes();
        let len = bytes.len().min(key.len());
        key[..len].copy_from_slice(&bytes[..len]);
        key
    }
}
