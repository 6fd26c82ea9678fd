// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the Novastar OpenAPI.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};

use crate::error::ProtocolError;
use crate::protocol::{Codec, Payload, Transport};
use crate::response::coerce::is_truthy;

// ============================================================================
// HttpConfig - Connection parameters for one processor
// ============================================================================

/// Configuration for an HTTP connection to a Novastar processor.
///
/// The project id and secret key come from the processor's OpenAPI settings
/// page. Without credentials the signature is still computed, over an empty
/// project id.
///
/// # Examples
///
/// ```
/// use novastar_h::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.10");
///
/// let config = HttpConfig::new("192.168.1.10")
///     .with_port(8001)
///     .with_credentials("NDdi", "MmZjZWVm")
///     .with_encryption(true)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://192.168.1.10:8001/open/api");
/// ```
#[derive(Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    project_id: String,
    secret_key: String,
    encryption: bool,
    timeout: Duration,
    verbose_logging: bool,
}

impl fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("project_id", &self.project_id)
            .field("secret_key", &"<redacted>")
            .field("encryption", &self.encryption)
            .field("timeout", &self.timeout)
            .field("verbose_logging", &self.verbose_logging)
            .finish()
    }
}

impl HttpConfig {
    /// Default OpenAPI port.
    pub const DEFAULT_PORT: u16 = 8000;
    /// Default total request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the processor
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            project_id: String::new(),
            secret_key: String::new(),
            encryption: false,
            timeout: Self::DEFAULT_TIMEOUT,
            verbose_logging: false,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the OpenAPI project id (`pId`) and secret key.
    #[must_use]
    pub fn with_credentials(
        mut self,
        project_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.project_id = project_id.into();
        self.secret_key = secret_key.into();
        self
    }

    /// Enables or disables DES payload encryption.
    #[must_use]
    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.encryption = enabled;
        self
    }

    /// Sets the total request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables per-attempt traces for multi-step writes.
    #[must_use]
    pub fn with_verbose_logging(mut self, enabled: bool) -> Self {
        self.verbose_logging = enabled;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the project id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Returns whether payload encryption is enabled.
    #[must_use]
    pub fn encryption(&self) -> bool {
        self.encryption
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns whether verbose logging is enabled.
    #[must_use]
    pub fn verbose_logging(&self) -> bool {
        self.verbose_logging
    }

    /// Builds the API base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/open/api", self.host, self.port)
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be
    /// created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }

        let base_url = self.base_url();
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url,
            client,
            codec: Codec::new(self.project_id, self.secret_key, self.encryption),
        })
    }
}

// ============================================================================
// HttpClient - Transport implementation
// ============================================================================

/// HTTP client for one Novastar processor.
///
/// Each call is an independent `POST` with the configured total timeout.
/// There is no retry; a timeout is a failure like any other.
///
/// # Examples
///
/// ```no_run
/// use novastar_h::protocol::{HttpConfig, Transport, payload};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), novastar_h::Error> {
/// let client = HttpConfig::new("192.168.1.10").into_client()?;
/// if let Some(detail) = client.send("device/readDetail", &payload(json!({"deviceId": 0}))).await {
///     println!("{detail}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    codec: Codec,
}

impl HttpClient {
    /// Creates a client for `host` on the default port, without credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be
    /// created.
    pub fn new(host: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpConfig::new(host).into_client()
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the codec used to seal requests.
    #[must_use]
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn request(&self, endpoint: &str, payload: &Payload) -> Result<Value, ProtocolError> {
        let url = self.build_url(endpoint);
        let envelope = self.codec.seal(payload);

        tracing::debug!(url = %url, "Sending OpenAPI request");

        let response = self.client.post(&url).json(&envelope).send().await?;
        if response.status() != StatusCode::OK {
            return Err(ProtocolError::HttpStatus(response.status().as_u16()));
        }

        let reply: Value = response.json().await?;
        let status = reply.get("status").and_then(Value::as_i64);
        if status != Some(0) {
            let message = reply
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            return Err(ProtocolError::Api {
                status: status.unwrap_or(-1),
                message,
            });
        }

        Ok(self.unwrap_reply(reply))
    }

    /// Extracts the business payload from a successful reply.
    fn unwrap_reply(&self, mut reply: Value) -> Value {
        let body = ["body", "data"]
            .into_iter()
            .find(|key| reply.get(*key).is_some_and(is_truthy))
            .and_then(|key| reply.get_mut(key).map(Value::take))
            .unwrap_or_else(|| Value::Object(Map::new()));

        match body {
            Value::String(_) if self.codec.encryption() => self.codec.open(body),
            Value::Object(_) | Value::Array(_) => body,
            _ => Value::Object(Map::new()),
        }
    }
}

impl Transport for HttpClient {
    async fn send(&self, endpoint: &str, payload: &Payload) -> Option<Value> {
        match self.request(endpoint, payload).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!(endpoint, error = %e, "OpenAPI request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(encryption: bool) -> HttpClient {
        HttpConfig::new("10.0.0.5")
            .with_credentials("NDdi", "MmZjZWVm")
            .with_encryption(encryption)
            .into_client()
            .unwrap()
    }

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.100");
        assert_eq!(config.host(), "192.168.1.100");
        assert_eq!(config.port(), 8000);
        assert_eq!(config.project_id(), "");
        assert!(!config.encryption());
        assert!(!config.verbose_logging());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn http_config_builder_chain() {
        let config = HttpConfig::new("192.168.1.100")
            .with_port(8080)
            .with_credentials("pid", "key")
            .with_encryption(true)
            .with_verbose_logging(true)
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.port(), 8080);
        assert_eq!(config.project_id(), "pid");
        assert!(config.encryption());
        assert!(config.verbose_logging());
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn http_config_debug_redacts_secret() {
        let config = HttpConfig::new("h").with_credentials("pid", "hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn empty_host_is_rejected() {
        let result = HttpConfig::new("  ").into_client();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn build_url_joins_endpoint() {
        let client = HttpClient::new("192.168.1.100").unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.100:8000/open/api");
        assert_eq!(
            client.build_url("screen/readList"),
            "http://192.168.1.100:8000/open/api/screen/readList"
        );
        assert_eq!(
            client.build_url("/preset/play"),
            "http://192.168.1.100:8000/open/api/preset/play"
        );
    }

    #[test]
    fn unwrap_prefers_body_then_data() {
        let c = client(false);
        assert_eq!(
            c.unwrap_reply(json!({"status": 0, "body": {"a": 1}, "data": {"b": 2}})),
            json!({"a": 1})
        );
        assert_eq!(
            c.unwrap_reply(json!({"status": 0, "body": {}, "data": {"b": 2}})),
            json!({"b": 2})
        );
        assert_eq!(
            c.unwrap_reply(json!({"status": 0, "data": [1, 2]})),
            json!([1, 2])
        );
        assert_eq!(c.unwrap_reply(json!({"status": 0})), json!({}));
    }

    #[test]
    fn unwrap_scalar_becomes_empty_mapping() {
        let c = client(false);
        assert_eq!(c.unwrap_reply(json!({"status": 0, "body": 5})), json!({}));
        assert_eq!(c.unwrap_reply(json!({"status": 0, "body": "text"})), json!({}));
    }

    #[test]
    fn unwrap_decrypts_string_body() {
        let c = client(true);
        let body = crate::protocol::payload(json!({"presetId": 3}));
        let ciphertext = c.codec().encrypt(&body).unwrap();
        assert_eq!(
            c.unwrap_reply(json!({"status": 0, "body": ciphertext})),
            json!({"presetId": 3})
        );
    }
}
