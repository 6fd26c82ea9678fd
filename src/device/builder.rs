// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP device builder.

use std::time::Duration;

use crate::cache::DEFAULT_REFRESH_INTERVAL;
use crate::device::Device;
use crate::error::Error;
use crate::protocol::{HttpClient, HttpConfig};

/// Builder for HTTP devices.
///
/// Created with `Device::http("host")` or
/// `Device::http_config(HttpConfig::new("host").with_port(8001))`.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use novastar_h::Device;
///
/// # fn example() -> novastar_h::Result<()> {
/// let device = Device::http("192.168.1.10")
///     .with_credentials("project-id", "secret-key")
///     .with_encryption(true)
///     .with_timeout(Duration::from_secs(5))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceBuilder {
    config: HttpConfig,
    refresh_interval: u32,
}

impl DeviceBuilder {
    pub(crate) fn new(config: HttpConfig) -> Self {
        Self {
            config,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// Sets the OpenAPI port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Sets the project id and secret key used to sign requests.
    #[must_use]
    pub fn with_credentials(
        mut self,
        project_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.config = self.config.with_credentials(project_id, secret_key);
        self
    }

    /// Enables DES body encryption.
    #[must_use]
    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.config = self.config.with_encryption(enabled);
        self
    }

    /// Sets the total timeout of each request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Enables per-attempt traces for audio input writes.
    #[must_use]
    pub fn with_verbose_logging(mut self, enabled: bool) -> Self {
        self.config = self.config.with_verbose_logging(enabled);
        self
    }

    /// Sets how many polls pass between periodic detail re-reads.
    #[must_use]
    pub fn with_refresh_interval(mut self, refresh_interval: u32) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Returns the HTTP configuration.
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Builds the device. No request is made.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be
    /// created.
    pub fn build(self) -> Result<Device<HttpClient>, Error> {
        let verbose_logging = self.config.verbose_logging();
        let client = self.config.into_client()?;
        Ok(Device::with_refresh_interval(client, self.refresh_interval)
            .with_verbose_logging(verbose_logging))
    }
}

impl Device<HttpClient> {
    /// Creates a builder for an HTTP device from a host string.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use novastar_h::Device;
    ///
    /// # async fn example() -> novastar_h::Result<()> {
    /// let device = Device::http("192.168.1.10").build()?;
    /// assert!(device.can_connect().await);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn http(host: impl Into<String>) -> DeviceBuilder {
        DeviceBuilder::new(HttpConfig::new(host))
    }

    /// Creates a builder from a complete `HttpConfig`.
    #[must_use]
    pub fn http_config(config: HttpConfig) -> DeviceBuilder {
        DeviceBuilder::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chains_into_config() {
        let builder = Device::http("10.0.0.5")
            .with_port(8001)
            .with_credentials("pid", "key")
            .with_encryption(true)
            .with_timeout(Duration::from_secs(3))
            .with_verbose_logging(true)
            .with_refresh_interval(6);

        let config = builder.config();
        assert_eq!(config.port(), 8001);
        assert_eq!(config.project_id(), "pid");
        assert!(config.encryption());
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(config.verbose_logging());
        assert_eq!(builder.refresh_interval, 6);
    }

    #[test]
    fn build_points_at_open_api() {
        let device = Device::http("10.0.0.5").with_port(8001).build().unwrap();
        assert_eq!(device.transport().base_url(), "http://10.0.0.5:8001/open/api");
    }

    #[test]
    fn build_applies_refresh_interval() {
        let device = Device::http("10.0.0.5").with_refresh_interval(9).build().unwrap();
        assert_eq!(device.refresh_interval(), 9);
    }

    #[test]
    fn empty_host_is_rejected() {
        let result = Device::http("  ").build();
        assert!(matches!(
            result,
            Err(Error::Protocol(crate::error::ProtocolError::InvalidAddress(_)))
        ));
    }

    #[test]
    fn config_builder_is_kept() {
        let config = HttpConfig::new("10.0.0.5").with_encryption(true);
        let builder = Device::http_config(config);
        assert!(builder.config().encryption());
    }
}
