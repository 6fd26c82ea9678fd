// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network scan for Novastar H-series processors.
//!
//! Each host gets a TCP connect on the OpenAPI port and, if it opens, an
//! unauthenticated `device/readDetail`. A host qualifies when the reply
//! carries a device id above zero or a serial number.
//!
//! # Examples
//!
//! ```no_run
//! use novastar_h::discovery::{ScanOptions, scan_network};
//!
//! # async fn example() {
//! // Empty host list scans the local /24.
//! let found = scan_network(Vec::new(), ScanOptions::default()).await;
//! for device in &found {
//!     println!("{} at {}:{}", device.name, device.host, device.port);
//! }
//! # }
//! ```

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::device::Device;
use crate::protocol::HttpConfig;
use crate::response::DeviceInfo;

/// Options for [`scan_network`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    port: u16,
    probe_timeout: Duration,
    max_concurrency: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanOptions {
    /// Port 8000, 2 s per probe, 50 probes at a time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: HttpConfig::DEFAULT_PORT,
            probe_timeout: Duration::from_secs(2),
            max_concurrency: 50,
        }
    }

    /// Sets the probed port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the timeout of the TCP connect and of the info request.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets how many hosts are probed at once. Zero is raised to one.
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Probed port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Per-probe timeout.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Probes in flight at most.
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

/// A processor found by [`scan_network`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    /// Probed host.
    pub host: String,
    /// Probed port.
    pub port: u16,
    /// Device name, or `Novastar <model>` when unnamed.
    pub name: String,
    /// Model id, empty when unknown.
    pub model: String,
    /// Serial number.
    pub serial: String,
}

impl DiscoveredDevice {
    fn from_info(host: &str, port: u16, info: DeviceInfo) -> Option<Self> {
        if info.device_id <= 0 && info.serial.is_empty() {
            return None;
        }
        let model = if info.model_id == 0 {
            String::new()
        } else {
            info.model_id.to_string()
        };
        let name = if info.name.is_empty() {
            format!(
                "Novastar {}",
                if model.is_empty() { "H Series" } else { &model }
            )
        } else {
            info.name
        };
        Some(Self {
            host: host.to_owned(),
            port,
            name,
            model,
            serial: info.serial,
        })
    }
}

/// Hosts `.1` to `.254` of the /24 containing `addr`.
fn subnet_hosts(addr: Ipv4Addr) -> Vec<String> {
    let [a, b, c, _] = addr.octets();
    (1..=254u8)
        .map(|d| Ipv4Addr::new(a, b, c, d).to_string())
        .collect()
}

/// The /24 of the interface that routes to the internet. Sends nothing.
fn local_network_hosts() -> Vec<String> {
    let local = UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip());

    match local {
        Ok(IpAddr::V4(addr)) => subnet_hosts(addr),
        Ok(IpAddr::V6(addr)) => {
            tracing::error!(%addr, "Local address is not IPv4, nothing to scan");
            Vec::new()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to determine local network range");
            Vec::new()
        }
    }
}

/// Probes one host.
async fn probe_host(host: &str, options: &ScanOptions) -> Option<DiscoveredDevice> {
    let port = options.port;
    let connect = TcpStream::connect((host, port));
    match tokio::time::timeout(options.probe_timeout, connect).await {
        Ok(Ok(_stream)) => {}
        Ok(Err(e)) => {
            tracing::trace!(host, port, error = %e, "Port closed");
            return None;
        }
        Err(_) => {
            tracing::trace!(host, port, "Connect timed out");
            return None;
        }
    }

    let client = HttpConfig::new(host)
        .with_port(port)
        .with_timeout(options.probe_timeout)
        .into_client()
        .ok()?;
    let info = Device::new(client).device_info().await;
    DiscoveredDevice::from_info(host, port, info)
}

/// Scans `hosts` for processors, or the local /24 when `hosts` is empty.
///
/// Results keep the order of `hosts`.
pub async fn scan_network(hosts: Vec<String>, options: ScanOptions) -> Vec<DiscoveredDevice> {
    let hosts = if hosts.is_empty() {
        local_network_hosts()
    } else {
        hosts
    };
    if hosts.is_empty() {
        return Vec::new();
    }

    tracing::info!(
        hosts = hosts.len(),
        port = options.port,
        "Scanning for Novastar processors"
    );

    let options = Arc::new(options);
    let permits = Arc::new(Semaphore::new(options.max_concurrency));
    let mut probes = JoinSet::new();
    for (index, host) in hosts.into_iter().enumerate() {
        let options = Arc::clone(&options);
        let permits = Arc::clone(&permits);
        probes.spawn(async move {
            let _permit = permits.acquire_owned().await.ok()?;
            probe_host(&host, &options).await.map(|found| (index, found))
        });
    }

    let mut found = Vec::new();
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok(Some(hit)) => found.push(hit),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Probe task failed"),
        }
    }
    found.sort_by_key(|(index, _)| *index);

    let found: Vec<DiscoveredDevice> = found.into_iter().map(|(_, device)| device).collect();
    for device in &found {
        tracing::info!(name = %device.name, host = %device.host, "Found Novastar processor");
    }
    tracing::info!(found = found.len(), "Network scan complete");
    found
}
