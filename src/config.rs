// statsd-client - A small, blocking Statsd client for Rust!
//
// Copyright 2015-2026 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::client::StatsdClient;
use crate::sinks::{TcpMetricSink, UdpMetricSink};
use crate::types::{ErrorKind, MetricError, MetricResult};
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use log::{debug, info};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user configuration file, looked up in the home directory.
pub const USER_CONFIG_FILE: &str = ".statsd-client.yml";

/// Path of the system-wide configuration file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/statsd-client.yml";

/// Connection and behavior settings for a client, usually read from YAML.
///
/// Every field is optional in the file:
///
/// ``` yaml
/// host: metrics.example.com
/// port: 8125
/// tcp: false
/// namespace: api
/// factor: 10
/// enabled: true
/// ```
///
/// `factor` scales counter increments and decrements made through the
/// `Statsd` facade. `enabled: false` or `deactivated: true` turns every
/// operation into a no-op.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub tcp: bool,
    pub namespace: String,
    pub factor: f64,
    pub enabled: bool,
    pub deactivated: bool,
    pub connect_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tcp: false,
            namespace: String::new(),
            factor: 1.0,
            enabled: true,
            deactivated: false,
            connect_timeout_ms: None,
        }
    }
}

impl Config {
    /// Parse a configuration from YAML. An empty document yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> MetricResult<Config> {
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(yaml)?;
        if !config.factor.is_finite() {
            return Err(MetricError::from((ErrorKind::ConfigInvalid, "factor must be finite")));
        }

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> MetricResult<Config> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            MetricError::from((
                ErrorKind::ConfigInvalid,
                "Unable to read config",
                format!("{}: {}", path.as_ref().display(), e),
            ))
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Paths searched by `discover`, in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);
        if let Some(home) = env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(USER_CONFIG_FILE));
        }

        paths.push(PathBuf::from(SYSTEM_CONFIG_FILE));
        paths
    }

    /// Load the per-user configuration file if present, otherwise the
    /// system-wide one.
    ///
    /// # Errors
    ///
    /// Returns an error of kind `ConfigMissing` naming the searched paths if
    /// none of them exist and `ConfigInvalid` if the first file found cannot
    /// be parsed.
    pub fn discover() -> MetricResult<Config> {
        Self::from_first_existing(&Self::search_paths())
    }

    /// Load the first of `paths` that exists.
    pub fn from_first_existing<P: AsRef<Path>>(paths: &[P]) -> MetricResult<Config> {
        for path in paths {
            let path = path.as_ref();
            if path.is_file() {
                info!("loading statsd configuration from {}", path.display());
                return Self::from_file(path);
            }

            debug!("no statsd configuration at {}", path.display());
        }

        let searched = paths
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(" or ");

        Err(MetricError::from((ErrorKind::ConfigMissing, "No config found", searched)))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.deactivated
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Create a client sending to the configured host over UDP, or TCP when
    /// `tcp` is set.
    ///
    /// The host is not resolved or contacted here.
    pub fn build_client(&self) -> StatsdClient {
        if self.tcp {
            let mut sink = TcpMetricSink::new(self.host.as_str(), self.port);
            if let Some(timeout) = self.connect_timeout() {
                sink = sink.with_connect_timeout(timeout);
            }

            StatsdClient::from_sink(&self.namespace, sink)
        } else {
            StatsdClient::from_sink(&self.namespace, UdpMetricSink::new(self.host.as_str(), self.port))
        }
    }
}
