//! Target configuration
//!
//! Built once at startup, validated, then shared read-only by every cycle.

use std::path::PathBuf;
use std::time::Duration;

/// Hostname whose A record resolves to the caller's public address
pub const DEFAULT_TARGET: &str = "myip.opendns.com";

/// Resolver that answers [`DEFAULT_TARGET`] with the querying address
pub const DEFAULT_SERVER: &str = "resolver1.opendns.com";

/// Default location of the last-applied address
pub const DEFAULT_CACHE_PATH: &str = "/tmp/.dynamic-dns-cloudflare.cache";

/// Immutable configuration for the update cycle and scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Hostname queried to discover the public address
    pub lookup_host: String,

    /// Resolver queried on port 53 (host name or IP)
    pub resolver: String,

    /// Path of the cache file
    pub cache_path: PathBuf,

    /// Record name to keep pointed at the public address
    pub domain: String,

    /// Zone the record lives in
    pub zone: String,

    /// Poll interval; `None` runs a single cycle
    pub interval: Option<Duration>,
}

impl TargetConfig {
    /// Create a configuration with default lookup settings
    pub fn new(domain: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            lookup_host: DEFAULT_TARGET.to_string(),
            resolver: DEFAULT_SERVER.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            domain: domain.into(),
            zone: zone.into(),
            interval: None,
        }
    }

    /// Set the lookup hostname
    pub fn with_lookup_host(mut self, lookup_host: impl Into<String>) -> Self {
        self.lookup_host = lookup_host.into();
        self
    }

    /// Set the resolver address
    pub fn with_resolver(mut self, resolver: impl Into<String>) -> Self {
        self.resolver = resolver.into();
        self
    }

    /// Set the cache path
    pub fn with_cache_path(mut self, cache_path: impl Into<PathBuf>) -> Self {
        self.cache_path = cache_path.into();
        self
    }

    /// Set the poll interval
    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.trim().is_empty() {
            return Err(crate::Error::config("domain must be set"));
        }

        if self.zone.trim().is_empty() {
            return Err(crate::Error::config("zone must be set"));
        }

        if self.lookup_host.trim().is_empty() {
            return Err(crate::Error::config("lookup target cannot be empty"));
        }

        if self.resolver.trim().is_empty() {
            return Err(crate::Error::config("resolver address cannot be empty"));
        }

        if self.cache_path.as_os_str().is_empty() {
            return Err(crate::Error::config("cache path cannot be empty"));
        }

        Ok(())
    }
}

/// Parse a poll interval such as `30s`, `12h` or `1h30m`
///
/// An empty string or a zero duration means no interval (one-shot mode).
pub fn parse_interval(raw: &str) -> Result<Option<Duration>, crate::Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let interval = humantime::parse_duration(raw).map_err(|e| {
        crate::Error::config(format!("failed to parse duration ({}): {}", raw, e))
    })?;

    if interval.is_zero() {
        Ok(None)
    } else {
        Ok(Some(interval))
    }
}
