//! Error types for dynflare
//!
//! Every failure is tagged with the phase that produced it. The update cycle
//! returns phase errors unchanged; the scheduler decides what they mean.

use thiserror::Error;

/// Result type alias for dynflare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// The public address could not be resolved
    #[error("lookup error: {0}")]
    Lookup(String),

    /// The local cache could not be read or written
    #[error("cache error: {0}")]
    Cache(String),

    /// The managed domain did not match exactly one record
    #[error("incorrect records response for {domain}, expected 1, got: {count}")]
    RecordCount {
        /// Domain name that was looked up
        domain: String,
        /// Number of records the provider returned
        count: usize,
    },

    /// The DNS provider rejected or failed a request
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Startup configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),
}

/// Phase of operation an [`Error`] originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Configuration and startup, before the scheduler runs
    Startup,
    /// Discovering the public address
    Resolution,
    /// Reading or writing the local cache
    Cache,
    /// Locating or updating the provider record
    ProviderUpdate,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Startup => "startup",
            Phase::Resolution => "resolution",
            Phase::Cache => "cache",
            Phase::ProviderUpdate => "provider update",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a record count error
    pub fn record_count(domain: impl Into<String>, count: usize) -> Self {
        Self::RecordCount {
            domain: domain.into(),
            count,
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The phase this error was produced in
    pub fn phase(&self) -> Phase {
        match self {
            Error::Lookup(_) => Phase::Resolution,
            Error::Cache(_) => Phase::Cache,
            Error::RecordCount { .. } | Error::Provider { .. } => Phase::ProviderUpdate,
            Error::Config(_) => Phase::Startup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_tagging() {
        assert_eq!(Error::lookup("no DNS results").phase(), Phase::Resolution);
        assert_eq!(Error::cache("denied").phase(), Phase::Cache);
        assert_eq!(
            Error::record_count("home.example.com", 2).phase(),
            Phase::ProviderUpdate
        );
        assert_eq!(
            Error::provider("cloudflare", "boom").phase(),
            Phase::ProviderUpdate
        );
        assert_eq!(Error::config("missing zone").phase(), Phase::Startup);
    }

    #[test]
    fn test_record_count_message() {
        let err = Error::record_count("home.example.com", 0);
        assert_eq!(
            err.to_string(),
            "incorrect records response for home.example.com, expected 1, got: 0"
        );
    }
}
