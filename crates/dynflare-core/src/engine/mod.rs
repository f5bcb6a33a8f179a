//! Update cycle and scheduler
//!
//! The [`UpdateCycle`] is one pass of resolve → compare → (maybe) update.
//! The [`Scheduler`] drives it on an interval, or once.
//!
//! ## Architecture
//!
//! ```text
//!                     ┌──────────────┐
//!                     │  Scheduler   │── timer / signal select
//!                     └──────────────┘
//!                             │
//!                             ▼
//!                     ┌──────────────┐
//!                     │ UpdateCycle  │
//!                     └──────────────┘
//!                             │
//!         ┌───────────────────┼───────────────────┐
//!         ▼                   ▼                   ▼
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ IpResolver  │     │ CacheStore   │     │ DnsProvider │
//! │ (resolve)   │     │ (compare)    │     │ (on change) │
//! └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Ordering
//!
//! The cache is written before the provider is called. A failed provider
//! update therefore leaves the cache holding an address the provider never
//! received, and the next cycle sees that address as unchanged.

mod scheduler;

pub use scheduler::{Scheduler, Termination};

use crate::config::TargetConfig;
use crate::error::Result;
use crate::state::{self, CacheCheck};
use crate::traits::{CacheStore, DnsProvider, IpResolver};
use crate::updater;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Successful result of one update cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The resolved address matched the cache; no work was needed
    Unchanged {
        /// The current address
        address: Ipv4Addr,
    },

    /// The address changed and the provider record was updated
    Updated {
        /// The new address
        address: Ipv4Addr,
        /// The previously cached value, if any
        previous: Option<String>,
    },
}

/// One resolve → compare → update pass
///
/// Holds no state of its own beyond the shared configuration and its
/// collaborators. Errors from every phase are returned unchanged.
pub struct UpdateCycle {
    /// Shared read-only configuration
    config: Arc<TargetConfig>,

    /// Public address discovery
    resolver: Box<dyn IpResolver>,

    /// Last-applied address
    cache: Box<dyn CacheStore>,

    /// Provider record API
    provider: Box<dyn DnsProvider>,
}

impl UpdateCycle {
    /// Create a new update cycle
    pub fn new(
        config: Arc<TargetConfig>,
        resolver: Box<dyn IpResolver>,
        cache: Box<dyn CacheStore>,
        provider: Box<dyn DnsProvider>,
    ) -> Self {
        Self {
            config,
            resolver,
            cache,
            provider,
        }
    }

    /// The configuration this cycle runs against
    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Run one cycle
    ///
    /// # Returns
    ///
    /// - `Ok(CycleOutcome::Unchanged)`: No work needed
    /// - `Ok(CycleOutcome::Updated)`: Provider record now holds the new address
    /// - `Err(Error::Lookup | Error::Cache)`: Failed before attempting the update
    /// - `Err(Error::RecordCount | Error::Provider)`: Attempted the update and failed
    /// - `Err(Error::Cache)` after a successful update: the cache write failed
    pub async fn run(&self) -> Result<CycleOutcome> {
        let config = &self.config;

        let address = self
            .resolver
            .resolve(&config.lookup_host, &config.resolver)
            .await?;
        debug!("Resolved {} via {}: {}", config.lookup_host, config.resolver, address);

        let (previous, write_error) =
            match state::check_and_store(self.cache.as_ref(), address).await? {
                CacheCheck::Unchanged => return Ok(CycleOutcome::Unchanged { address }),
                CacheCheck::Changed { previous } => (previous, None),
                CacheCheck::ChangedUnsaved { previous, error } => {
                    warn!("Cache write failed, updating record anyway: {}", error);
                    (previous, Some(error))
                }
            };

        info!("IP address changed: {}", address);

        updater::apply(self.provider.as_ref(), &config.zone, &config.domain, address).await?;
        info!(
            "Updated {} record {} -> {}",
            self.provider.provider_name(),
            config.domain,
            address
        );

        match write_error {
            Some(error) => Err(error),
            None => Ok(CycleOutcome::Updated { address, previous }),
        }
    }
}
