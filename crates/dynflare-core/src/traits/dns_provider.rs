// # DNS Provider Trait
//
// Defines the provider record-management API consumed by the record updater.
//
// ## Implementations
//
// - Cloudflare: `dynflare-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dynflare_core::DnsProvider;
//
// let zone_id = provider.zone_id("example.com").await?;
// let records = provider.list_records(&zone_id, "home.example.com").await?;
// ```

use async_trait::async_trait;
use serde::Deserialize;

/// A DNS record as the provider reports it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoneRecord {
    /// Provider-assigned record id
    pub id: String,

    /// Fully qualified record name
    pub name: String,

    /// Record type (e.g. "A")
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record content; the address for A records
    pub content: String,

    /// Time-to-live in seconds (1 = provider automatic)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Whether traffic is proxied by the provider
    #[serde(default)]
    pub proxied: Option<bool>,
}

fn default_ttl() -> u32 {
    1
}

/// Trait for DNS provider implementations
///
/// Providers are thin wrappers around one HTTP API. They perform exactly the
/// request asked for and return success or failure:
///
/// - No retries or backoff (the scheduler's next interval is the retry)
/// - No decision about whether an update is needed (owned by `UpdateCycle`)
/// - No access to the cache store
///
/// Failures are reported as [`crate::Error::Provider`].
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name to the provider's zone id
    async fn zone_id(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List the records named `name` within a zone
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Vec<ZoneRecord>, crate::Error>;

    /// Overwrite a record, identified by `record.id`, with `record`
    async fn update_record(
        &self,
        zone_id: &str,
        record: &ZoneRecord,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging)
    fn provider_name(&self) -> &'static str;
}
