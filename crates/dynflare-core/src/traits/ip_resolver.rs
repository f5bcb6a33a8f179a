// # IP Resolver Trait
//
// Defines the interface for discovering the caller's public IPv4 address
// through a DNS lookup service.
//
// ## Implementations
//
// - hickory-based wire query: `dynflare-ip-dns` crate
//
// ## Usage
//
// ```rust,ignore
// use dynflare_core::IpResolver;
//
// let address = resolver
//     .resolve("myip.opendns.com", "resolver1.opendns.com")
//     .await?;
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP resolver implementations
///
/// # Contract
///
/// - Issues exactly one A query for `hostname` against `server`
/// - Returns the first A record in the answer section, skipping other types
/// - Fails with [`crate::Error::Lookup`] when the query cannot be sent, times
///   out, returns zero answers or returns no A record
/// - Never retries; the scheduler's next interval is the retry
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve `hostname` against the resolver at `server`
    async fn resolve(&self, hostname: &str, server: &str) -> Result<Ipv4Addr, crate::Error>;
}
