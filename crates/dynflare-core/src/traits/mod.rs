//! Collaborator traits
//!
//! The update cycle talks to the outside world only through these seams.
//!
//! - [`IpResolver`]: Discover the public address with one DNS query
//! - [`CacheStore`]: Persist the last-applied address
//! - [`DnsProvider`]: Locate and overwrite the managed record

pub mod cache_store;
pub mod dns_provider;
pub mod ip_resolver;

pub use cache_store::CacheStore;
pub use dns_provider::{DnsProvider, ZoneRecord};
pub use ip_resolver::IpResolver;
