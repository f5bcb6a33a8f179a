// # dynflare-core
//
// Core library for keeping one DNS A record pointed at the caller's
// public IPv4 address.
//
// ## Architecture Overview
//
// - **IpResolver**: Trait for discovering the public address with one DNS query
// - **CacheStore**: Trait for the persisted last-applied address
// - **DnsProvider**: Trait for the provider's zone/record API
// - **UpdateCycle**: Resolve → compare against cache → update the record on change
// - **Scheduler**: Drives the cycle on an interval (or once) until a signal arrives
//
// ## Control Flow
//
// ```text
// Scheduler ── fires ──▶ UpdateCycle ──▶ IpResolver
//                             │
//                             ├──▶ check_and_store (CacheStore)
//                             │
//                             └──▶ updater::apply (DnsProvider), only on change
// ```

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;
pub mod updater;

// Re-export core types for convenience
pub use config::TargetConfig;
pub use engine::{CycleOutcome, Scheduler, Termination, UpdateCycle};
pub use error::{Error, Phase, Result};
pub use state::{CacheCheck, FileCacheStore, check_and_store};
pub use traits::{CacheStore, DnsProvider, IpResolver, ZoneRecord};
