//! Test doubles and common utilities for contract tests
//!
//! Minimal collaborators that count calls so tests can assert exactly what
//! the update cycle did.

#![allow(dead_code)]

use dynflare_core::error::{Error, Result};
use dynflare_core::traits::{CacheStore, DnsProvider, IpResolver, ZoneRecord};
use dynflare_core::{Scheduler, TargetConfig, UpdateCycle};
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A resolver that answers from a script the test can change between cycles
pub struct ScriptedResolver {
    /// Address to answer with; `None` simulates a response with zero answers
    answer: Arc<Mutex<Option<Ipv4Addr>>>,
    /// Call counter for resolve()
    call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    pub fn answering(address: Ipv4Addr) -> Self {
        Self {
            answer: Arc::new(Mutex::new(Some(address))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn empty() -> Self {
        Self {
            answer: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Change the address returned by later calls
    pub fn set_answer(&self, address: Option<Ipv4Addr>) {
        *self.answer.lock().unwrap() = address;
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            answer: Arc::clone(&other.answer),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self, _hostname: &str, _server: &str) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let answer = *self.answer.lock().unwrap();
        answer.ok_or_else(|| Error::lookup("no DNS results"))
    }
}

/// A resolver whose query never completes
pub struct StalledResolver;

#[async_trait::async_trait]
impl IpResolver for StalledResolver {
    async fn resolve(&self, _hostname: &str, _server: &str) -> Result<Ipv4Addr> {
        std::future::pending().await
    }
}

/// An in-memory cache store that tracks calls
pub struct CountingCacheStore {
    value: Arc<Mutex<Option<String>>>,
    load_call_count: Arc<AtomicUsize>,
    store_call_count: Arc<AtomicUsize>,
    fail_loads: bool,
    fail_stores: bool,
}

impl CountingCacheStore {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            value: Arc::new(Mutex::new(initial.map(str::to_string))),
            load_call_count: Arc::new(AtomicUsize::new(0)),
            store_call_count: Arc::new(AtomicUsize::new(0)),
            fail_loads: false,
            fail_stores: false,
        }
    }

    pub fn failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    pub fn failing_stores(mut self) -> Self {
        self.fail_stores = true;
        self
    }

    pub fn value(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    pub fn store_call_count(&self) -> usize {
        self.store_call_count.load(Ordering::SeqCst)
    }

    pub fn load_call_count(&self) -> usize {
        self.load_call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            value: Arc::clone(&other.value),
            load_call_count: Arc::clone(&other.load_call_count),
            store_call_count: Arc::clone(&other.store_call_count),
            fail_loads: other.fail_loads,
            fail_stores: other.fail_stores,
        }
    }
}

#[async_trait::async_trait]
impl CacheStore for CountingCacheStore {
    async fn load(&self) -> Result<Option<String>> {
        self.load_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads {
            return Err(Error::cache("permission denied"));
        }
        Ok(self.value.lock().unwrap().clone())
    }

    async fn store(&self, value: &str) -> Result<()> {
        self.store_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_stores {
            return Err(Error::cache("read-only file system"));
        }
        *self.value.lock().unwrap() = Some(value.to_string());
        Ok(())
    }
}

/// A mock DnsProvider that tracks calls
pub struct MockDnsProvider {
    /// Records returned by list_records()
    records: Arc<Mutex<Vec<ZoneRecord>>>,
    /// Call counters
    zone_call_count: Arc<AtomicUsize>,
    list_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    /// Records submitted to update_record()
    updated_records: Arc<Mutex<Vec<ZoneRecord>>>,
    /// Fail update_record() with a provider error
    fail_updates: bool,
    /// Never complete update_record()
    stall_updates: bool,
}

impl MockDnsProvider {
    /// A provider whose zone holds `records` for any name
    pub fn with_records(records: Vec<ZoneRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            zone_call_count: Arc::new(AtomicUsize::new(0)),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updated_records: Arc::new(Mutex::new(Vec::new())),
            fail_updates: false,
            stall_updates: false,
        }
    }

    /// A provider with exactly one A record for `name`
    pub fn single(name: &str, content: &str) -> Self {
        Self::with_records(vec![a_record("rec-1", name, content)])
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn stalling_updates(mut self) -> Self {
        self.stall_updates = true;
        self
    }

    pub fn zone_call_count(&self) -> usize {
        self.zone_call_count.load(Ordering::SeqCst)
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn updated_records(&self) -> Vec<ZoneRecord> {
        self.updated_records.lock().unwrap().clone()
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            zone_call_count: Arc::clone(&other.zone_call_count),
            list_call_count: Arc::clone(&other.list_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            updated_records: Arc::clone(&other.updated_records),
            fail_updates: other.fail_updates,
            stall_updates: other.stall_updates,
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn zone_id(&self, _zone_name: &str) -> Result<String> {
        self.zone_call_count.fetch_add(1, Ordering::SeqCst);
        Ok("zone-1".to_string())
    }

    async fn list_records(&self, _zone_id: &str, _name: &str) -> Result<Vec<ZoneRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().clone())
    }

    async fn update_record(&self, _zone_id: &str, record: &ZoneRecord) -> Result<()> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        if self.stall_updates {
            std::future::pending::<()>().await;
        }
        if self.fail_updates {
            return Err(Error::provider("mock", "Rate limit exceeded"));
        }
        self.updated_records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build an A record
pub fn a_record(id: &str, name: &str, content: &str) -> ZoneRecord {
    ZoneRecord {
        id: id.to_string(),
        name: name.to_string(),
        record_type: "A".to_string(),
        content: content.to_string(),
        ttl: 1,
        proxied: Some(false),
    }
}

/// Helper to create a minimal TargetConfig for testing
pub fn minimal_config(cache_path: &Path, interval: Option<Duration>) -> Arc<TargetConfig> {
    Arc::new(
        TargetConfig::new("home.example.com", "example.com")
            .with_cache_path(cache_path)
            .with_interval(interval),
    )
}

/// Assemble a cycle from test doubles
pub fn cycle(
    config: Arc<TargetConfig>,
    resolver: impl IpResolver + 'static,
    cache: impl CacheStore + 'static,
    provider: impl DnsProvider + 'static,
) -> UpdateCycle {
    UpdateCycle::new(config, Box::new(resolver), Box::new(cache), Box::new(provider))
}

/// Assemble a scheduler from test doubles
pub fn scheduler(
    config: Arc<TargetConfig>,
    resolver: impl IpResolver + 'static,
    cache: impl CacheStore + 'static,
    provider: impl DnsProvider + 'static,
) -> Scheduler {
    Scheduler::new(cycle(config, resolver, cache, provider))
}
