//! Record updater
//!
//! Points the single managed record at a new address through a
//! [`DnsProvider`]: zone lookup, exact-one record match, overwrite.

use crate::error::{Error, Result};
use crate::traits::DnsProvider;
use std::net::Ipv4Addr;

/// Overwrite the content of the record named `domain_name` in `zone_name`
///
/// Exactly one record must match the name. Zero or several matches are a
/// misconfiguration and fail with [`Error::RecordCount`] without touching
/// any record.
pub async fn apply(
    provider: &dyn DnsProvider,
    zone_name: &str,
    domain_name: &str,
    new_address: Ipv4Addr,
) -> Result<()> {
    let zone_id = provider.zone_id(zone_name).await?;
    tracing::debug!("Resolved zone {} to id {}", zone_name, zone_id);

    let mut records = provider.list_records(&zone_id, domain_name).await?;
    if records.len() != 1 {
        return Err(Error::record_count(domain_name, records.len()));
    }

    let mut record = records.remove(0);
    tracing::debug!(
        "Updating {} record {} ({}): {} -> {}",
        record.record_type,
        record.name,
        record.id,
        record.content,
        new_address
    );
    record.content = new_address.to_string();

    provider.update_record(&zone_id, &record).await
}
