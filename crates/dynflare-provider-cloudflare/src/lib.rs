// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of dynflare's
// `DnsProvider` trait.
//
// ## Behavior
//
// - One HTTP request per trait call
// - Full error propagation: no retry, no backoff, no caching
// - HTTP timeout configured (30 seconds)
// - Specific error messages for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - Dry-run mode: lookups are real, the update is only logged
//
// ## Security Requirements
//
// - The API key NEVER appears in logs or `Debug` output
// - Credentials come from the environment only (`CF_API_KEY`, `CF_API_EMAIL`)
// - Construction fails fast if either credential is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dynflare_core::traits::{DnsProvider, ZoneRecord};
use dynflare_core::{Error, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Name used in provider errors and logs
const PROVIDER_NAME: &str = "cloudflare";

/// Standard Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

/// An entry of the envelope's `errors` array
#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

/// Zone entry of a `/zones` listing
#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

/// Body of a record update
#[derive(Debug, Serialize)]
struct UpdatePayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxied: Option<bool>,
}

impl<'a> From<&'a ZoneRecord> for UpdatePayload<'a> {
    fn from(record: &'a ZoneRecord) -> Self {
        Self {
            record_type: &record.record_type,
            name: &record.name,
            content: &record.content,
            ttl: record.ttl,
            proxied: record.proxied,
        }
    }
}

/// Cloudflare DNS provider
///
/// Authenticates with the global API key and account email
/// (`X-Auth-Key` / `X-Auth-Email`).
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record lookup)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Global API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Account email paired with the API key
    email: String,

    /// API base URL
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_key", &"<REDACTED>")
            .field("email", &self.email)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_key`: Global API key
    /// - `email`: Account email the key belongs to
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if either credential is empty or the HTTP client
    /// cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let email = email.into();

        if api_key.trim().is_empty() || email.trim().is_empty() {
            return Err(Error::config(
                "failed to construct cloudflare api client, are CF_API_KEY and CF_API_EMAIL set?",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        if dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_key,
            email,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Point the provider at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether updates are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Start an authenticated request
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Auth-Key", &self.api_key)
            .header("X-Auth-Email", &self.email)
            .header("Content-Type", "application/json")
    }

    /// Send a request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        if !status.is_success() {
            return Err(status_error(status, &body, context));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })?;

        unwrap_envelope(envelope, context)
    }
}

/// Map a non-success HTTP status to a provider error
fn status_error(status: StatusCode, body: &str, context: &str) -> Error {
    let message = match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid API key or insufficient permissions. Status: {}",
            status
        ),
        404 => format!("{}: not found. Status: {}", context, status),
        409 => format!(
            "Conflict: Record is being updated by another process. Status: {}",
            status
        ),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!("Cloudflare server error (transient): {} - {}", status, body),
        _ => format!("{} failed: {} - {}", context, status, body),
    };
    Error::provider(PROVIDER_NAME, message)
}

/// Turn a decoded envelope into its result
fn unwrap_envelope<T>(envelope: Envelope<T>, context: &str) -> Result<T> {
    if !envelope.success {
        let messages: Vec<String> = envelope
            .errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect();
        return Err(Error::provider(
            PROVIDER_NAME,
            format!("{} rejected: {}", context, messages.join("; ")),
        ));
    }

    envelope.result.ok_or_else(|| {
        Error::provider(
            PROVIDER_NAME,
            format!("{}: invalid response format, missing result", context),
        )
    })
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for: {}", zone_name);

        let request = self
            .request(reqwest::Method::GET, "/zones")
            .query(&[("name", zone_name)]);
        let zones: Vec<Zone> = self.send(request, "Zone lookup").await?;

        let zone = zones.into_iter().next().ok_or_else(|| {
            Error::provider(PROVIDER_NAME, format!("Zone not found: {}", zone_name))
        })?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<ZoneRecord>> {
        tracing::debug!("Listing records named {} in zone {}", name, zone_id);

        let request = self
            .request(
                reqwest::Method::GET,
                &format!("/zones/{}/dns_records", zone_id),
            )
            .query(&[("name", name)]);
        let records: Vec<ZoneRecord> = self.send(request, "Record lookup").await?;

        tracing::debug!("Found {} record(s) named {}", records.len(), name);
        Ok(records)
    }

    async fn update_record(&self, zone_id: &str, record: &ZoneRecord) -> Result<()> {
        let path = format!("/zones/{}/dns_records/{}", zone_id, record.id);
        let payload = UpdatePayload::from(record);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {}{} with payload: {}",
                self.base_url,
                path,
                serde_json::to_string(&payload).unwrap_or_default()
            );
            return Ok(());
        }

        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} ({})",
            record.name,
            record.content,
            record.record_type
        );

        let request = self.request(reqwest::Method::PUT, &path).json(&payload);
        let _: serde_json::Value = self.send(request, "Record update").await?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
