// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Oui;
use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://api.macvendors.com";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a single lookup attempt that reached the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(String),
    RateLimited,
    Failed(u16),
}

/// One request against the vendor lookup service. `Err` means the service
/// could not be reached at all.
pub trait VendorLookup {
    fn query(&self, oui: &Oui) -> Result<LookupOutcome>;
}

#[derive(Debug, Clone)]
pub struct LookupClient {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl LookupClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("lookup.base_url must not be empty");
        }
        Url::parse(&base_url)
            .with_context(|| format!("lookup.base_url {base_url:?} is not a valid URL"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl VendorLookup for LookupClient {
    fn query(&self, oui: &Oui) -> Result<LookupOutcome> {
        let response = self
            .http
            .get(format!("{}/{}", self.base_url, oui))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(LookupOutcome::RateLimited);
        }
        if status != StatusCode::OK {
            return Ok(LookupOutcome::Failed(status.as_u16()));
        }

        let body = response.text().context("read lookup response")?;
        Ok(LookupOutcome::Found(vendor_from_body(&body)))
    }
}

/// The service answers either with a JSON record or with the bare company
/// name; both are accepted.
pub fn vendor_from_body(body: &str) -> String {
    match serde_json::from_str::<VendorRecord>(body) {
        Ok(record) => record.vendor_details.company.trim().to_owned(),
        Err(_) => body.trim().to_owned(),
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!("cannot reach vendor lookup at {base_url} ({error})")
}

#[derive(Debug, Deserialize)]
struct VendorRecord {
    #[serde(rename = "vendorDetails")]
    vendor_details: VendorDetails,
}

#[derive(Debug, Deserialize)]
struct VendorDetails {
    #[serde(default)]
    company: String,
}
