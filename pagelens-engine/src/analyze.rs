//! Top-level orchestration: normalize the target URL, fetch the page and the
//! ancillary probes concurrently, then run every analyzer over the result.

use crate::analyzers;
use crate::context::AnalyzeContext;
use crate::document::Document;
use crate::error::{EngineError, Result};
use crate::fetch::Fetcher;
use crate::probes::Gatherer;
use crate::verdict::Verdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use url::Url;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Timeout for the main page fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// PageSpeed API key; falls back to the PAGESPEED_API_KEY environment
    /// variable when absent.
    pub pagespeed_api_key: Option<String>,
    /// Override for the PageSpeed endpoint, used by tests.
    pub pagespeed_endpoint: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 15,
            pagespeed_api_key: None,
            pagespeed_endpoint: None,
        }
    }
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
    pub load_time_ms: u64,
    pub content_length: usize,
    pub results: BTreeMap<String, Verdict>,
}

/// Fetch and analyze a single page.
pub async fn analyze(raw_url: &str, config: &AnalyzerConfig) -> Result<AnalysisReport> {
    let url = normalize_url(raw_url)?;
    let origin = origin_of(&url)?;

    info!("Analyzing {}", url);

    let fetcher = Fetcher::with_timeout(config.fetch_timeout_secs);
    let mut gatherer = Gatherer::new(config.pagespeed_api_key.clone());
    if let Some(endpoint) = &config.pagespeed_endpoint {
        gatherer = gatherer.with_pagespeed_endpoint(endpoint.clone());
    }

    let (fetch, ancillary) = tokio::join!(fetcher.fetch(&url), gatherer.gather(&origin, &url));
    let fetch = fetch?;

    let doc = Document::parse(&fetch.body);
    let ctx = AnalyzeContext {
        doc: &doc,
        url: &url,
        fetch: &fetch,
        ancillary: &ancillary,
    };
    let results = analyzers::run_all(&ctx);

    info!("Completed {} checks for {}", results.len(), url);

    Ok(AnalysisReport {
        url: url.to_string(),
        analyzed_at: Utc::now(),
        load_time_ms: fetch.elapsed_ms,
        content_length: fetch.byte_length,
        results,
    })
}

/// Accept bare hostnames by defaulting to https, then insist on an absolute
/// http(s) URL with a host.
pub fn normalize_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidUrl("empty URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| EngineError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(EngineError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(EngineError::InvalidUrl(format!("no host in '{}'", trimmed)));
    }

    Ok(url)
}

fn origin_of(url: &Url) -> Result<Url> {
    url.join("/")
        .map_err(|e| EngineError::InvalidUrl(format!("cannot derive origin: {}", e)))
}
