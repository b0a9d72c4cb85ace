//! Ancillary probes: sitemap, PageSpeed, llms.txt, robots.txt and the
//! HTTP-to-HTTPS redirect check. Probes run concurrently and degrade
//! independently; the gatherer itself never fails.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const PAGESPEED_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

// Shared project key used when no deployment-specific key is configured.
const FALLBACK_PAGESPEED_KEY: &str = "AIzaSyD4mXqzB1pagelens0sharedProjectKey00";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitemapProbe {
    pub exists: bool,
    pub found_at: Option<String>,
    /// Every URL attempted, recorded regardless of outcome.
    pub tested_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmsProbe {
    pub llms_txt: Option<String>,
    pub llms_full_txt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfScores {
    pub performance: Option<f64>,
    pub seo: Option<f64>,
    pub accessibility: Option<f64>,
    pub best_practices: Option<f64>,
}

/// PageSpeed outcome. Failures are tagged values, never exceptions: the
/// consuming analyzer renders a degraded-but-valid verdict from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PerfOutcome {
    Scores(PerfScores),
    Error { kind: PerfErrorKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerfErrorKind {
    RateLimited,
    ApiNotEnabled,
    Timeout,
    Network,
    BadResponse,
}

impl PerfErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            PerfErrorKind::RateLimited => "PageSpeed API rate limit exceeded",
            PerfErrorKind::ApiNotEnabled => "PageSpeed API not enabled for this key",
            PerfErrorKind::Timeout => "PageSpeed API request timed out",
            PerfErrorKind::Network => "PageSpeed API could not be reached",
            PerfErrorKind::BadResponse => "PageSpeed API returned an unusable response",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpsRedirectProbe {
    pub status: u16,
    pub location: Option<String>,
}

/// Everything the ancillary-dependent analyzers consume. Every field is
/// independently degradable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncillaryData {
    pub sitemap: SitemapProbe,
    pub perf: PerfOutcome,
    pub llms: LlmsProbe,
    pub robots_txt: Option<String>,
    pub https_redirect: Option<HttpsRedirectProbe>,
}

impl AncillaryData {
    /// Fully-degraded ancillary data, used as a safe default in tests.
    pub fn empty() -> Self {
        Self {
            sitemap: SitemapProbe::default(),
            perf: PerfOutcome::Error {
                kind: PerfErrorKind::Network,
            },
            llms: LlmsProbe::default(),
            robots_txt: None,
            https_redirect: None,
        }
    }
}

pub struct Gatherer {
    probe_client: Client,
    perf_client: Client,
    redirect_client: Client,
    pagespeed_endpoint: String,
    api_key: String,
    retry_pause: Duration,
}

impl Gatherer {
    pub fn new(api_key: Option<String>) -> Self {
        let probe_client = Client::builder()
            .user_agent(crate::fetch::USER_AGENT)
            .timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        let perf_client = Client::builder()
            .user_agent(crate::fetch::USER_AGENT)
            .timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to create HTTP client");

        let redirect_client = Client::builder()
            .user_agent(crate::fetch::USER_AGENT)
            .timeout(Duration::from_secs(6))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            probe_client,
            perf_client,
            redirect_client,
            pagespeed_endpoint: PAGESPEED_ENDPOINT.to_string(),
            api_key: resolve_api_key(api_key),
            retry_pause: Duration::from_secs(1),
        }
    }

    /// Point the PageSpeed probe at a different endpoint. Test hook.
    pub fn with_pagespeed_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.pagespeed_endpoint = endpoint.into();
        self
    }

    /// Scale the 3s/2s retry pauses. Test hook; 1.0 in production.
    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    /// Shrink the per-attempt PageSpeed timeout. Test hook; 90s in production.
    pub fn with_perf_timeout(mut self, timeout: Duration) -> Self {
        self.perf_client = Client::builder()
            .user_agent(crate::fetch::USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        self
    }

    /// Run all probes concurrently and join them. One probe failing never
    /// blocks or fails the others.
    pub async fn gather(&self, origin: &Url, page_url: &Url) -> AncillaryData {
        let (sitemap, perf, llms, robots_txt, https_redirect) = tokio::join!(
            self.probe_sitemap(origin),
            self.probe_performance(page_url),
            self.probe_llms(origin),
            self.probe_robots(origin),
            self.probe_https_redirect(origin),
        );

        AncillaryData {
            sitemap,
            perf,
            llms,
            robots_txt,
            https_redirect,
        }
    }

    /// HEAD `/sitemap.xml` at the origin; on failure, toggle a leading
    /// `www.` on the host and try once more.
    pub async fn probe_sitemap(&self, origin: &Url) -> SitemapProbe {
        let mut candidates = Vec::new();
        if let Ok(primary) = origin.join("/sitemap.xml") {
            candidates.push(primary);
        }
        if let Some(alternate) = alternate_origin(origin)
            && let Ok(alt) = alternate.join("/sitemap.xml")
        {
            candidates.push(alt);
        }
        self.probe_sitemap_candidates(candidates).await
    }

    pub(crate) async fn probe_sitemap_candidates(&self, candidates: Vec<Url>) -> SitemapProbe {
        let mut tested_urls = Vec::new();

        for candidate in candidates {
            tested_urls.push(candidate.to_string());
            match self.probe_client.head(candidate.clone()).send().await {
                Ok(response) if response.status().is_success() => {
                    return SitemapProbe {
                        exists: true,
                        found_at: Some(response.url().to_string()),
                        tested_urls,
                    };
                }
                Ok(response) => {
                    debug!("Sitemap probe {} returned {}", candidate, response.status());
                }
                Err(e) => {
                    debug!("Sitemap probe {} failed: {}", candidate, e);
                }
            }
        }

        SitemapProbe {
            exists: false,
            found_at: None,
            tested_urls,
        }
    }

    /// PageSpeed Insights, mobile strategy, four categories. 429 pauses 3s
    /// and retries once; a timeout pauses 2s and retries once; 403 is
    /// terminal ("API not enabled"). Max two attempts either way.
    pub async fn probe_performance(&self, page_url: &Url) -> PerfOutcome {
        let mut attempts = 0u8;

        loop {
            attempts += 1;

            let request = self
                .perf_client
                .get(&self.pagespeed_endpoint)
                .query(&[
                    ("url", page_url.as_str()),
                    ("strategy", "mobile"),
                    ("key", self.api_key.as_str()),
                ])
                .query(&[
                    ("category", "performance"),
                    ("category", "seo"),
                    ("category", "accessibility"),
                    ("category", "best-practices"),
                ]);

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    match status {
                        429 => {
                            if attempts >= 2 {
                                warn!("PageSpeed rate limited twice, giving up");
                                return PerfOutcome::Error {
                                    kind: PerfErrorKind::RateLimited,
                                };
                            }
                            debug!("PageSpeed rate limited, backing off before retry");
                            tokio::time::sleep(3 * self.retry_pause).await;
                        }
                        403 => {
                            return PerfOutcome::Error {
                                kind: PerfErrorKind::ApiNotEnabled,
                            };
                        }
                        s if (200..300).contains(&s) => {
                            return match response.json::<serde_json::Value>().await {
                                Ok(body) => PerfOutcome::Scores(parse_pagespeed_scores(&body)),
                                Err(_) => PerfOutcome::Error {
                                    kind: PerfErrorKind::BadResponse,
                                },
                            };
                        }
                        _ => {
                            warn!("PageSpeed returned HTTP {}", status);
                            return PerfOutcome::Error {
                                kind: PerfErrorKind::BadResponse,
                            };
                        }
                    }
                }
                Err(e) if e.is_timeout() => {
                    if attempts >= 2 {
                        return PerfOutcome::Error {
                            kind: PerfErrorKind::Timeout,
                        };
                    }
                    debug!("PageSpeed attempt timed out, retrying");
                    tokio::time::sleep(2 * self.retry_pause).await;
                }
                Err(e) => {
                    debug!("PageSpeed request failed: {}", e);
                    return PerfOutcome::Error {
                        kind: PerfErrorKind::Network,
                    };
                }
            }
        }
    }

    /// Fetch `/llms.txt` and `/llms-full.txt` concurrently. An empty body
    /// counts as absent.
    pub async fn probe_llms(&self, origin: &Url) -> LlmsProbe {
        let (llms_txt, llms_full_txt) = tokio::join!(
            self.fetch_text(origin, "/llms.txt"),
            self.fetch_text(origin, "/llms-full.txt"),
        );

        LlmsProbe {
            llms_txt,
            llms_full_txt,
        }
    }

    pub async fn probe_robots(&self, origin: &Url) -> Option<String> {
        self.fetch_text(origin, "/robots.txt").await
    }

    /// GET the http:// variant of the origin without following redirects, to
    /// see whether plain-HTTP traffic is upgraded.
    pub async fn probe_https_redirect(&self, origin: &Url) -> Option<HttpsRedirectProbe> {
        let mut http_origin = origin.clone();
        if http_origin.set_scheme("http").is_err() {
            return None;
        }

        match self.redirect_client.get(http_origin).send().await {
            Ok(response) => {
                let location = response
                    .headers()
                    .get("location")
                    .and_then(|v| v.to_str().ok())
                    .map(|s| s.to_string());
                Some(HttpsRedirectProbe {
                    status: response.status().as_u16(),
                    location,
                })
            }
            Err(e) => {
                debug!("HTTPS redirect probe failed: {}", e);
                None
            }
        }
    }

    async fn fetch_text(&self, origin: &Url, path: &str) -> Option<String> {
        let url = origin.join(path).ok()?;
        let response = self.probe_client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body = response.text().await.ok()?;
        if body.trim().is_empty() {
            return None;
        }
        Some(body)
    }
}

fn resolve_api_key(configured: Option<String>) -> String {
    configured
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var("PAGESPEED_API_KEY").ok())
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_PAGESPEED_KEY.to_string())
}

/// Origin with a leading `www.` toggled on the host.
pub fn alternate_origin(origin: &Url) -> Option<Url> {
    let host = origin.host_str()?;
    let toggled = match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => format!("www.{}", host),
    };

    let mut alternate = origin.clone();
    alternate.set_host(Some(&toggled)).ok()?;
    Some(alternate)
}

fn parse_pagespeed_scores(body: &serde_json::Value) -> PerfScores {
    let category = |name: &str| -> Option<f64> {
        body.pointer(&format!("/lighthouseResult/categories/{}/score", name))
            .and_then(|v| v.as_f64())
    };

    PerfScores {
        performance: category("performance"),
        seo: category("seo"),
        accessibility: category("accessibility"),
        best_practices: category("best-practices"),
    }
}
