use crate::error::{EngineError, Result};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;
use url::Url;

pub(crate) const USER_AGENT: &str = "Pagelens/0.2 (https://github.com/trapdoorsec/pagelens)";

/// Response snapshot for the primary page. Immutable once produced.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub elapsed_ms: u64,
    pub byte_length: usize,
}

/// Single bounded-timeout HTTP fetch. No retries: the primary page either
/// arrives whole or the whole analysis aborts.
pub struct Fetcher {
    client: Client,
    timeout_secs: u64,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_timeout(15)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs.div_ceil(2)))
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout_secs,
        }
    }

    /// Fetch the primary page. Any non-2xx status is terminal; partial or
    /// error pages are never analyzed.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::HttpStatus(status.as_u16()));
        }

        let resolved_url = response.url().to_string();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_lowercase(), v.to_string());
            }
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let byte_length = bytes.len();
        let body = String::from_utf8_lossy(&bytes).into_owned();

        // reqwest strips content-encoding when it transparently decompresses,
        // so the analyzer that inspects it would never see the header. A HEAD
        // probe with an explicit Accept-Encoding recovers it.
        if !headers.contains_key("content-encoding")
            && let Some(encoding) = self.probe_content_encoding(url).await
        {
            headers.insert("content-encoding".to_string(), encoding);
        }

        Ok(FetchResult {
            url: resolved_url,
            status: status.as_u16(),
            headers,
            body,
            elapsed_ms,
            byte_length,
        })
    }

    async fn probe_content_encoding(&self, url: &Url) -> Option<String> {
        let response = self
            .client
            .head(url.clone())
            .header("accept-encoding", "gzip, deflate, br")
            .send()
            .await
            .ok()?;

        response
            .headers()
            .get("content-encoding")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }

    fn classify(&self, error: reqwest::Error) -> EngineError {
        if error.is_timeout() {
            EngineError::Timeout(self.timeout_secs)
        } else {
            EngineError::Network(error.to_string())
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_successful_fetch_captures_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hello</body></html>", "text/html"),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let result = Fetcher::with_timeout(5).fetch(&url).await.unwrap();

        assert_eq!(result.status, 200);
        assert_eq!(result.body, "<html><body>hello</body></html>");
        assert_eq!(result.byte_length, result.body.len());
        assert_eq!(result.headers.get("content-type").unwrap(), "text/html");
    }

    #[tokio::test]
    async fn test_error_status_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = Fetcher::with_timeout(5).fetch(&url).await.unwrap_err();
        assert!(matches!(err, EngineError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = Fetcher::with_timeout(1).fetch(&url).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_content_encoding_recovered_via_head() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-encoding", "gzip"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let result = Fetcher::with_timeout(5).fetch(&url).await.unwrap();
        assert_eq!(result.headers.get("content-encoding").unwrap(), "gzip");
    }
}
