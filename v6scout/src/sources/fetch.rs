//! URL source.
//!
//! A single GET per read. The whole exchange (connect, headers, body) is
//! bounded by [`FetchOptions::timeout_ms`]; non-2xx answers are errors and the
//! body is decoded as lossy UTF-8.
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{AsyncTextSource, SourceError};
use crate::{address::find_ipv6, utils::SourceUrl};

/// Request settings for [`UrlSource`].
///
/// # Defaults
/// ```rust,ignore
/// FetchOptions {
///     timeout_ms: 10_000,
///     user_agent: "Mozilla/5.0".to_string(),
///     use_system_proxy: true,
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Upper bound for the whole request, in milliseconds.
    pub timeout_ms: u64,
    pub user_agent: String,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: "Mozilla/5.0".to_string(),
            use_system_proxy: true,
        }
    }
}

/// A web page whose body is scanned.
#[derive(Clone, Debug)]
pub struct UrlSource {
    url: SourceUrl,
    options: FetchOptions,
}

impl UrlSource {
    /// Validates `url`, prefixing `http://` when it carries no scheme.
    pub fn new(url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            url: SourceUrl::with_default_scheme(url)?,
            options: FetchOptions::default(),
        })
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn url(&self) -> &SourceUrl {
        &self.url
    }

    /// Fetches the page body.
    ///
    /// # Errors
    /// - [`SourceError::Timeout`] when the exchange exceeds `timeout_ms`
    /// - [`SourceError::Status`] for a non-2xx status
    /// - [`SourceError::Http`] for connection or protocol failures
    pub async fn fetch(&self) -> Result<String, SourceError> {
        let timeout_ms = self.options.timeout_ms;

        match timeout(Duration::from_millis(timeout_ms), self.get()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                url: self.url.full_url.clone(),
                timeout_ms,
            }),
        }
    }

    async fn get(&self) -> Result<String, SourceError> {
        let url = &self.url.full_url;
        let http_error = |e: reqwest::Error| SourceError::Http {
            url: url.clone(),
            reason: e.to_string(),
        };

        let mut builder = reqwest::Client::builder().user_agent(self.options.user_agent.as_str());
        if !self.options.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(http_error)?;

        let response = client.get(url.as_str()).send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(http_error)?;
        debug!(url = %url, bytes = body.len(), "fetched page");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl AsyncTextSource for UrlSource {
    fn describe(&self) -> String {
        self.url.full_url.clone()
    }

    async fn read_text(&self) -> Result<String, SourceError> {
        self.fetch().await
    }
}

/// Fetches `url` and returns every IPv6 literal in the body.
///
/// Any failure (bad URL, network error, timeout, non-2xx) is logged and
/// yields an empty list.
pub async fn find_ipv6_in_url(url: &str) -> Vec<String> {
    let source = match UrlSource::new(url) {
        Ok(source) => source,
        Err(e) => {
            warn!(url, error = %e, "invalid url");
            return Vec::new();
        }
    };

    match source.fetch().await {
        Ok(body) => find_ipv6(body.as_str()),
        Err(e) => {
            warn!(error = %e, "no addresses fetched from url");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    /// Serves one canned response and hands back the raw request.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}/ips", addr), handle)
    }

    fn local_options(timeout_ms: u64) -> FetchOptions {
        FetchOptions {
            timeout_ms,
            use_system_proxy: false,
            ..FetchOptions::default()
        }
    }

    #[test]
    fn test_url_source_defaults_scheme() {
        let source = UrlSource::new("example.com/list").unwrap();
        assert_eq!(source.url().full_url, "http://example.com/list");
        assert_eq!(source.options.timeout_ms, 10_000);
        assert_eq!(source.options.user_agent, "Mozilla/5.0");

        assert!(matches!(
            UrlSource::new("http://exa$mple.com"),
            Err(SourceError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_body_and_user_agent() {
        let body = "hosts: 2001:db8::1 and fe80::1%eth0\n";
        let (url, server) = serve_once(http_response("200 OK", body)).await;

        let source = UrlSource::new(&url).unwrap().with_options(local_options(2_000));
        let text = source.read_text().await.unwrap();
        assert_eq!(text, body);
        assert_eq!(find_ipv6(text.as_str()), vec!["2001:db8::1", "fe80::1%eth0"]);

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /ips http/1.1"));
        assert!(request.contains("user-agent: mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let (url, _server) = serve_once(http_response("404 Not Found", "::1")).await;

        let source = UrlSource::new(&url).unwrap().with_options(local_options(2_000));
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let source = UrlSource::new(&format!("http://{}/", addr))
            .unwrap()
            .with_options(local_options(200));
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Timeout { timeout_ms: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_find_ipv6_in_url_failures_are_empty() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = UrlSource::new(&format!("http://{}/", addr))
            .unwrap()
            .with_options(local_options(2_000));
        assert!(matches!(source.fetch().await, Err(SourceError::Http { .. })));

        assert!(find_ipv6_in_url("ftp://example.com").await.is_empty());
        assert!(find_ipv6_in_url("").await.is_empty());
    }
}
