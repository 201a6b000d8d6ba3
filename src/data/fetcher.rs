use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::error::Error as StdError;
use std::time::Duration;
use crate::config::FetchOptions;

/// Raw page content as returned by a park's booking site.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("request timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("TLS failure: {0}")]
    Tls(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return NetworkError::Timeout;
        }
        if let Some(status) = e.status() {
            return NetworkError::Status(status.as_u16());
        }

        // Walk the cause chain: hyper wraps the io error, rustls/native-tls
        // only surface through their messages.
        let mut source: Option<&(dyn StdError + 'static)> = e.source();
        while let Some(cause) = source {
            if let Some(io) = cause.downcast_ref::<std::io::Error>() {
                if io.kind() == std::io::ErrorKind::ConnectionRefused {
                    return NetworkError::ConnectionRefused;
                }
            }
            let msg = cause.to_string().to_lowercase();
            if msg.contains("certificate") || msg.contains("tls") || msg.contains("handshake") {
                return NetworkError::Tls(cause.to_string());
            }
            source = cause.source();
        }

        NetworkError::Transport(e.to_string())
    }
}

/// Retrieves page content for a URL. Failures are values, never panics.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page, NetworkError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, reqwest::Error> {
        let redirects = if options.follow_redirects {
            redirect::Policy::limited(10)
        } else {
            redirect::Policy::none()
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(options.user_agent.clone())
            .redirect(redirects)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, NetworkError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status(status.as_u16()));
        }

        let body = response.text().await?;

        Ok(Page {
            status: status.as_u16(),
            body,
        })
    }
}
