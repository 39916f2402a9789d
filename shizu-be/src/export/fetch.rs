//! Remote media download

use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("Writing {path} failed: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Copies a remote file to a local destination
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// [`RemoteFetcher`] streaming over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    credentials: Option<(String, String)>,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// `authorization` is `user:password`; a value without a colon is a bare user name
    pub fn new(authorization: Option<&str>, timeout_secs: Option<u64>) -> Self {
        let credentials = authorization.map(|auth| match auth.split_once(':') {
            Some((user, password)) => (user.to_string(), password.to_string()),
            None => (auth.to_string(), String::new()),
        });
        Self {
            client: reqwest::Client::new(),
            credentials,
            timeout: timeout_secs.map(Duration::from_secs),
        }
    }

    async fn stream_to(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let write_error = |source| FetchError::Write {
            path: dest.display().to_string(),
            source,
        };

        let mut request = self.client.get(url);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(request_error)?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        let mut file = tokio::fs::File::create(dest).await.map_err(write_error)?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(request_error)?;
            file.write_all(&chunk).await.map_err(write_error)?;
        }
        file.flush().await.map_err(write_error)?;
        Ok(())
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        debug!("Downloading {} to {}", url, dest.display());
        let result = self.stream_to(url, dest).await;
        if result.is_err() && dest.exists() {
            if let Err(e) = tokio::fs::remove_file(dest).await {
                warn!("Could not remove partial download {}: {}", dest.display(), e);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_split_on_first_colon() {
        let fetcher = HttpFetcher::new(Some("crew:pa:ss"), Some(30));
        assert_eq!(
            fetcher.credentials,
            Some(("crew".to_string(), "pa:ss".to_string()))
        );
        assert_eq!(fetcher.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_no_credentials_no_timeout() {
        let fetcher = HttpFetcher::new(None, None);
        assert!(fetcher.credentials.is_none());
        assert!(fetcher.timeout.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_leaves_no_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("set.mp4");
        let fetcher = HttpFetcher::new(None, Some(5));

        let err = fetcher
            .download("http://127.0.0.1:9/set.mp4", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert!(!dest.exists());
    }
}
