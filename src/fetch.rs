use std::{future::Future, path::Path, time::Duration};

use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};

const ZERO_DURATION: Duration = Duration::from_secs(0);

/// Errors raised while downloading a URL to disk.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("failed writing response to disk")]
    Io(#[from] std::io::Error),
}

/// Downloads a URL into a local file.
///
/// Implementations make a single attempt; retrying is left to the caller.
pub trait Fetcher: Send + Sync {
    /// Downloads `url` and writes the response body to `dest`, replacing any
    /// existing content.
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = Result<(), FetchError>> + Send;
}

/// A [`Fetcher`] backed by a `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher sending `user_agent` with every request.
    ///
    /// Pass the zero duration to disable the timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if timeout > ZERO_DURATION {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        let mut output_file = fs::File::create(dest).await?;
        while let Some(chunk) = response.chunk().await? {
            output_file.write_all(&chunk).await?;
        }
        output_file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client() {
        assert!(HttpFetcher::new("webmap-stitch-test", Duration::from_secs(5)).is_ok());
        assert!(HttpFetcher::new("webmap-stitch-test", ZERO_DURATION).is_ok());
    }
}
