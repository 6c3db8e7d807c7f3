use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Failed to download {url}: {message}")]
    Http { url: String, message: String },

    #[error("Failed to download {url}: server responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to store download in {}", dir.display())]
    Io {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fetches a URL into a local file and hands back its path.
pub trait Downloader {
    fn download(&self, url: &str) -> impl Future<Output = Result<PathBuf, DownloadError>> + Send;
}

/// Streams downloads into temp files under a scratch directory.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    dest_dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(client: reqwest::Client, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dest_dir: dest_dir.into(),
        }
    }

    fn io_error(&self, source: io::Error) -> DownloadError {
        DownloadError::Io {
            dir: self.dest_dir.clone(),
            source,
        }
    }
}

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<PathBuf, DownloadError> {
        let http_error = |e: reqwest::Error| DownloadError::Http {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut response = self.client.get(url).send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        std::fs::create_dir_all(&self.dest_dir).map_err(|e| self.io_error(e))?;
        // dropped (and deleted) if anything below fails
        let mut temp = tempfile::Builder::new()
            .prefix("endorctl-")
            .tempfile_in(&self.dest_dir)
            .map_err(|e| self.io_error(e))?;

        let mut received = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(http_error)? {
            temp.write_all(&chunk).map_err(|e| self.io_error(e))?;
            received += chunk.len() as u64;
        }
        temp.flush().map_err(|e| self.io_error(e))?;
        tracing::debug!("downloaded {received} bytes from {url}");

        temp.into_temp_path()
            .keep()
            .map_err(|e| self.io_error(e.error))
    }
}
