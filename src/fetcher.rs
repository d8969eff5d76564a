use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::naming::{Clock, FileNamer};
use crate::utils::files::PhotoStore;
use crate::utils::http::build_client;
use futures::stream::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// A URL as typed by the user. Deliberately not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: u64,
}

pub type DownloadResult = Result<FetchedImage, FetchError>;

/// Downloads one URL into the photo directory per call.
pub struct ImageFetcher {
    client: reqwest::Client,
    store: PhotoStore,
    namer: FileNamer,
}

impl ImageFetcher {
    pub fn new(config: &FetchConfig, media_root: &Path) -> Result<Self, FetchError> {
        let namer = FileNamer::new(config.naming);
        Self::with_namer(config, media_root, namer)
    }

    pub fn with_clock(
        config: &FetchConfig,
        media_root: &Path,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, FetchError> {
        let namer = FileNamer::with_clock(config.naming, clock);
        Self::with_namer(config, media_root, namer)
    }

    fn with_namer(
        config: &FetchConfig,
        media_root: &Path,
        namer: FileNamer,
    ) -> Result<Self, FetchError> {
        let client = build_client(config).map_err(FetchError::Client)?;
        Ok(Self {
            client,
            store: PhotoStore::new(media_root, &config.photo_dir),
            namer,
        })
    }

    pub fn store(&self) -> &PhotoStore {
        &self.store
    }

    pub async fn download(&self, request: &DownloadRequest) -> DownloadResult {
        self.fetch(&request.url).await
    }

    /// GET `url` and stream the body to a freshly named file in the photo
    /// directory. Nothing touches the disk unless the response is 2xx.
    pub async fn fetch(&self, url: &str) -> DownloadResult {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let file_name = self.namer.next_name();
        self.store.ensure_dir().await?;
        // Dropping `partial` (early return, or the task being aborted) deletes the file.
        let (file, partial) = self.store.create_file(&file_name).await?;
        let mut file = file;
        tracing::debug!("writing {} to {}", url, partial.path().display());

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::from_reqwest(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|source| FetchError::Write {
                    path: partial.path().to_path_buf(),
                    source,
                })?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|source| FetchError::Write {
                path: partial.path().to_path_buf(),
                source,
            })?;
        drop(file);
        let path = partial.keep();

        tracing::info!("saved {} ({} bytes) from {}", file_name, written, url);
        Ok(FetchedImage {
            file_name,
            path,
            bytes: written,
        })
    }
}
