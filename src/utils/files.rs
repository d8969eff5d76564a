use crate::error::FetchError;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A file found in the photo directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredPhoto {
    pub file_name: String,
    pub bytes: u64,
}

/// A file still being written. Dropping it before [`PartialFile::keep`]
/// removes the file, so a failed or aborted download leaves nothing behind.
#[derive(Debug)]
pub struct PartialFile {
    path: PathBuf,
    keep: bool,
}

impl PartialFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mark the write as complete and hand back the final path.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::warn!("removed partial file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "failed to remove partial file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// The app-scoped directory every download is written to.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(media_root: impl AsRef<Path>, photo_dir: &str) -> Self {
        Self {
            dir: media_root.as_ref().join(photo_dir),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Create the photo directory if it doesn't exist; reuse it otherwise.
    pub async fn ensure_dir(&self) -> Result<&Path, FetchError> {
        let create_err = |source| FetchError::CreateDir {
            path: self.dir.clone(),
            source,
        };
        if !tokio::fs::try_exists(&self.dir).await.map_err(create_err)? {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(create_err)?;
            tracing::debug!("created photo directory {}", self.dir.display());
        }
        Ok(&self.dir)
    }

    /// Open `file_name` for writing, truncating anything already there. The
    /// returned guard deletes the file again unless the write is kept.
    pub async fn create_file(
        &self,
        file_name: &str,
    ) -> Result<(tokio::fs::File, PartialFile), FetchError> {
        let path = self.path_for(file_name);
        let write_err = |source| FetchError::Write {
            path: path.clone(),
            source,
        };
        if tokio::fs::try_exists(&path).await.map_err(write_err)? {
            tracing::warn!("overwriting existing file {}", path.display());
        }
        let file = tokio::fs::File::create(&path).await.map_err(write_err)?;
        Ok((file, PartialFile { path, keep: false }))
    }

    /// Every regular file in the photo directory, sorted by name.
    pub fn list(&self) -> io::Result<Vec<StoredPhoto>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();

        let mut photos: Vec<StoredPhoto> = paths
            .par_iter()
            .filter_map(|path| {
                let metadata = fs::metadata(path).ok()?;
                if !metadata.is_file() {
                    return None;
                }
                Some(StoredPhoto {
                    file_name: path.file_name()?.to_string_lossy().into_owned(),
                    bytes: metadata.len(),
                })
            })
            .collect();

        photos.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(photos)
    }
}
