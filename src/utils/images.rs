use crate::error::PreviewError;
use image::{ImageFormat, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};

const MIN_FILE_SIZE: u64 = 100;
const MAX_FILE_SIZE: u64 = 50_000_000;

/// What a preview of a stored image shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub bytes: u64,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn format_name(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("unknown")
    }
}

/// Read an image's size, format and dimensions. The file is never modified.
pub fn inspect(image_path: &Path) -> Result<ImageInfo, PreviewError> {
    let io_err = |source| PreviewError::Io {
        path: image_path.to_path_buf(),
        source,
    };

    let bytes = fs::metadata(image_path).map_err(io_err)?.len();

    // Sniff the content; the `.jpg` extension says nothing about what was served.
    let reader = ImageReader::open(image_path)
        .and_then(|r| r.with_guessed_format())
        .map_err(io_err)?;
    let format = reader
        .format()
        .ok_or_else(|| PreviewError::Invalid("unrecognised image format".to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|source| PreviewError::Decode {
            path: image_path.to_path_buf(),
            source,
        })?;

    Ok(ImageInfo {
        path: image_path.to_path_buf(),
        bytes,
        format,
        width,
        height,
    })
}

/// Flag images that are probably truncated or not images at all.
pub fn validate(info: &ImageInfo) -> Result<(), PreviewError> {
    if info.bytes < MIN_FILE_SIZE {
        return Err(PreviewError::Invalid(
            "image file too small, likely corrupted".to_string(),
        ));
    }

    if info.bytes > MAX_FILE_SIZE {
        return Err(PreviewError::Invalid(
            "image file too large, possibly corrupted or invalid".to_string(),
        ));
    }

    if info.width == 0 || info.height == 0 {
        return Err(PreviewError::Invalid(format!(
            "image has invalid dimensions ({}x{})",
            info.width, info.height
        )));
    }

    Ok(())
}
