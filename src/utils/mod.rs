//! Utility modules for image-fetch
//!
//! - `files`: the photo directory and what is stored in it
//! - `http`: HTTP client construction
//! - `images`: previewing stored images

pub mod files;
pub mod http;
pub mod images;

pub use files::{PartialFile, PhotoStore, StoredPhoto};
pub use images::ImageInfo;
