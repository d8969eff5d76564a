pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod naming;
pub mod scope;
pub mod utils;

pub use config::FetchConfig;
pub use error::{ErrorKind, FetchError, PreviewError};
pub use fetcher::{DownloadRequest, DownloadResult, FetchedImage, ImageFetcher};
pub use naming::{Clock, FileNamer, FixedClock, NamingStrategy, SystemClock};
pub use scope::{DownloadOutcome, DownloadScope, ShutdownReport, TaskId};
pub use utils::{ImageInfo, PartialFile, PhotoStore, StoredPhoto};
