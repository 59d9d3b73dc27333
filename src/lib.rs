pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod extractors;
pub mod utils;

pub use config::Config;
pub use core::{Catalog, Downloader, ExtractorEngine, ProgressTracker, VideoFormat, VideoMetadata};
pub use error::{Error, Result};
pub use extractors::YouTubeExtractor;
