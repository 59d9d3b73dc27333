pub mod catalog;
pub mod destination;
pub mod downloader;
pub mod extractor;
pub mod metadata;
pub mod progress;

pub use catalog::{listable_formats, Catalog};
pub use downloader::{write_stream, Downloader, MediaStream, StreamOpener};
pub use extractor::{Extractor, ExtractorEngine};
pub use metadata::{FormatClass, MediaKind, VideoFormat, VideoMetadata};
pub use progress::{Eta, ProgressRenderer, ProgressSignal, ProgressTracker, ProgressUpdate};
