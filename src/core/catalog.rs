//! Deduplicates the formats of one lookup and sorts them into the two buckets
//! a user may pick from: audio-only and video-with-audio.
//!
//! Video-only formats are dropped on purpose. A video-only stream would need
//! a separate audio download and a mux step, which this tool does not do.

use crate::core::{FormatClass, VideoFormat};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    audio_only: Vec<VideoFormat>,
    video_with_audio: Vec<VideoFormat>,
}

impl Catalog {
    /// Builds a catalog from raw formats. The first format seen for an itag wins.
    pub fn build(formats: &[VideoFormat]) -> Self {
        let mut seen = HashSet::new();
        let mut catalog = Catalog::default();

        for format in formats {
            if !seen.insert(format.itag.as_str()) {
                continue;
            }
            match format.class() {
                FormatClass::AudioOnly => catalog.audio_only.push(format.clone()),
                FormatClass::VideoWithAudio => catalog.video_with_audio.push(format.clone()),
                FormatClass::Excluded => {}
            }
        }

        catalog
    }

    /// Keeps only the audio-only bucket.
    pub fn restrict_to_audio(mut self) -> Self {
        self.video_with_audio.clear();
        self
    }

    pub fn audio_only(&self) -> &[VideoFormat] {
        &self.audio_only
    }

    pub fn video_with_audio(&self) -> &[VideoFormat] {
        &self.video_with_audio
    }

    /// All entries, audio-only first.
    pub fn iter(&self) -> impl Iterator<Item = &VideoFormat> {
        self.audio_only.iter().chain(self.video_with_audio.iter())
    }

    pub fn find(&self, itag: &str) -> Option<&VideoFormat> {
        self.iter().find(|format| format.itag == itag)
    }

    pub fn len(&self) -> usize {
        self.audio_only.len() + self.video_with_audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Upstream listing filter. With `require_audio` set only formats that carry
/// audio are passed on to [`Catalog::build`].
pub fn listable_formats(formats: &[VideoFormat], require_audio: bool) -> Vec<VideoFormat> {
    formats
        .iter()
        .filter(|format| !require_audio || format.has_audio)
        .cloned()
        .collect()
}
