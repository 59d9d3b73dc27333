use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub duration: Option<u64>,
    pub formats: Vec<VideoFormat>,
}

/// One encoding variant of a video as reported by the resolution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFormat {
    /// The itag, unique within one lookup.
    pub itag: String,
    pub url: String,
    /// File extension of the container, e.g. `mp4` or `webm`.
    pub container: String,
    pub quality_label: Option<String>,
    pub has_audio: bool,
    pub has_video: bool,
    pub filesize: Option<u64>,
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog bucket a format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    AudioOnly,
    VideoWithAudio,
    /// Video-only or capability-less formats; never offered for download.
    Excluded,
}

impl VideoFormat {
    /// Top-level mime type: anything carrying a picture is `video`.
    pub fn media_kind(&self) -> MediaKind {
        if self.has_video {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }

    pub fn class(&self) -> FormatClass {
        match (self.has_audio, self.has_video) {
            (true, false) => FormatClass::AudioOnly,
            (true, true) => FormatClass::VideoWithAudio,
            _ => FormatClass::Excluded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(has_audio: bool, has_video: bool) -> VideoFormat {
        VideoFormat {
            itag: "18".to_string(),
            url: "https://example.com/v".to_string(),
            container: "mp4".to_string(),
            quality_label: None,
            has_audio,
            has_video,
            filesize: None,
            http_headers: HashMap::new(),
        }
    }

    #[test]
    fn test_class_from_capabilities() {
        assert_eq!(format(true, false).class(), FormatClass::AudioOnly);
        assert_eq!(format(true, true).class(), FormatClass::VideoWithAudio);
        assert_eq!(format(false, true).class(), FormatClass::Excluded);
        assert_eq!(format(false, false).class(), FormatClass::Excluded);
    }

    #[test]
    fn test_media_kind() {
        assert_eq!(format(true, false).media_kind(), MediaKind::Audio);
        assert_eq!(format(true, true).media_kind(), MediaKind::Video);
        assert_eq!(MediaKind::Video.to_string(), "video");
    }
}
