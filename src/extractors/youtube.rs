use crate::core::{Extractor, VideoFormat, VideoMetadata};
use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

/// Protocols whose `url` points at a manifest rather than the media bytes.
const MANIFEST_PROTOCOLS: &[&str] = &["m3u8", "m3u8_native", "http_dash_segments", "mhtml"];

fn video_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").ok())
        .as_ref()
}

/// Resolves YouTube videos by asking an external `yt-dlp` for the
/// page's format list.
pub struct YouTubeExtractor {
    binary: String,
}

impl YouTubeExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn extract_video_id(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;

        let candidate = if host == "youtu.be" {
            url.path_segments()?.next().map(str::to_string)
        } else if is_youtube_host(host) {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, v)| v.to_string()),
                Some("shorts") | Some("embed") | Some("live") | Some("v") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        } else {
            None
        };

        candidate.filter(|id| video_id_pattern().map_or(false, |re| re.is_match(id)))
    }

    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }
}

fn is_youtube_host(host: &str) -> bool {
    matches!(
        host,
        "youtube.com" | "www.youtube.com" | "m.youtube.com" | "music.youtube.com"
    )
}

#[async_trait]
impl Extractor for YouTubeExtractor {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn suitable(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| host == "youtu.be" || is_youtube_host(host))
            .unwrap_or(false)
    }

    async fn extract(&self, url: &Url) -> Result<VideoMetadata> {
        let video_id = self.extract_video_id(url).ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
            reason: "no video id found".to_string(),
        })?;
        let watch_url = Self::watch_url(&video_id);

        info!("Fetching formats for {} via {}", video_id, self.binary);
        let output = Command::new(&self.binary)
            .args(["-J", "--no-playlist", "--no-warnings"])
            .arg(&watch_url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Resolution(format!("failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} exited with {}: {}", self.binary, output.status, stderr);
            return Err(Error::Resolution(if stderr.is_empty() {
                format!("{} exited with {}", self.binary, output.status)
            } else {
                stderr
            }));
        }

        parse_info(&output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    id: String,
    title: String,
    uploader: Option<String>,
    channel: Option<String>,
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    url: Option<String>,
    ext: String,
    protocol: Option<String>,
    format_note: Option<String>,
    height: Option<u32>,
    vcodec: Option<String>,
    acodec: Option<String>,
    filesize: Option<u64>,
    filesize_approx: Option<u64>,
    #[serde(default)]
    http_headers: HashMap<String, String>,
}

fn has_codec(codec: Option<&str>) -> bool {
    codec
        .map(|c| !c.is_empty() && c != "none")
        .unwrap_or(false)
}

impl RawFormat {
    fn into_format(self) -> Option<VideoFormat> {
        let url = self.url?;
        if self
            .protocol
            .as_deref()
            .map(|p| MANIFEST_PROTOCOLS.contains(&p))
            .unwrap_or(false)
        {
            return None;
        }

        let has_audio = has_codec(self.acodec.as_deref());
        let has_video = has_codec(self.vcodec.as_deref());
        let quality_label = if has_video {
            self.format_note
                .filter(|note| !note.trim().is_empty())
                .or_else(|| self.height.map(|h| format!("{}p", h)))
        } else {
            None
        };

        Some(VideoFormat {
            itag: self.format_id,
            url,
            container: self.ext,
            quality_label,
            has_audio,
            has_video,
            filesize: self.filesize.or(self.filesize_approx),
            http_headers: self.http_headers,
        })
    }
}

/// Maps a `yt-dlp -J` document onto [`VideoMetadata`].
pub fn parse_info(json: &[u8]) -> Result<VideoMetadata> {
    let raw: RawInfo = serde_json::from_slice(json)?;
    let listed = raw.formats.len();
    let formats: Vec<VideoFormat> = raw
        .formats
        .into_iter()
        .filter_map(RawFormat::into_format)
        .collect();
    debug!("{} of {} reported formats are direct streams", formats.len(), listed);

    Ok(VideoMetadata {
        id: raw.id,
        title: raw.title,
        author: raw.uploader.or(raw.channel),
        duration: raw.duration.map(|d| d.round() as u64),
        formats,
    })
}
