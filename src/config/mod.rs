use crate::core::MediaKind;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Only list formats that carry audio.
    pub audio_filter: bool,
    /// Only offer audio-only formats.
    pub only_audio: bool,
    pub audio_destination: Option<PathBuf>,
    pub video_destination: Option<PathBuf>,
    pub ytdlp_path: String,
    pub user_agent: String,
    pub timeout: u64,
    pub retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio_filter: true,
            only_audio: false,
            audio_destination: None,
            video_destination: None,
            ytdlp_path: "yt-dlp".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout: 30,
            retries: 3,
        }
    }
}

impl Config {
    /// Defaults, then the optional TOML file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlays environment settings read through `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(value) = var("AUDIO_FILTER") {
            self.audio_filter = !is_falsy(&value);
        }
        if let Some(value) = var("ONLY_AUDIO") {
            self.only_audio = is_truthy(&value);
        }
        if let Some(value) = var("AUDIO_DOWNLOAD_DESTINATION") {
            self.audio_destination = Some(PathBuf::from(value));
        }
        if let Some(value) = var("VIDEO_DOWNLOAD_DESTINATION") {
            self.video_destination = Some(PathBuf::from(value));
        }
        if let Some(value) = var("YTDLP_PATH") {
            self.ytdlp_path = value;
        }
    }

    /// Base directory downloads of `kind` are written to.
    pub fn destination_for(&self, kind: MediaKind) -> PathBuf {
        let configured = match kind {
            MediaKind::Audio => self.audio_destination.as_ref(),
            MediaKind::Video => self.video_destination.as_ref(),
        };

        match configured {
            Some(path) => path.clone(),
            None => default_destination(kind),
        }
    }
}

fn default_destination(kind: MediaKind) -> PathBuf {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    match home {
        Some(home) => PathBuf::from(home).join("Downloads").join(kind.as_str()),
        None => PathBuf::from("downloads").join(kind.as_str()),
    }
}

fn is_falsy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off")
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
