use crate::config::Config;
use crate::core::VideoFormat;
use crate::error::{Error, Result};
use crate::utils::sanitize_title;
use std::path::{Path, PathBuf};
use tracing::debug;

const AUDIO_QUALITY_TOKEN: &str = "audio";
const UNTITLED: &str = "untitled";
/// Keeps the whole name under the usual 255-byte file name limit.
const MAX_TITLE_BYTES: usize = 200;

/// `<sanitized-title>_<quality-label-or-"audio">.<container>`
pub fn file_name(title: &str, format: &VideoFormat) -> String {
    let title = match sanitize_title(title) {
        t if t.is_empty() => UNTITLED.to_string(),
        t => truncate_on_char_boundary(t, MAX_TITLE_BYTES),
    };
    let quality = format
        .quality_label
        .as_deref()
        .map(sanitize_title)
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| AUDIO_QUALITY_TOKEN.to_string());

    format!("{}_{}.{}", title, quality.replace(' ', "_"), format.container)
}

fn truncate_on_char_boundary(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    text
}

/// Computes the absolute output path for `format` and makes sure its directory exists.
pub async fn resolve(title: &str, format: &VideoFormat, config: &Config) -> Result<PathBuf> {
    let base = absolute(&config.destination_for(format.media_kind()))?;
    ensure_dir(&base).await?;

    let path = base.join(file_name(title, format));
    debug!("Resolved destination {}", path.display());
    Ok(path)
}

/// Recursive and idempotent: an existing directory, including one created
/// concurrently by someone else, is not an error.
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Error::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
