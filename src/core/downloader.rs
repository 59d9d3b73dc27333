use crate::config::Config;
use crate::core::progress::{ProgressRenderer, ProgressSignal, ProgressTracker};
use crate::core::VideoFormat;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// A response body on its way to disk.
pub struct MediaStream {
    /// Expected byte count, when the source announces one.
    pub total: Option<u64>,
    pub body: BoxStream<'static, Result<Bytes>>,
}

#[async_trait]
pub trait StreamOpener: Send + Sync {
    async fn open(&self, format: &VideoFormat) -> Result<MediaStream>;
}

/// Caps the retry delay at 64 seconds however many attempts are configured.
const MAX_BACKOFF_EXPONENT: u32 = 6;

fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(2_u64.saturating_pow(attempt.min(MAX_BACKOFF_EXPONENT)))
}

pub struct Downloader {
    client: reqwest::Client,
    pub max_attempts: u32,
}

impl Downloader {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.timeout))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            max_attempts: config.retries.max(1),
        })
    }

    fn should_retry(status: reqwest::StatusCode) -> bool {
        status.as_u16() == 403 || status.as_u16() == 429 || status.is_server_error()
    }
}

#[async_trait]
impl StreamOpener for Downloader {
    /// Retries with exponential backoff until the body starts; never after.
    async fn open(&self, format: &VideoFormat) -> Result<MediaStream> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut request = self
                .client
                .get(&format.url)
                .header("Accept", "*/*")
                .header("Accept-Language", "en-US,en;q=0.9");
            for (name, value) in &format.http_headers {
                request = request.header(name.as_str(), value.as_str());
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if attempt >= self.max_attempts {
                        return Err(e.into());
                    }
                    warn!("Request failed (attempt {}): {}", attempt, e);
                    tokio::time::sleep(backoff(attempt)).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let total = response.content_length().filter(|&len| len > 0);
                let body = response.bytes_stream().map_err(Error::from).boxed();
                return Ok(MediaStream { total, body });
            }

            if Self::should_retry(status) && attempt < self.max_attempts {
                warn!(
                    "HTTP {} (attempt {}), retrying in {} seconds...",
                    status,
                    attempt,
                    backoff(attempt).as_secs()
                );
                tokio::time::sleep(backoff(attempt)).await;
                continue;
            }

            return Err(Error::HttpStatus {
                status: status.as_u16(),
                attempts: attempt,
            });
        }
    }
}

async fn write_chunk(file: &mut File, chunk: &[u8]) -> std::io::Result<()> {
    file.write_all(chunk).await?;
    file.flush().await
}

/// Writes `stream` to `path` chunk by chunk, reporting each chunk to `tracker`.
///
/// On a stream error the tracker is failed and the bytes written so far stay on disk.
pub async fn write_stream<R: ProgressRenderer>(
    stream: MediaStream,
    path: &Path,
    tracker: &mut ProgressTracker<R>,
) -> Result<u64> {
    let MediaStream { total, mut body } = stream;
    let mut file = File::create(path).await?;
    let mut downloaded = 0u64;

    tracker.start(total);

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let message = match e {
                    Error::Stream(message) => message,
                    other => other.to_string(),
                };
                tracker.fail(&message);
                file.flush().await?;
                return Err(Error::Stream(message));
            }
        };

        // Flushed per chunk so a cancelled download keeps everything already received.
        if let Err(e) = write_chunk(&mut file, &chunk).await {
            tracker.fail(&e.to_string());
            return Err(e.into());
        }
        downloaded += chunk.len() as u64;

        tracker.progress(ProgressSignal {
            chunk: chunk.len() as u64,
            downloaded,
            total: total.unwrap_or(0),
        });
    }

    file.flush().await?;
    tracker.finish();
    info!("Downloaded {} bytes to {}", downloaded, path.display());

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::tests::RecordingRenderer;
    use futures::stream;

    fn media(chunks: Vec<Result<Bytes>>, total: Option<u64>) -> MediaStream {
        MediaStream {
            total,
            body: stream::iter(chunks).boxed(),
        }
    }

    #[tokio::test]
    async fn test_write_stream_reports_every_chunk() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("out.webm");
        let mut tracker = ProgressTracker::new(RecordingRenderer::default());

        let chunks = vec![
            Ok(Bytes::from_static(b"abcd")),
            Ok(Bytes::from_static(b"efgh")),
            Ok(Bytes::from_static(b"ij")),
        ];
        let written = write_stream(media(chunks, Some(10)), &path, &mut tracker).await?;

        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&path)?, b"abcdefghij");

        let recorder = tracker.renderer();
        let downloaded: Vec<u64> = recorder.updates.iter().map(|u| u.downloaded).collect();
        assert_eq!(downloaded, vec![4, 8, 10]);
        let percents: Vec<Option<u8>> = recorder.updates.iter().map(|u| u.percent).collect();
        assert_eq!(percents, vec![Some(40), Some(80), Some(100)]);
        assert_eq!(recorder.finished.as_ref().and_then(|u| u.percent), Some(100));
        Ok(())
    }

    #[tokio::test]
    async fn test_write_stream_without_length() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("out.mp4");
        let mut tracker = ProgressTracker::new(RecordingRenderer::default());

        let chunks = vec![Ok(Bytes::from_static(b"12345"))];
        write_stream(media(chunks, None), &path, &mut tracker).await?;

        let recorder = tracker.renderer();
        assert_eq!(recorder.updates[0].percent, None);
        assert_eq!(recorder.finished.as_ref().map(|u| u.total), Some(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_stream_error_keeps_partial_file() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("partial.mp4");
        let mut tracker = ProgressTracker::new(RecordingRenderer::default());

        let chunks = vec![
            Ok(Bytes::from_static(b"head")),
            Err(Error::Stream("connection reset".to_string())),
            Ok(Bytes::from_static(b"never")),
        ];
        let err = write_stream(media(chunks, Some(100)), &path, &mut tracker)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Stream(_)));
        assert_eq!(std::fs::read(&path)?, b"head");
        let recorder = tracker.renderer();
        assert!(recorder.abandoned.is_some());
        assert!(recorder.finished.is_none());
        Ok(())
    }

    #[test]
    fn test_retryable_statuses() {
        use reqwest::StatusCode;
        assert!(Downloader::should_retry(StatusCode::FORBIDDEN));
        assert!(Downloader::should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(Downloader::should_retry(StatusCode::BAD_GATEWAY));
        assert!(!Downloader::should_retry(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(backoff(1), Duration::from_secs(2));
        assert_eq!(backoff(3), Duration::from_secs(8));
        assert_eq!(backoff(100), Duration::from_secs(64));
        assert_eq!(backoff(u32::MAX), Duration::from_secs(64));
    }

    #[test]
    fn test_downloader_attempts_from_config() -> anyhow::Result<()> {
        let config = Config {
            retries: 0,
            ..Config::default()
        };
        let downloader = Downloader::new(&config)?;
        assert_eq!(downloader.max_attempts, 1);
        Ok(())
    }
}
