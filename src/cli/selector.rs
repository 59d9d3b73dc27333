use crate::cli::prompt::Prompt;
use crate::core::{Catalog, VideoFormat};
use crate::error::{Error, Result};
use crate::utils::format_bytes;
use colored::Colorize;
use std::io::Write;
use tokio::io::AsyncBufRead;

pub const SELECT_QUESTION: &str = "\nEnter Itag for Quality : ";
pub const INVALID_SELECTION: &str = "Please enter a valid itag for Quality";

/// Prints the catalog as two tables, audio-only first.
pub fn present<W: Write>(out: &mut W, catalog: &Catalog) -> std::io::Result<()> {
    writeln!(out, "Itag\tType\tFormat\tQuality\tAudio\tVideo\tSize")?;

    writeln!(out, "{}", "-- audio only --".bold())?;
    for format in catalog.audio_only() {
        write_row(out, format)?;
    }

    writeln!(out, "{}", "-- video with audio --".bold())?;
    for format in catalog.video_with_audio() {
        write_row(out, format)?;
    }

    Ok(())
}

fn write_row<W: Write>(out: &mut W, format: &VideoFormat) -> std::io::Result<()> {
    let quality = format.quality_label.as_deref().unwrap_or("-");
    let size = format.filesize.map(format_bytes).unwrap_or_else(|| "?".to_string());
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        format.itag,
        format.media_kind(),
        format.container,
        quality.green(),
        format.has_audio.to_string().bright_black(),
        format.has_video.to_string().bright_black(),
        size
    )
}

/// Asks until the answer names an itag in `catalog`. End of input is an error.
pub async fn select<'c, R, W>(
    prompt: &mut Prompt<R, W>,
    catalog: &'c Catalog,
) -> Result<&'c VideoFormat>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let answer = prompt.ask(SELECT_QUESTION).await?.ok_or(Error::InputClosed)?;

        if let Some(format) = catalog.find(&answer) {
            return Ok(format);
        }
        writeln!(prompt.output(), "\n{}", INVALID_SELECTION.red())?;
    }
}

pub fn select_by_id<'c>(catalog: &'c Catalog, itag: &str) -> Result<&'c VideoFormat> {
    catalog
        .find(itag.trim())
        .ok_or_else(|| Error::InvalidSelection(itag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn format(itag: &str, has_audio: bool, has_video: bool) -> VideoFormat {
        VideoFormat {
            itag: itag.to_string(),
            url: format!("https://example.com/{}", itag),
            container: "mp4".to_string(),
            quality_label: has_video.then(|| "720p".to_string()),
            has_audio,
            has_video,
            filesize: Some(2048),
            http_headers: HashMap::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::build(&[format("1", true, false), format("2", true, true)])
    }

    #[tokio::test]
    async fn test_reprompts_until_valid() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut prompt = Prompt::new(&b"99\n2\n"[..], Vec::new());

        let chosen = select(&mut prompt, &catalog).await?;

        assert_eq!(chosen.itag, "2");
        let (_, output) = prompt.into_parts();
        let output = String::from_utf8(output)?;
        assert_eq!(output.matches("Enter Itag for Quality").count(), 2);
        assert_eq!(output.matches(INVALID_SELECTION).count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_many_bad_answers_do_not_give_up() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut input = "nope\n".repeat(500);
        input.push_str("1\n");
        let mut prompt = Prompt::new(input.as_bytes(), Vec::new());

        let chosen = select(&mut prompt, &catalog).await?;

        assert_eq!(chosen.itag, "1");
        Ok(())
    }

    #[tokio::test]
    async fn test_end_of_input_is_fatal() {
        let catalog = catalog();
        let mut prompt = Prompt::new(&b"99\n"[..], Vec::new());

        let err = select(&mut prompt, &catalog).await.unwrap_err();

        assert!(matches!(err, Error::InputClosed));
    }

    #[test]
    fn test_present_lists_audio_bucket_first() -> anyhow::Result<()> {
        let catalog = Catalog::build(&[format("22", true, true), format("140", true, false)]);
        let mut out = Vec::new();

        present(&mut out, &catalog)?;

        let text = String::from_utf8(out)?;
        let audio_row = text.find("140\taudio").unwrap();
        let video_row = text.find("22\tvideo").unwrap();
        assert!(audio_row < video_row);
        assert!(text.starts_with("Itag\tType\tFormat\tQuality"));
        Ok(())
    }

    #[test]
    fn test_select_by_id() {
        let catalog = catalog();
        assert_eq!(select_by_id(&catalog, "1").map(|f| f.itag.as_str()).ok(), Some("1"));
        assert!(matches!(
            select_by_id(&catalog, "3"),
            Err(Error::InvalidSelection(_))
        ));
    }
}
