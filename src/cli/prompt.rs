use crate::error::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Line-oriented question/answer over any async input and a plain writer.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R, W> Prompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Prints `question` and waits for one line. `None` means the input is exhausted.
    pub async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_trimmed_lines_until_eof() -> anyhow::Result<()> {
        let mut prompt = Prompt::new(&b"  first \r\nsecond\n"[..], Vec::new());

        assert_eq!(prompt.ask("? ").await?.as_deref(), Some("first"));
        assert_eq!(prompt.ask("? ").await?.as_deref(), Some("second"));
        assert_eq!(prompt.ask("? ").await?, None);

        let (_, output) = prompt.into_parts();
        assert_eq!(String::from_utf8(output)?, "? ? ? ");
        Ok(())
    }

    #[tokio::test]
    async fn test_waits_for_slow_input() -> anyhow::Result<()> {
        let input = tokio_test::io::Builder::new()
            .read(b"partial")
            .read(b" line\n")
            .build();
        let mut prompt = Prompt::new(tokio::io::BufReader::new(input), Vec::new());

        assert_eq!(prompt.ask("> ").await?.as_deref(), Some("partial line"));
        Ok(())
    }
}
