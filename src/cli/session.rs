//! One lookup, select, download cycle at a time, either once for a URL given
//! on the command line or repeatedly from an interactive prompt.

use crate::cli::prompt::Prompt;
use crate::cli::selector;
use crate::config::Config;
use crate::core::{
    destination, listable_formats, write_stream, Catalog, ExtractorEngine, ProgressRenderer,
    ProgressTracker, StreamOpener, VideoFormat,
};
use crate::error::{Error, Result};
use crate::utils::format_duration;
use colored::Colorize;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncBufRead;
use tokio::sync::watch;
use tracing::{info, warn};

pub const URL_QUESTION: &str = "Enter video Link to download : ";
pub const NO_SUITABLE_FORMATS: &str = "No suitable formats found for this video";
const EXIT_WORDS: &[&str] = &["exit", "quit", "q"];

pub type RendererFactory = Box<dyn Fn() -> Box<dyn ProgressRenderer>>;

/// Raised flag means the user asked to stop.
pub type Interrupt = watch::Receiver<bool>;

/// Installs the process-wide Ctrl-C listener. Call once, inside the runtime.
pub fn interrupt_on_ctrl_c() -> Interrupt {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        }
    });
    rx
}

/// Resolves once the flag is raised; never if the sender is gone without raising it.
async fn interrupted(mut signal: Interrupt) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Abandons `work` with `Error::Interrupted` as soon as the flag is raised.
async fn unless_interrupted<T>(
    interrupt: Interrupt,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = interrupted(interrupt) => Err(Error::Interrupted),
        result = work => result,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Prompt for links until the user leaves.
    Interactive,
    /// Download one URL, then stop.
    Batch { url: String, itag: Option<String> },
}

pub struct Session<R, W> {
    config: Config,
    engine: ExtractorEngine,
    opener: Box<dyn StreamOpener>,
    prompt: Prompt<R, W>,
    renderers: RendererFactory,
    interrupt: Interrupt,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        config: Config,
        engine: ExtractorEngine,
        opener: Box<dyn StreamOpener>,
        prompt: Prompt<R, W>,
        renderers: RendererFactory,
    ) -> Self {
        Self {
            config,
            engine,
            opener,
            prompt,
            renderers,
            interrupt: watch::channel(false).1,
        }
    }

    /// Stops the session at whatever it is waiting on once `interrupt` is raised.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn into_prompt(self) -> Prompt<R, W> {
        self.prompt
    }

    pub async fn run(&mut self, mode: Mode) -> Result<()> {
        let result = match mode {
            Mode::Batch { url, itag } => self.cycle(&url, itag.as_deref()).await.map(|_| ()),
            Mode::Interactive => self.interactive().await,
        };
        if let Err(Error::Interrupted) = result {
            writeln!(self.prompt.output(), "\nInterrupted")?;
        }
        result
    }

    async fn interactive(&mut self) -> Result<()> {
        loop {
            let asked = self.prompt.ask(URL_QUESTION);
            let url = match unless_interrupted(self.interrupt.clone(), asked).await? {
                None => return Ok(()),
                Some(line) if line.is_empty() => continue,
                Some(line) if EXIT_WORDS.contains(&line.to_ascii_lowercase().as_str()) => {
                    return Ok(())
                }
                Some(line) => line,
            };

            match self.cycle(&url, None).await {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => self.report(&e)?,
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs one full cycle for `url` and returns where the file was written.
    pub async fn cycle(&mut self, url: &str, itag: Option<&str>) -> Result<PathBuf> {
        writeln!(self.prompt.output(), "Fetching info for video : {}", url.green())?;
        let lookup = self.engine.extract(url);
        let metadata = unless_interrupted(self.interrupt.clone(), lookup).await?;

        let out = self.prompt.output();
        writeln!(out, "\ntitle: {}", metadata.title.cyan())?;
        writeln!(
            out,
            "uploaded by: {}",
            metadata.author.as_deref().unwrap_or("unknown")
        )?;
        if let Some(secs) = metadata.duration {
            writeln!(out, "duration: {}", format_duration(Duration::from_secs(secs)))?;
        }
        writeln!(out)?;

        let catalog = self.build_catalog(&metadata.formats);
        if catalog.is_empty() {
            return Err(Error::NoSuitableFormats);
        }

        let format = match itag {
            Some(itag) => selector::select_by_id(&catalog, itag)?.clone(),
            None => {
                selector::present(self.prompt.output(), &catalog)?;
                let chosen = selector::select(&mut self.prompt, &catalog);
                unless_interrupted(self.interrupt.clone(), chosen).await?.clone()
            }
        };
        writeln!(self.prompt.output(), "{}", "\nProcessing ...\n".bright_black())?;

        let path = destination::resolve(&metadata.title, &format, &self.config).await?;
        writeln!(self.prompt.output(), "Saving to {}", path.display())?;

        self.download(&format, path).await
    }

    fn build_catalog(&self, formats: &[VideoFormat]) -> Catalog {
        let listed = listable_formats(formats, self.config.audio_filter);
        let mut catalog = Catalog::build(&listed);
        if self.config.only_audio {
            catalog = catalog.restrict_to_audio();
        }
        info!(
            "{} formats reported, {} listed, {} offered",
            formats.len(),
            listed.len(),
            catalog.len()
        );
        catalog
    }

    async fn download(&mut self, format: &VideoFormat, path: PathBuf) -> Result<PathBuf> {
        let opening = self.opener.open(format);
        let stream = unless_interrupted(self.interrupt.clone(), opening).await?;
        let mut tracker = ProgressTracker::new((self.renderers)());
        let interrupt = self.interrupt.clone();

        let outcome = tokio::select! {
            biased;
            _ = interrupted(interrupt) => None,
            result = write_stream(stream, &path, &mut tracker) => Some(result),
        };

        match outcome {
            Some(Ok(bytes)) => {
                info!("Saved {} bytes as itag {}", bytes, format.itag);
                writeln!(self.prompt.output(), "Saved {}", path.display())?;
                Ok(path)
            }
            Some(Err(e)) => {
                warn!("Download of itag {} failed: {}", format.itag, e);
                if partial_exists(&path).await {
                    writeln!(
                        self.prompt.output(),
                        "Partial download kept at {}",
                        path.display()
                    )?;
                }
                Err(e)
            }
            None => {
                tracker.fail("interrupted");
                warn!("Download of itag {} interrupted", format.itag);
                if partial_exists(&path).await {
                    writeln!(
                        self.prompt.output(),
                        "\nPartial download kept at {}",
                        path.display()
                    )?;
                }
                Err(Error::Interrupted)
            }
        }
    }

    fn report(&mut self, error: &Error) -> Result<()> {
        let out = self.prompt.output();
        match error {
            Error::NoSuitableFormats => writeln!(out, "{}", NO_SUITABLE_FORMATS.yellow())?,
            other => writeln!(out, "{} {}", "Error:".red(), other)?,
        }
        writeln!(out)?;
        Ok(())
    }
}

async fn partial_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
