pub mod prompt;
pub mod render;
pub mod selector;
pub mod session;

use crate::config::Config;
use crate::core::{Downloader, ExtractorEngine, ProgressRenderer};
use crate::extractors::YouTubeExtractor;
use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, Level};

pub use prompt::Prompt;
pub use render::TerminalRenderer;
pub use session::{interrupt_on_ctrl_c, Interrupt, Mode, Session};

#[derive(Parser, Debug)]
#[command(name = "tubegrab")]
#[command(about = "Pick an encoding of a video and download it with live progress")]
#[command(version)]
pub struct Cli {
    /// Video URL to download once; omit it to be asked for links interactively
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Itag to download without being asked (batch mode only)
    #[arg(short, long, requires = "url")]
    pub itag: Option<String>,

    /// TOML config file, applied before environment variables
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the resolved configuration and log debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Clear the terminal before starting
    #[arg(short, long)]
    pub clear: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.verbose {
            Level::INFO
        } else {
            Level::WARN
        }
    }

    pub fn mode(&self) -> Mode {
        match &self.url {
            Some(url) => Mode::Batch {
                url: url.clone(),
                itag: self.itag.clone(),
            },
            None => Mode::Interactive,
        }
    }

    pub async fn run(&self) -> Result<()> {
        if self.url.as_deref() == Some("help") {
            Cli::command().print_help()?;
            return Ok(());
        }

        if self.clear {
            print!("\x1B[2J\x1B[1;1H");
        }
        println!(
            "{} {}\n",
            "tubegrab".bold(),
            format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
        );

        let config = Config::load(self.config.as_deref())?;
        if self.debug {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        debug!("Resolved config: {:?}", config);

        let mut engine = ExtractorEngine::new();
        engine.register_extractor(Box::new(YouTubeExtractor::new(config.ytdlp_path.clone())));
        let downloader = Downloader::new(&config)?;

        let prompt = Prompt::new(
            tokio::io::BufReader::new(tokio::io::stdin()),
            std::io::stdout(),
        );
        let mut session = Session::new(
            config,
            engine,
            Box::new(downloader),
            prompt,
            Box::new(|| Box::new(TerminalRenderer::new()) as Box<dyn ProgressRenderer>),
        )
        .with_interrupt(interrupt_on_ctrl_c());

        session.run(self.mode()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mode_from_arguments() {
        let cli = Cli::parse_from(["tubegrab"]);
        assert_eq!(cli.mode(), Mode::Interactive);
        assert_eq!(cli.log_level(), Level::WARN);

        let cli = Cli::parse_from(["tubegrab", "-i", "140", "--debug", "https://youtu.be/dQw4w9WgXcQ"]);
        assert_eq!(
            cli.mode(),
            Mode::Batch {
                url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                itag: Some("140".to_string()),
            }
        );
        assert_eq!(cli.log_level(), Level::DEBUG);
    }

    #[test]
    fn test_itag_requires_url() {
        assert!(Cli::try_parse_from(["tubegrab", "--itag", "18"]).is_err());
    }
}
