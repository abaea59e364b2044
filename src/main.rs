use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use zeit_archive_dl::{ArchiveDownloader, Config, TracingLogger, logging};

/// Mirror a ZEIT subscription archive (audio and e-paper) to a local directory.
#[derive(Debug, Parser)]
#[command(name = "zeit-archive-downloader", version)]
#[command(about = "Download the ZEIT audio and e-paper archive", long_about = None)]
struct Cli {
    /// Cookie header of a logged-in session.
    #[arg(short = 'a', long)]
    auth_cookie: Option<String>,

    /// Directory for downloaded files and the log file.
    #[arg(short = 'b', long)]
    base_path: Option<PathBuf>,

    /// Only download these years.
    #[arg(short = 'y', long, num_args = 1..)]
    years: Vec<String>,

    /// Skip the audio archive.
    #[arg(long)]
    no_audio: bool,

    /// Skip the e-paper archive.
    #[arg(long)]
    no_epaper: bool,

    /// TOML file with further settings; flags take precedence.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };

        if let Some(cookie) = self.auth_cookie {
            config.auth_cookie = cookie;
        }
        if let Some(base_path) = self.base_path {
            config.base_path = base_path;
        }
        if !self.years.is_empty() {
            config.years = self.years;
        }
        if self.no_audio {
            config.sources.audio = false;
        }
        if self.no_epaper {
            config.sources.epaper = false;
        }

        config
            .validate()
            .context("invalid settings (are --auth-cookie and --base-path set?)")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("zeit-archive-downloader: {:#}", err);
            std::process::exit(2);
        }
    };

    if let Err(err) = logging::init_logging(&config) {
        eprintln!("zeit-archive-downloader: {:#}", err);
        std::process::exit(1);
    }

    if let Err(err) = run(config).await {
        tracing::error!("Run aborted: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    let downloader = ArchiveDownloader::new(config, Arc::new(TracingLogger))?;
    downloader.run().await?;
    Ok(())
}
