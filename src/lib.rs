//! # zeit-archive-dl
//!
//! Mirrors a personal ZEIT subscription archive (audio episodes and e-paper
//! issues) into a local directory tree.
//!
//! A run has two phases:
//! - **Aggregation** - walk the audio listing and the e-paper search form,
//!   producing one [`LinkBundle`] per edition, merged and sorted newest first
//! - **Download** - open every URL of an edition, derive unique filenames and
//!   write them to `<base>/<year>/<edition>/`, skipping files already present
//!
//! Re-running against the same directory is safe and only fetches what is missing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use zeit_archive_dl::{ArchiveDownloader, Config, TracingLogger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         auth_cookie: "zeit_sso_201501=...".to_string(),
//!         base_path: "/srv/zeit".into(),
//!         years: vec!["2023".to_string()],
//!         ..Default::default()
//!     };
//!
//!     let summary = ArchiveDownloader::new(config, Arc::new(TracingLogger))?
//!         .run()
//!         .await?;
//!     println!("{} new files", summary.written);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Bundle merging and ordering
pub mod aggregator;
/// Configuration types
pub mod config;
/// Writing bundles to disk
pub mod downloader;
/// Error types
pub mod error;
/// Authenticated HTTP retrieval
pub mod fetcher;
/// Injected progress logger
pub mod logger;
/// Log sink setup
pub mod logging;
/// Parsed HTML pages
pub mod page;
/// Retry logic with exponential backoff
pub mod retry;
/// Audio and e-paper source aggregators
pub mod sources;
/// Core types
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use aggregator::LinkAggregator;
pub use config::{Config, FetchConfig, RetryConfig, SourceConfig, SourceToggles};
pub use downloader::Downloader;
pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use logger::{Logger, MemoryLogger, TracingLogger};
pub use types::{DownloadSummary, EditionKey, LinkBundle};

use std::sync::Arc;

/// One complete archive run: aggregate every link, then download it
pub struct ArchiveDownloader {
    config: Config,
    logger: Arc<dyn Logger>,
    aggregator: LinkAggregator,
    downloader: Downloader,
}

impl ArchiveDownloader {
    /// Wire the fetcher, aggregators and downloader for `config`
    ///
    /// # Errors
    /// Returns a config error if the configuration is incomplete or the HTTP
    /// client cannot be built
    pub fn new(config: Config, logger: Arc<dyn Logger>) -> Result<Self> {
        config.validate()?;

        let fetcher = Arc::new(Fetcher::new(&config, logger.clone())?);
        let aggregator = LinkAggregator::new(fetcher.clone(), logger.clone(), &config.endpoints);
        let downloader = Downloader::new(fetcher, logger.clone(), config.base_path.clone());

        Ok(Self {
            config,
            logger,
            aggregator,
            downloader,
        })
    }

    /// Aggregate all enabled sources and download every bundle
    ///
    /// The first non-retryable failure aborts the run. Files written before
    /// the failure stay on disk and are skipped by the next run.
    pub async fn run(&self) -> Result<DownloadSummary> {
        let bundles = self
            .aggregator
            .aggregate_links(self.config.sources, &self.config.years)
            .await?;

        tracing::info!(
            editions = bundles.len(),
            files = bundles.iter().map(|b| b.urls.len()).sum::<usize>(),
            "Aggregation complete"
        );

        let summary = self.downloader.download(&bundles).await?;
        self.logger.info(&format!(
            "Finished: {} written, {} already present",
            summary.written, summary.skipped
        ));
        Ok(summary)
    }
}
