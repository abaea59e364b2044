//! Error types for zeit-archive-dl
//!
//! Every failure in the aggregation and download pipeline is fatal to the run.
//! The only local recoveries are the fetcher's transient-status retry and the
//! downloader's skip of files that already exist, neither of which surfaces as
//! an error. Variants carry the URL or path that failed so the top level can
//! report it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for zeit-archive-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for zeit-archive-dl
#[derive(Debug, Error)]
pub enum Error {
    /// The final response for a URL had a non-success status
    #[error("could not fetch url {url}: HTTP {status}")]
    Fetch {
        /// The URL that was requested
        url: String,
        /// The last status code received
        status: u16,
    },

    /// Transport-level failure (connect, timeout, body read)
    #[error("network error for {url}: {source}")]
    Network {
        /// The URL that was requested
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// No response headers arrived within the configured response timeout
    #[error("no response from {url} within {}s", after.as_secs_f64())]
    Timeout {
        /// The URL that was requested
        url: String,
        /// The timeout that elapsed
        after: std::time::Duration,
    },

    /// Page structure did not match what the scraper expects
    #[error("could not parse page {url}: {reason}")]
    Parse {
        /// The page URL
        url: String,
        /// What was wrong with the page
        reason: String,
    },

    /// The e-paper teaser is missing or does not follow the fixed-width layout
    #[error("could not identify year and edition on {url} (teaser: {teaser:?})")]
    TeaserParse {
        /// The detail page URL
        url: String,
        /// The teaser text as found, if any
        teaser: Option<String>,
    },

    /// A listing entry lacks a required attribute row
    #[error("listing entry on {url} has no {key:?} attribute")]
    Metadata {
        /// The listing page URL
        url: String,
        /// The missing attribute label
        key: String,
    },

    /// No filename could be derived for a downloaded resource
    #[error("could not identify filename for {url}")]
    Filename {
        /// The resource URL
        url: String,
    },

    /// Filesystem failure
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path being created or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "auth_cookie")
        key: Option<String>,
    },
}

impl Error {
    /// Shorthand for an I/O error bound to a path
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// The URL this error refers to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Fetch { url, .. }
            | Error::Network { url, .. }
            | Error::Timeout { url, .. }
            | Error::Parse { url, .. }
            | Error::TeaserParse { url, .. }
            | Error::Metadata { url, .. }
            | Error::Filename { url } => Some(url),
            Error::Io { .. } | Error::Config { .. } => None,
        }
    }
}
