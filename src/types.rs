//! Core types shared by the aggregators and the downloader

use std::fmt;
use std::path::PathBuf;

pub use crate::config::SourceToggles;

/// Identity of one published issue or episode set
///
/// Both tokens are kept exactly as the site shows them and compared as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditionKey {
    /// Year token (e.g. "2023")
    pub year: String,
    /// Edition token (e.g. "05")
    pub edition: String,
}

impl EditionKey {
    /// Create a key from its two tokens
    pub fn new(year: impl Into<String>, edition: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            edition: edition.into(),
        }
    }
}

impl fmt::Display for EditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.edition)
    }
}

/// The downloadable resources belonging to one edition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBundle {
    /// Year token
    pub year: String,
    /// Edition token
    pub edition: String,
    /// Resource URLs in discovery order
    pub urls: Vec<String>,
}

impl LinkBundle {
    /// Create a bundle
    pub fn new(year: impl Into<String>, edition: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            year: year.into(),
            edition: edition.into(),
            urls,
        }
    }

    /// The edition this bundle belongs to
    pub fn key(&self) -> EditionKey {
        EditionKey::new(self.year.clone(), self.edition.clone())
    }
}

/// Year and edition tokens spanning the e-paper search space
///
/// Both lists are deduplicated and keep the order of the archive's select controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpaperRanges {
    /// Year tokens
    pub years: Vec<String>,
    /// Edition tokens
    pub editions: Vec<String>,
}

impl EpaperRanges {
    /// Every (year, edition) pair, year-major
    pub fn cross_product(&self) -> Vec<EditionKey> {
        self.years
            .iter()
            .flat_map(|year| {
                self.editions
                    .iter()
                    .map(move |edition| EditionKey::new(year.clone(), edition.clone()))
            })
            .collect()
    }
}

/// One file to write: an open response, its resolved name and target directory
#[derive(Debug)]
pub struct DownloadJob {
    /// The response whose body becomes the file
    pub response: reqwest::Response,
    /// File name, unique within the edition
    pub filename: String,
    /// `<base>/<year>/<edition>`
    pub directory: PathBuf,
}

impl DownloadJob {
    /// Full target path
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Running position within one download run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based index of the next file
    pub current: usize,
    /// Number of files in the run
    pub total: usize,
}

impl Progress {
    /// Start a run over `total` files
    pub fn new(total: usize) -> Self {
        Self { current: 1, total }
    }

    /// `(index/total)` with the index zero-padded to the width of the total
    pub fn counter(&self) -> String {
        format_counter(self.current, self.total)
    }

    /// Move on to the next file
    pub fn advance(&mut self) {
        self.current += 1;
    }
}

/// `(index/total)` with the index zero-padded to the width of the total
pub(crate) fn format_counter(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("({:0width$}/{})", index, total, width = width)
}

/// Outcome of a completed download run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Files newly written
    pub written: usize,
    /// Files skipped because they already existed
    pub skipped: usize,
}

impl DownloadSummary {
    /// Files handled in total
    pub fn total(&self) -> usize {
        self.written + self.skipped
    }
}
