//! Writing aggregated bundles to disk
//!
//! Bundles are processed one edition at a time in the order given. For each
//! edition all responses are opened first so filenames can be derived and
//! deduplicated, then files are written one after another into
//! `<base>/<year>/<edition>/`. Files that already exist are left untouched,
//! which makes a re-run after an abort pick up where the last one stopped.
//!
//! - [`filename`] - Content-Disposition parsing, URL fallback, name unification

pub mod filename;


pub use filename::{parse_content_disposition_filename, unify_filenames};

use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::logger::Logger;
use crate::types::{DownloadJob, DownloadSummary, LinkBundle, Progress};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Label logged for each batch of opened download responses
const OPEN_LABEL: &str = "Opening downloads";

/// Result of handling a single job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Written,
    AlreadyPresent,
}

/// Streams bundle resources into the output directory
pub struct Downloader {
    fetcher: Arc<Fetcher>,
    logger: Arc<dyn Logger>,
    base_path: PathBuf,
}

impl Downloader {
    /// Create a downloader writing below `base_path`
    pub fn new(fetcher: Arc<Fetcher>, logger: Arc<dyn Logger>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            logger,
            base_path: base_path.into(),
        }
    }

    /// Download every bundle in order
    ///
    /// The progress counter spans the whole run and advances once per URL,
    /// whether or not a file was written. The first error aborts the run.
    pub async fn download(&self, bundles: &[LinkBundle]) -> Result<DownloadSummary> {
        let total = bundles.iter().map(|bundle| bundle.urls.len()).sum();
        let mut progress = Progress::new(total);
        let mut summary = DownloadSummary::default();

        for bundle in bundles {
            progress = self.download_edition(bundle, progress, &mut summary).await?;
        }

        Ok(summary)
    }

    /// Download one edition, returning the advanced progress
    pub async fn download_edition(
        &self,
        bundle: &LinkBundle,
        mut progress: Progress,
        summary: &mut DownloadSummary,
    ) -> Result<Progress> {
        let jobs = self.collect_download_jobs(bundle).await?;
        for job in jobs {
            match self.download_file(job, &progress).await? {
                FileOutcome::Written => summary.written += 1,
                FileOutcome::AlreadyPresent => summary.skipped += 1,
            }
            progress.advance();
        }
        Ok(progress)
    }

    /// Open every URL of the bundle and assign each a unique filename
    pub async fn collect_download_jobs(&self, bundle: &LinkBundle) -> Result<Vec<DownloadJob>> {
        self.logger.info(&format!(
            "Collecting filenames for edition {}",
            bundle.key()
        ));

        let responses = self
            .fetcher
            .fetch_responses_chunked(&bundle.urls, OPEN_LABEL)
            .await?;

        let mut filenames = responses
            .iter()
            .map(|response| {
                filename::identify_filename(response).ok_or_else(|| {
                    self.logger.error(&format!(
                        "Could not identify filename for {}",
                        response.url()
                    ));
                    Error::Filename {
                        url: response.url().to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        unify_filenames(&mut filenames);

        let directory = self.edition_directory(bundle);
        Ok(responses
            .into_iter()
            .zip(filenames)
            .map(|(response, filename)| DownloadJob {
                response,
                filename,
                directory: directory.clone(),
            })
            .collect())
    }

    fn edition_directory(&self, bundle: &LinkBundle) -> PathBuf {
        self.base_path.join(&bundle.year).join(&bundle.edition)
    }

    async fn download_file(&self, job: DownloadJob, progress: &Progress) -> Result<FileOutcome> {
        tokio::fs::create_dir_all(&job.directory)
            .await
            .map_err(|e| Error::io(&job.directory, e))?;

        let path = job.path();
        let counter = progress.counter();

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Error::io(&path, e))?;
        if exists {
            self.logger.info(&format!(
                "{} File already found: {}",
                counter,
                path.display()
            ));
            return Ok(FileOutcome::AlreadyPresent);
        }

        self.logger.info(&format!(
            "{} Downloading file: {}",
            counter,
            path.display()
        ));

        self.write_new_file(job.response, &path).await?;
        Ok(FileOutcome::Written)
    }

    /// Create `path` exclusively and stream the body into it
    ///
    /// An existing file is never overwritten. If the body cannot be written in
    /// full, the partial file is removed before the error is returned.
    async fn write_new_file(&self, response: reqwest::Response, path: &Path) -> Result<()> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| Error::io(path, e))?;

        if let Err(e) = write_body(response, file, path).await {
            self.logger.error(&format!(
                "Could not write file {}: {}",
                path.display(),
                e
            ));
            if let Err(cleanup) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %cleanup, "Failed to remove partial file");
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Stream a response body into an open file
async fn write_body(response: reqwest::Response, mut file: tokio::fs::File, path: &Path) -> Result<()> {
    let url = response.url().to_string();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| Error::Network {
            url: url.clone(),
            source,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(path, e))?;
    }

    file.flush().await.map_err(|e| Error::io(path, e))?;
    Ok(())
}
