//! Merging of source bundles into the ordered download plan

use crate::config::{SourceConfig, SourceToggles};
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::logger::Logger;
use crate::sources::{AudioLinkAggregator, EpaperLinkAggregator};
use crate::types::{EditionKey, LinkBundle};
use indexmap::IndexMap;
use std::sync::Arc;

/// Runs the enabled source aggregators and merges their bundles
pub struct LinkAggregator {
    audio: AudioLinkAggregator,
    epaper: EpaperLinkAggregator,
    logger: Arc<dyn Logger>,
}

impl LinkAggregator {
    /// Create the aggregator and both source aggregators
    pub fn new(fetcher: Arc<Fetcher>, logger: Arc<dyn Logger>, endpoints: &SourceConfig) -> Self {
        Self {
            audio: AudioLinkAggregator::new(fetcher.clone(), logger.clone(), endpoints),
            epaper: EpaperLinkAggregator::new(fetcher, logger.clone(), endpoints),
            logger,
        }
    }

    /// Collect, merge and order every bundle of the enabled categories
    ///
    /// Audio bundles come before e-paper bundles within a merged edition.
    /// The result is sorted newest first.
    pub async fn aggregate_links(
        &self,
        toggles: SourceToggles,
        years: &[String],
    ) -> Result<Vec<LinkBundle>> {
        let mut bundles = Vec::new();

        if toggles.audio {
            bundles.extend(self.audio.aggregate_audio_links(years).await?);
        } else {
            self.logger.info("Skipping audio download");
        }

        if toggles.epaper {
            bundles.extend(self.epaper.aggregate_epaper_links(years).await?);
        } else {
            self.logger.info("Skipping epaper download");
        }

        let mut merged = merge_bundles(bundles);
        sort_newest_first(&mut merged);
        tracing::debug!(editions = merged.len(), "Aggregated links");
        Ok(merged)
    }
}

/// Group bundles by edition key, concatenating their URLs
///
/// Keys keep the position of their first occurrence and URLs keep input order.
pub fn merge_bundles(bundles: impl IntoIterator<Item = LinkBundle>) -> Vec<LinkBundle> {
    let mut merged: IndexMap<EditionKey, Vec<String>> = IndexMap::new();
    for bundle in bundles {
        let LinkBundle { year, edition, urls } = bundle;
        merged
            .entry(EditionKey { year, edition })
            .or_default()
            .extend(urls);
    }
    merged
        .into_iter()
        .map(|(key, urls)| LinkBundle::new(key.year, key.edition, urls))
        .collect()
}

/// Stable descending sort by `year + edition / 1000`
pub fn sort_newest_first(bundles: &mut [LinkBundle]) {
    bundles.sort_by(|a, b| sort_key(b).total_cmp(&sort_key(a)));
}

fn sort_key(bundle: &LinkBundle) -> f64 {
    leading_number(&bundle.year) + leading_number(&bundle.edition) / 1000.0
}

/// Numeric value of the leading digits of a token, 0 when there are none
fn leading_number(token: &str) -> f64 {
    let digits: String = token
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0.0)
}
