//! Audio archive aggregation
//!
//! The audio archive is a paginated listing. Every entry carries a link to the
//! asset host and a block of `<strong>Label:</strong> value` rows from which
//! the year ("Jahr") and edition ("Ausgabe") are read. An edition may have
//! several tracks, so entries are grouped by edition.

use crate::aggregator::merge_bundles;
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::logger::Logger;
use crate::page::{HtmlPage, LabeledLink};
use crate::sources::{asset_link_selector, year_selected};
use crate::types::LinkBundle;
use std::sync::Arc;
use url::Url;

const LISTING_PATH: &str = "/abo/zeit-audio";
const PAGER_LINK_SELECTOR: &str = ".pager__page > :first-child";
const YEAR_LABEL: &str = "Jahr";
const EDITION_LABEL: &str = "Ausgabe";
const DOWNLOAD_LABEL: &str = "MP3 Download";

/// Collects audio episode links from the paginated archive listing
pub struct AudioLinkAggregator {
    fetcher: Arc<Fetcher>,
    logger: Arc<dyn Logger>,
    base_url: String,
    asset_host_prefix: String,
}

impl AudioLinkAggregator {
    /// Create an aggregator for the configured audio endpoint
    pub fn new(fetcher: Arc<Fetcher>, logger: Arc<dyn Logger>, endpoints: &SourceConfig) -> Self {
        Self {
            fetcher,
            logger,
            base_url: endpoints.audio_base_url.trim_end_matches('/').to_string(),
            asset_host_prefix: endpoints.asset_host_prefix.clone(),
        }
    }

    fn listing_url(&self) -> String {
        format!("{}{}", self.base_url, LISTING_PATH)
    }

    /// Discover every audio bundle, restricted to `years` when non-empty
    pub async fn aggregate_audio_links(&self, years: &[String]) -> Result<Vec<LinkBundle>> {
        let max_page = self.identify_max_page().await?;
        self.collect_audio_links(max_page, years).await
    }

    /// Highest `page` index reachable from the listing's pager (0 without a pager)
    pub async fn identify_max_page(&self) -> Result<u32> {
        let page = self.fetcher.fetch_html(&self.listing_url()).await?;
        self.max_page(&page)
    }

    fn max_page(&self, page: &HtmlPage) -> Result<u32> {
        let hrefs = page.attr_values(PAGER_LINK_SELECTOR, "href")?;
        let Some(last) = hrefs.last() else {
            return Ok(0);
        };

        let resolved = Url::parse(page.url())
            .and_then(|base| base.join(last))
            .map_err(|e| Error::Parse {
                url: page.url().to_string(),
                reason: format!("pager link {:?} is not a valid URL: {}", last, e),
            })?;

        Ok(resolved
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| leading_integer(&value))
            .unwrap_or(0))
    }

    /// Fetch the listing pages `0..=max_page` and group their entries by edition
    pub async fn collect_audio_links(
        &self,
        max_page: u32,
        years: &[String],
    ) -> Result<Vec<LinkBundle>> {
        let root = self.listing_url();
        let urls: Vec<String> = std::iter::once(root.clone())
            .chain((1..=max_page).map(|page| format!("{}?page={}", root, page)))
            .collect();

        let pages = self
            .fetcher
            .fetch_html_chunked(&urls, "Fetching audio information")
            .await?;

        let selector = asset_link_selector(&self.asset_host_prefix);
        let mut entries = Vec::new();
        for page in &pages {
            for link in page.labeled_links(&selector, "href")? {
                let entry = self.entry_bundle(page.url(), link)?;
                if year_selected(years, &entry.year) {
                    entries.push(entry);
                }
            }
        }

        Ok(merge_bundles(entries))
    }

    fn entry_bundle(&self, page_url: &str, link: LabeledLink) -> Result<LinkBundle> {
        let LabeledLink { href, mut rows } = link;
        rows.remove(DOWNLOAD_LABEL);

        let mut required = |key: &str| {
            rows.remove(key).ok_or_else(|| {
                self.logger.error(&format!(
                    "Listing entry {} on {} has no {} attribute",
                    href, page_url, key
                ));
                Error::Metadata {
                    url: page_url.to_string(),
                    key: key.to_string(),
                }
            })
        };
        let year = required(YEAR_LABEL)?;
        let edition = required(EDITION_LABEL)?;

        Ok(LinkBundle::new(
            year,
            format!("{:0>2}", edition),
            vec![href],
        ))
    }
}

/// Integer formed by the leading ASCII digits of `value`
fn leading_integer(value: &str) -> Option<u32> {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
