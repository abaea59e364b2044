//! E-paper archive aggregation
//!
//! The e-paper archive has no flat listing, only a search form over year and
//! edition. Discovery runs in two phases: every year × edition search page is
//! fetched to find the issue's detail page, then every detail page is fetched
//! for its download buttons and audio link. The detail page's teaser is the
//! authoritative source for the edition key.

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::logger::Logger;
use crate::page::HtmlPage;
use crate::sources::{asset_link_selector, year_selected};
use crate::types::{EditionKey, EpaperRanges, LinkBundle};
use std::sync::Arc;
use url::Url;

const ARCHIVE_PATH: &str = "/abo/diezeit";
const TITLE: &str = "diezeit";
const YEAR_OPTIONS: &str = "select#year > option";
const EDITION_OPTIONS: &str = "select#issue > option";
const COVER_LINK: &str = r#".archives-filter-results .epaper-cover a[href^="/abo/diezeit"]"#;
const TEASER: &str = ".article-teaser-issue";
const DOWNLOAD_BUTTONS: &str = r#"a.epaper-info-filesize[href^="/download"]"#;

/// Character range of the `<edition>/<year>` token inside the trimmed teaser
const TEASER_KEY_START: usize = 9;
const TEASER_KEY_END: usize = 16;

/// Collects e-paper issue links through the archive's search form
pub struct EpaperLinkAggregator {
    fetcher: Arc<Fetcher>,
    logger: Arc<dyn Logger>,
    base_url: String,
    asset_host_prefix: String,
}

impl EpaperLinkAggregator {
    /// Create an aggregator for the configured e-paper endpoint
    pub fn new(fetcher: Arc<Fetcher>, logger: Arc<dyn Logger>, endpoints: &SourceConfig) -> Self {
        Self {
            fetcher,
            logger,
            base_url: endpoints.epaper_base_url.trim_end_matches('/').to_string(),
            asset_host_prefix: endpoints.asset_host_prefix.clone(),
        }
    }

    fn archive_url(&self) -> String {
        format!("{}{}", self.base_url, ARCHIVE_PATH)
    }

    fn absolute(&self, href: &str) -> String {
        format!("{}{}", self.base_url, href)
    }

    /// Discover every e-paper bundle, restricted to `years` when non-empty
    pub async fn aggregate_epaper_links(&self, years: &[String]) -> Result<Vec<LinkBundle>> {
        let ranges = self.identify_ranges(years).await?;
        let mut bundles = self.collect_epaper_links(&ranges).await?;
        // The teaser may name a different year than the search did
        bundles.retain(|bundle| year_selected(years, &bundle.year));
        Ok(bundles)
    }

    /// Read the search form's year and edition options
    pub async fn identify_ranges(&self, years: &[String]) -> Result<EpaperRanges> {
        let page = self.fetcher.fetch_html(&self.archive_url()).await?;
        Ok(EpaperRanges {
            years: option_values(&page, YEAR_OPTIONS)?
                .into_iter()
                .filter(|year| year_selected(years, year))
                .collect(),
            editions: option_values(&page, EDITION_OPTIONS)?,
        })
    }

    /// Search every year × edition pair and read the detail pages found
    pub async fn collect_epaper_links(&self, ranges: &EpaperRanges) -> Result<Vec<LinkBundle>> {
        let search_keys = ranges.cross_product();
        let search_urls = search_keys
            .iter()
            .map(|key| self.search_url(key))
            .collect::<Result<Vec<_>>>()?;

        let search_pages = self
            .fetcher
            .fetch_html_chunked(&search_urls, "Searching epaper information")
            .await?;

        let mut found_keys = Vec::new();
        let mut detail_urls = Vec::new();
        for (key, page) in search_keys.into_iter().zip(&search_pages) {
            if let Some(href) = page.first_attr(COVER_LINK, "href")? {
                detail_urls.push(self.absolute(&href));
                found_keys.push(key);
            }
        }
        drop(search_pages);

        let detail_pages = self
            .fetcher
            .fetch_html_chunked(&detail_urls, "Fetching epaper information")
            .await?;

        let mut bundles = Vec::with_capacity(detail_pages.len());
        for (page, search_key) in detail_pages.iter().zip(&found_keys) {
            let bundle = self.detail_bundle(page, search_key)?;
            if bundle.urls.is_empty() {
                tracing::debug!(edition = %bundle.key(), url = page.url(), "No downloads on detail page");
                continue;
            }
            bundles.push(bundle);
        }
        Ok(bundles)
    }

    fn search_url(&self, key: &EditionKey) -> Result<String> {
        let mut url = Url::parse(&self.archive_url()).map_err(|e| Error::Config {
            message: format!("invalid e-paper base URL {:?}: {}", self.base_url, e),
            key: Some("endpoints.epaper_base_url".to_string()),
        })?;
        url.query_pairs_mut()
            .append_pair("title", TITLE)
            .append_pair("issue", &key.edition)
            .append_pair("year", &key.year);
        Ok(url.into())
    }

    fn detail_bundle(&self, page: &HtmlPage, search_key: &EditionKey) -> Result<LinkBundle> {
        let teaser = page.first_text(TEASER)?;
        let key = teaser.as_deref().and_then(parse_teaser).ok_or_else(|| {
            self.logger.error(&format!(
                "Could not identify year and edition on {}",
                page.url()
            ));
            Error::TeaserParse {
                url: page.url().to_string(),
                teaser: teaser.clone(),
            }
        })?;

        if key != *search_key {
            tracing::debug!(
                searched = %search_key,
                teaser = %key,
                url = page.url(),
                "Teaser edition differs from search"
            );
        }

        let mut urls: Vec<String> = page
            .attr_values(DOWNLOAD_BUTTONS, "href")?
            .iter()
            .map(|href| self.absolute(href))
            .collect();
        if let Some(audio) = page.first_attr(&asset_link_selector(&self.asset_host_prefix), "href")? {
            urls.push(audio);
        }

        Ok(LinkBundle::new(key.year, key.edition, urls))
    }
}

/// Non-empty option values of a select control, deduplicated in order
fn option_values(page: &HtmlPage, selector: &str) -> Result<Vec<String>> {
    let mut values: Vec<String> = Vec::new();
    for value in page.attr_values(selector, "value")? {
        if !value.is_empty() && !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(values)
}

/// Read `<edition>/<year>` from characters 9..16 of a teaser like
/// `DIE ZEIT 05/2023 vom 26.01.2023`
pub(crate) fn parse_teaser(teaser: &str) -> Option<EditionKey> {
    let token: String = teaser
        .trim()
        .chars()
        .skip(TEASER_KEY_START)
        .take(TEASER_KEY_END - TEASER_KEY_START)
        .collect();
    if token.chars().count() != TEASER_KEY_END - TEASER_KEY_START {
        return None;
    }
    let (edition, year) = token.split_once('/')?;
    let well_formed = |part: &str| {
        !part.is_empty() && !part.contains('/') && !part.chars().any(char::is_whitespace)
    };
    if !well_formed(edition) || !well_formed(year) {
        return None;
    }
    Some(EditionKey::new(year, edition))
}
