//! Source aggregators for the two archive categories.
//!
//! - [`audio`] - paginated audio listing, one asset link per listing entry
//! - [`epaper`] - year × edition search form, then one detail page per issue
//!
//! Both produce [`LinkBundle`](crate::types::LinkBundle)s that the
//! [`LinkAggregator`](crate::aggregator::LinkAggregator) merges.

pub mod audio;
pub mod epaper;

pub use audio::AudioLinkAggregator;
pub use epaper::EpaperLinkAggregator;

/// Whether `year` passes the caller's filter (an empty filter passes everything)
pub(crate) fn year_selected(years: &[String], year: &str) -> bool {
    years.is_empty() || years.iter().any(|y| y == year)
}

/// CSS selector for links pointing at the audio asset host
pub(crate) fn asset_link_selector(asset_host_prefix: &str) -> String {
    format!(r#"[href^="{}"]"#, asset_host_prefix)
}
