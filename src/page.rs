//! Parsed HTML pages and the queries the aggregators run against them
//!
//! This is the only module that knows about the HTML parser. Aggregators ask
//! for attribute values, text, and "label: value" rows by CSS selector and
//! never walk the tree themselves.

use crate::error::{Error, Result};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;

/// Label to value mapping recovered from the rows around a link
pub type LabeledRows = HashMap<String, String>;

/// A link together with the labeled rows of the block it sits in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledLink {
    /// The link target as written in the page
    pub href: String,
    /// Rows of the enclosing block whose first child is a `<strong>` label
    pub rows: LabeledRows,
}

/// A fetched and parsed HTML document
///
/// The underlying tree is not `Send`; pages are consumed on the task that
/// fetched them.
pub struct HtmlPage {
    url: String,
    document: Html,
}

impl std::fmt::Debug for HtmlPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlPage").field("url", &self.url).finish()
    }
}

impl HtmlPage {
    /// Parse a response body
    ///
    /// The parser recovers from malformed markup; only a body without any
    /// content is rejected.
    pub fn parse(url: impl Into<String>, body: &str) -> Result<Self> {
        let url = url.into();
        if body.trim().is_empty() {
            return Err(Error::Parse {
                url,
                reason: "empty document".to_string(),
            });
        }
        Ok(Self {
            document: Html::parse_document(body),
            url,
        })
    }

    /// URL the page was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    fn selector(&self, css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Parse {
            url: self.url.clone(),
            reason: format!("invalid selector {:?}: {}", css, e),
        })
    }

    /// Values of `attr` on every element matching `css`, in document order
    ///
    /// Elements without the attribute are skipped.
    pub fn attr_values(&self, css: &str, attr: &str) -> Result<Vec<String>> {
        let selector = self.selector(css)?;
        Ok(self
            .document
            .select(&selector)
            .filter_map(|element| element.value().attr(attr))
            .map(str::to_string)
            .collect())
    }

    /// Value of `attr` on the first element matching `css`
    pub fn first_attr(&self, css: &str, attr: &str) -> Result<Option<String>> {
        let selector = self.selector(css)?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr(attr))
            .map(str::to_string))
    }

    /// Trimmed text content of the first element matching `css`
    pub fn first_text(&self, css: &str) -> Result<Option<String>> {
        let selector = self.selector(css)?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .map(element_text))
    }

    /// Links matching `css` with the labeled rows of their enclosing block
    ///
    /// The block is the link's grandparent. Each element child of the block
    /// whose first element child is `<strong>` is a row: the strong text (first
    /// `:` removed) is the label, the text of the row's last child node is the
    /// value. A repeated label keeps the last value.
    pub fn labeled_links(&self, css: &str, attr: &str) -> Result<Vec<LabeledLink>> {
        let selector = self.selector(css)?;
        Ok(self
            .document
            .select(&selector)
            .filter_map(|link| {
                let href = link.value().attr(attr)?.to_string();
                let block = link
                    .parent()
                    .and_then(|parent| parent.parent())
                    .and_then(ElementRef::wrap);
                let rows = block.map(extract_labeled_rows).unwrap_or_default();
                Some(LabeledLink { href, rows })
            })
            .collect())
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn extract_labeled_rows(block: ElementRef<'_>) -> LabeledRows {
    let mut rows = LabeledRows::new();
    for row in block.children().filter_map(ElementRef::wrap) {
        let Some(label) = row.children().find_map(ElementRef::wrap) else {
            continue;
        };
        if label.value().name() != "strong" {
            continue;
        }
        let key = element_text(label).replacen(':', "", 1);
        let value = match row.last_child() {
            Some(node) => match node.value() {
                Node::Text(text) => text.trim().to_string(),
                Node::Element(_) => ElementRef::wrap(node).map(element_text).unwrap_or_default(),
                _ => String::new(),
            },
            None => String::new(),
        };
        rows.insert(key, value);
    }
    rows
}
