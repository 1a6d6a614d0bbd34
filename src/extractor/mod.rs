//! Heuristic extraction of company data from search and job-site pages.
//!
//! Everything here works on an already parsed `scraper::Html` and is pure;
//! fetching lives in `crate::service`.

pub mod address;
pub mod homepage;
pub mod job_site;

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// All text nodes of the document concatenated, without separators.
pub fn page_text(html: &Html) -> String {
    html.root_element().text().collect()
}

/// Absolute http(s) URLs appearing in plain text.
pub fn urls_in_text(text: &str) -> impl Iterator<Item = &str> {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    let re = URL_RE.get_or_init(|| Regex::new(r#"https?://[^\s<>"]+"#).unwrap());
    re.find_iter(text).map(|m| m.as_str())
}

/// Parse a list of static CSS selectors once.
fn parse_selectors(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                log::error!("Invalid selector {}: {:?}", s, e);
                None
            }
        })
        .collect()
}
