//! Homepage candidates on a search results page, and the filters deciding
//! whether a URL is a company's own site.

use scraper::{Html, Selector};
use std::sync::OnceLock;

use super::job_site::is_job_site_url;

/// Anchor texts that usually label an official site link.
const HOMEPAGE_LINK_HINTS: [&str; 5] = ["홈페이지", "homepage", "공식", "www", "http"];

/// Portals and social networks that are never a company homepage.
const PORTAL_DOMAINS: [&str; 7] = [
    "naver.com",
    "google.com",
    "daum.net",
    "youtube.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
];

const COMPANY_DOMAIN_SUFFIXES: [&str; 5] = [".co.kr", ".com", ".kr", ".org", ".net"];

/// Links on the results page that may point at the company's site.
///
/// Job-site URLs are kept on purpose: the caller follows them to the real
/// homepage. The same href may appear more than once.
pub fn extract_candidates(html: &Html, company: &str) -> Vec<String> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = SELECTOR.get_or_init(|| Selector::parse("a[href]").unwrap());

    let mut candidates = Vec::new();
    for element in html.select(selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let text = element.text().collect::<String>().trim().to_lowercase();

        if HOMEPAGE_LINK_HINTS.iter().any(|hint| text.contains(hint)) && is_valid_homepage(href) {
            candidates.push(href.to_string());
        }
        if is_company_website(href, company) {
            candidates.push(href.to_string());
        }
    }
    log::debug!("[SEARCH] {} homepage candidates for {}", candidates.len(), company);
    candidates
}

/// Highest scoring candidate. `.co.kr` beats `.com`, and every ASCII word of
/// the company name found in the URL adds a point. Ties go to the
/// lexicographically greatest URL.
pub fn select_best(candidates: &[String], company: &str) -> Option<String> {
    let parts = company_name_parts(company);
    candidates
        .iter()
        .map(|url| (homepage_score(url, &parts), url))
        .max()
        .map(|(_, url)| url.clone())
}

fn homepage_score(url: &str, parts: &[String]) -> u32 {
    let url = url.to_lowercase();
    let mut score = if url.contains(".co.kr") {
        3
    } else if url.contains(".com") {
        2
    } else {
        0
    };
    score += parts.iter().filter(|p| url.contains(p.as_str())).count() as u32;
    score
}

/// Absolute link that is not a portal or social network. Job sites pass.
pub fn is_valid_homepage(url: &str) -> bool {
    if !is_http(url) {
        return false;
    }
    let url = url.to_lowercase();
    !PORTAL_DOMAINS.iter().any(|d| url.contains(d))
}

/// Valid homepage whose URL contains a word (3+ letters) of the company name.
pub fn is_company_website(url: &str, company: &str) -> bool {
    if !is_valid_homepage(url) {
        return false;
    }
    let url = url.to_lowercase();
    company_name_parts(company)
        .iter()
        .filter(|p| p.len() > 2)
        .any(|p| url.contains(p.as_str()))
}

/// Strict check used on job-site pages: the company's own domain, never a
/// recruiting portal, portal, social network or blog.
pub fn is_company_homepage(url: &str) -> bool {
    if url.is_empty() || !is_http(url) {
        return false;
    }
    if is_job_site_url(url) {
        return false;
    }
    let url = url.to_lowercase();
    if PORTAL_DOMAINS.iter().any(|d| url.contains(d)) || url.contains("blog") {
        return false;
    }
    COMPANY_DOMAIN_SUFFIXES.iter().any(|d| url.contains(d))
}

/// Lowercased runs of ASCII letters in the company name ("(주)ABC Tech" →
/// `["abc", "tech"]`).
pub fn company_name_parts(company: &str) -> Vec<String> {
    company
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
