//! Company homepage links on recruiting portals.
//!
//! Search results often point at a job-site company page instead of the
//! company itself. Each portal exposes the real homepage in its own markup.

use scraper::{Html, Selector};
use std::sync::OnceLock;

use super::homepage::is_company_homepage;
use super::{page_text, parse_selectors, urls_in_text};
use crate::domain::models::JobSite;

pub const JOB_SITE_DOMAINS: [&str; 11] = [
    "saramin.co.kr",
    "jobkorea.co.kr",
    "work.go.kr",
    "incruit.com",
    "wanted.co.kr",
    "indeed.com",
    "linkedin.com",
    "jobplanet.co.kr",
    "catch.co.kr",
    "alba.co.kr",
    "albamon.com",
];

const SARAMIN_SELECTORS: [&str; 5] = [
    r#".company_info_list a[href*="http"]"#,
    r#".company_summary a[href*="http"]"#,
    r#".basic_info a[href*="http"]"#,
    r#"a[title*="홈페이지"]"#,
    r#"a[title*="homepage"]"#,
];

const JOBKOREA_SELECTORS: [&str; 4] = [
    r#".tbList a[href*="http"]"#,
    r#".corpDetail a[href*="http"]"#,
    r#".coInfo a[href*="http"]"#,
    r#"a[title*="홈페이지"]"#,
];

const WORKNET_SELECTORS: [&str; 3] = [
    r#".company_info a[href*="http"]"#,
    r#".detail_info a[href*="http"]"#,
    r#"a[title*="홈페이지"]"#,
];

const INCRUIT_SELECTORS: [&str; 3] = [
    r#".company_info a[href*="http"]"#,
    r#".info_box a[href*="http"]"#,
    r#"a[title*="홈페이지"]"#,
];

pub fn is_job_site_url(url: &str) -> bool {
    let url = url.to_lowercase();
    JOB_SITE_DOMAINS.iter().any(|d| url.contains(d))
}

impl JobSite {
    pub fn detect(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains("saramin") {
            JobSite::Saramin
        } else if url.contains("jobkorea") {
            JobSite::JobKorea
        } else if url.contains("work.go.kr") {
            JobSite::WorkNet
        } else if url.contains("incruit") {
            JobSite::Incruit
        } else {
            JobSite::Generic
        }
    }

    fn selectors(&self) -> &'static [Selector] {
        static SARAMIN: OnceLock<Vec<Selector>> = OnceLock::new();
        static JOBKOREA: OnceLock<Vec<Selector>> = OnceLock::new();
        static WORKNET: OnceLock<Vec<Selector>> = OnceLock::new();
        static INCRUIT: OnceLock<Vec<Selector>> = OnceLock::new();

        match self {
            JobSite::Saramin => SARAMIN.get_or_init(|| parse_selectors(&SARAMIN_SELECTORS)).as_slice(),
            JobSite::JobKorea => JOBKOREA.get_or_init(|| parse_selectors(&JOBKOREA_SELECTORS)).as_slice(),
            JobSite::WorkNet => WORKNET.get_or_init(|| parse_selectors(&WORKNET_SELECTORS)).as_slice(),
            JobSite::Incruit => INCRUIT.get_or_init(|| parse_selectors(&INCRUIT_SELECTORS)).as_slice(),
            JobSite::Generic => &[],
        }
    }
}

/// The company's own homepage as linked from a job-site page.
pub fn extract_homepage(html: &Html, site: JobSite) -> Option<String> {
    let found = match site {
        JobSite::Generic => from_labelled_links(html),
        _ => from_selectors(html, site.selectors()),
    };
    found.or_else(|| from_page_text(html))
}

fn from_selectors(html: &Html, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| html.select(selector))
        .filter_map(|element| element.value().attr("href"))
        .find(|href| is_company_homepage(href))
        .map(str::to_string)
}

/// Anchors whose text or title says "homepage".
fn from_labelled_links(html: &Html) -> Option<String> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = SELECTOR.get_or_init(|| Selector::parse("a[href]").unwrap());

    html.select(selector)
        .filter(|element| {
            let text = element.text().collect::<String>().trim().to_lowercase();
            let title = element.value().attr("title").unwrap_or("").to_lowercase();
            [text, title]
                .iter()
                .any(|label| label.contains("홈페이지") || label.contains("homepage"))
        })
        .filter_map(|element| element.value().attr("href"))
        .find(|href| is_company_homepage(href))
        .map(str::to_string)
}

fn from_page_text(html: &Html) -> Option<String> {
    let text = page_text(html);
    let found = urls_in_text(&text)
        .find(|url| is_company_homepage(url))
        .map(str::to_string);
    found
}
