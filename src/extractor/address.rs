use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

use super::{page_text, parse_selectors};

/// Knowledge-panel blocks that carry a company address on the results page.
const ADDRESS_SELECTORS: [&str; 4] = [
    ".business_info .addr",
    ".company_info .address",
    ".info_group .addr",
    ".detail_info .addr",
];

const ADDRESS_KEYWORDS: [&str; 8] = ["시", "도", "구", "군", "동", "로", "길", "번지"];

const MIN_ADDRESS_CHARS: usize = 10;
const MAX_ADDRESS_CHARS: usize = 200;

/// First plausible Korean street address on the page.
///
/// Structured panels are preferred; otherwise the page text is scanned for
/// a `<province/city> <district> <street...>` run.
pub fn extract_address(html: &Html) -> Option<String> {
    static SELECTORS: OnceLock<Vec<Selector>> = OnceLock::new();
    let selectors = SELECTORS.get_or_init(|| parse_selectors(&ADDRESS_SELECTORS));

    for selector in selectors {
        for element in html.select(selector) {
            let text = element.text().collect::<String>().trim().to_string();
            if is_valid_address(&text) {
                return Some(text);
            }
        }
    }

    let text = page_text(html);
    address_regex()
        .find_iter(&text)
        .map(|m| m.as_str().trim())
        .find(|candidate| is_valid_address(candidate))
        .map(str::to_string)
}

pub fn is_valid_address(text: &str) -> bool {
    let len = text.chars().count();
    if !(MIN_ADDRESS_CHARS..=MAX_ADDRESS_CHARS).contains(&len) {
        return false;
    }
    ADDRESS_KEYWORDS.iter().any(|k| text.contains(k))
}

fn address_regex() -> &'static Regex {
    static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
    ADDRESS_RE.get_or_init(|| {
        Regex::new(r"[가-힣]+[시도]\s+[가-힣]+[시군구]\s+[가-힣\d\-\s,]+").unwrap()
    })
}
