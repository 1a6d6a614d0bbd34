//! Static HTML page with a Google Map and the company table.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::OnceLock;
use url::form_urlencoded;

use crate::domain::models::{center_of, CompanyLocation};
use crate::error::{AppError, Result};

const TEMPLATE: &str = include_str!("map_page.html");

pub struct MapPage<'a> {
    pub title: &'a str,
    pub api_key: &'a str,
    pub generated_at: &'a str,
}

impl MapPage<'_> {
    /// Fill the page template. Every placeholder is substituted in a single
    /// pass so values containing `{{...}}` are never expanded again.
    pub fn render(&self, locations: &[CompanyLocation]) -> Result<String> {
        let center = center_of(locations).ok_or(AppError::NoLocations)?;

        let mut values: HashMap<&str, String> = HashMap::new();
        values.insert("TITLE", escape_html(self.title));
        values.insert("COUNT", locations.len().to_string());
        values.insert("GENERATED_AT", escape_html(self.generated_at));
        values.insert("TABLE_ROWS", table_rows(locations));
        values.insert("LOCATIONS_JSON", locations_json(locations)?);
        values.insert("CENTER_LAT", center.lat.to_string());
        values.insert("CENTER_LNG", center.lng.to_string());
        values.insert(
            "API_KEY",
            form_urlencoded::byte_serialize(self.api_key.as_bytes()).collect(),
        );

        Ok(placeholder_regex()
            .replace_all(TEMPLATE, |caps: &Captures| {
                values
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned())
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{([A-Z_]+)\}\}").unwrap())
}

fn table_rows(locations: &[CompanyLocation]) -> String {
    let mut rows = String::new();
    for (idx, location) in locations.iter().enumerate() {
        let _ = write!(
            rows,
            r#"
                        <tr onclick="panToMarker({})">
                            <td>{}</td>
                            <td>{}</td>
                            <td>{}</td>
                        </tr>"#,
            idx,
            idx + 1,
            escape_html(&location.name),
            escape_html(&location.address)
        );
    }
    rows
}

/// JSON array for the inline script. `</` is escaped so a value can never
/// close the script element.
fn locations_json(locations: &[CompanyLocation]) -> Result<String> {
    let json = serde_json::to_string(locations)
        .map_err(|e| AppError::Parse(format!("Failed to serialise locations: {}", e)))?;
    Ok(json.replace("</", "<\\/"))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
