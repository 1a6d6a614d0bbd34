//! Rich domain entities - behavior lives WITH data

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_SEARCH_URL: &str = "https://search.naver.com/search.naver";
pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Placeholder shipped in sample configs; never a usable key.
pub const API_KEY_PLACEHOLDER: &str = "YOUR_GOOGLE_API_KEY";

// ====== Enums ======

/// Recruiting portals whose company pages link out to the real homepage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSite {
    Saramin,
    JobKorea,
    WorkNet,
    Incruit,
    Generic,
}

impl JobSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSite::Saramin => "saramin",
            JobSite::JobKorea => "jobkorea",
            JobSite::WorkNet => "worknet",
            JobSite::Incruit => "incruit",
            JobSite::Generic => "generic",
        }
    }
}

/// `status` field of a Geocoding API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    OverDailyLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    #[serde(other)]
    Other,
}

impl GeocodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodeStatus::Ok => "OK",
            GeocodeStatus::ZeroResults => "ZERO_RESULTS",
            GeocodeStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            GeocodeStatus::OverDailyLimit => "OVER_DAILY_LIMIT",
            GeocodeStatus::RequestDenied => "REQUEST_DENIED",
            GeocodeStatus::InvalidRequest => "INVALID_REQUEST",
            GeocodeStatus::UnknownError => "UNKNOWN_ERROR",
            GeocodeStatus::Other => "OTHER",
        }
    }
}

// ====== Simple Entities ======

/// What a lookup found for one company. Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyInfo {
    pub address: String,
    pub homepage: String,
}

impl CompanyInfo {
    pub fn is_empty(&self) -> bool {
        self.address.is_empty() && self.homepage.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One marker on the rendered map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyLocation {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl CompanyLocation {
    pub fn new(name: impl Into<String>, address: impl Into<String>, coords: Coordinates) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            lat: coords.lat,
            lng: coords.lng,
        }
    }
}

/// Average position of all locations, used as the initial map center.
pub fn center_of(locations: &[CompanyLocation]) -> Option<Coordinates> {
    if locations.is_empty() {
        return None;
    }
    let n = locations.len() as f64;
    Some(Coordinates {
        lat: locations.iter().map(|l| l.lat).sum::<f64>() / n,
        lng: locations.iter().map(|l| l.lng).sum::<f64>() / n,
    })
}

/// Spreadsheet cells that hold no usable value. Sheets exported through
/// pandas carry the literal `nan` for empty cells.
pub fn is_blank_cell(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("nan")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub total: usize,
    pub searched: usize,
    pub skipped_existing: usize,
    pub skipped_unnamed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodeSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

// ====== Settings ======

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub company: String,
    pub address: String,
    pub homepage: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            company: "회원사명".to_string(),
            address: "주소".to_string(),
            homepage: "홈페이지".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichSettings {
    pub search_url: String,
    /// Pause after every search request.
    pub delay_between_requests: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub columns: ColumnNames,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            delay_between_requests: 2000,
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            columns: ColumnNames::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapSettings {
    pub geocode_url: String,
    pub api_key: String,
    pub language: String,
    pub region: String,
    pub timeout_secs: u64,
    pub probe_timeout_secs: u64,
    /// Pause before every geocoding request (API allows 50 req/s).
    pub pacing_ms: u64,
    pub retry_delay_ms: u64,
    pub max_retries: u32,
    pub title: String,
    pub columns: ColumnNames,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            api_key: String::new(),
            language: "ko".to_string(),
            region: "kr".to_string(),
            timeout_secs: 15,
            probe_timeout_secs: 10,
            pacing_ms: 50,
            retry_delay_ms: 1000,
            max_retries: 3,
            title: "회원사 위치 지도".to_string(),
            columns: ColumnNames::default(),
        }
    }
}

impl MapSettings {
    pub fn has_usable_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }
}
