//! Company lookup through a search results page.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use url::Url;

use crate::domain::models::{CompanyInfo, EnrichSettings, JobSite};
use crate::error::{AppError, Result};
use crate::extractor::{address, homepage, job_site};
use crate::service::http::{create_client, fetch_html, parse_url};

/// Source of address/homepage data for a company name.
#[async_trait]
pub trait CompanyLookup: Send + Sync {
    async fn lookup(&self, company: &str) -> Result<CompanyInfo>;
}

pub struct SearchClient {
    client: Client,
    search_url: Url,
}

impl SearchClient {
    pub fn new(settings: &EnrichSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(
                &settings.user_agent,
                Duration::from_secs(settings.timeout_secs),
            )?,
            search_url: parse_url(&settings.search_url)?,
        })
    }

    pub fn search_query(company: &str) -> String {
        format!("{} 회사 주소 홈페이지", company)
    }

    fn results_url(&self, company: &str) -> Result<Url> {
        Url::parse_with_params(
            self.search_url.as_str(),
            &[("query", Self::search_query(company))],
        )
        .map_err(|e| AppError::InvalidInput(e.to_string()))
    }

    /// Fetch a job-site company page and pull the real homepage from it.
    pub async fn homepage_from_job_site(&self, url: &str, site: JobSite) -> Result<Option<String>> {
        log::debug!("[JOBSITE] Fetching {} page: {}", site.as_str(), url);
        let body = fetch_html(&self.client, parse_url(url)?).await?;
        let document = Html::parse_document(&body);
        Ok(job_site::extract_homepage(&document, site))
    }

    /// Follow a job-site link; keep the job-site URL when nothing better
    /// turns up.
    async fn resolve_homepage(&self, best: String) -> String {
        if !job_site::is_job_site_url(&best) {
            return best;
        }
        log::info!("[JOBSITE] Looking for the real homepage on {}", best);
        match self.homepage_from_job_site(&best, JobSite::detect(&best)).await {
            Ok(Some(actual)) => {
                log::debug!("[JOBSITE] Resolved {} -> {}", best, actual);
                actual
            }
            Ok(None) => {
                log::debug!("[JOBSITE] No homepage link on {}", best);
                best
            }
            Err(e) => {
                log::warn!("[JOBSITE] Failed to crawl {}: {}", best, e);
                best
            }
        }
    }
}

#[async_trait]
impl CompanyLookup for SearchClient {
    async fn lookup(&self, company: &str) -> Result<CompanyInfo> {
        let url = self.results_url(company)?;
        log::debug!("[SEARCH] Querying {}", url);
        let body = fetch_html(&self.client, url).await?;

        let (address, best) = parse_results(&body, company);
        let homepage = match best {
            Some(best) => self.resolve_homepage(best).await,
            None => String::new(),
        };

        Ok(CompanyInfo {
            address: address.unwrap_or_default(),
            homepage,
        })
    }
}

/// Address and best homepage candidate from a results page. Kept
/// synchronous so the parsed document never lives across an await.
fn parse_results(body: &str, company: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(body);
    let address = address::extract_address(&document);
    let candidates = homepage::extract_candidates(&document, company);
    (address, homepage::select_best(&candidates, company))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings_for(server: &mockito::Server) -> EnrichSettings {
        EnrichSettings {
            search_url: format!("{}/search.naver", server.url()),
            delay_between_requests: 0,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_search_query() {
        assert_eq!(SearchClient::search_query("알파테크"), "알파테크 회사 주소 홈페이지");
    }

    #[test]
    fn test_parse_results() {
        let body = r#"<html><body>
            <div class="business_info"><span class="addr">서울특별시 강남구 테헤란로 152</span></div>
            <a href="https://www.abctech.co.kr">공식 홈페이지</a>
        </body></html>"#;
        let (address, best) = parse_results(body, "ABCTech");
        assert_eq!(address.as_deref(), Some("서울특별시 강남구 테헤란로 152"));
        assert_eq!(best.as_deref(), Some("https://www.abctech.co.kr"));
    }

    #[tokio::test]
    async fn test_lookup_sends_query_and_extracts() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.naver")
            .match_query(Matcher::UrlEncoded(
                "query".into(),
                "ABCTech 회사 주소 홈페이지".into(),
            ))
            .with_status(200)
            .with_body(
                r#"<div class="company_info"><p class="address">경기도 성남시 분당구 판교역로 235</p></div>
                   <a href="https://abctech.com">www.abctech.com</a>"#,
            )
            .create_async()
            .await;

        let client = SearchClient::new(&settings_for(&server)).unwrap();
        let info = client.lookup("ABCTech").await.unwrap();
        assert_eq!(info.address, "경기도 성남시 분당구 판교역로 235");
        assert_eq!(info.homepage, "https://abctech.com");
    }

    #[tokio::test]
    async fn test_lookup_propagates_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.naver")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = SearchClient::new(&settings_for(&server)).unwrap();
        assert!(client.lookup("ABCTech").await.is_err());
    }

    #[tokio::test]
    async fn test_homepage_from_job_site_page() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/zf_user/company-info")
            .with_status(200)
            .with_body(
                r#"<div class="company_summary"><a href="https://www.abctech.co.kr">홈페이지</a></div>"#,
            )
            .create_async()
            .await;

        let client = SearchClient::new(&settings_for(&server)).unwrap();
        let url = format!("{}/zf_user/company-info", server.url());
        let found = client
            .homepage_from_job_site(&url, JobSite::Saramin)
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("https://www.abctech.co.kr"));
    }

    #[tokio::test]
    async fn test_failed_job_site_keeps_original_link() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/saramin.co.kr/company")
            .with_status(500)
            .create_async()
            .await;

        let client = SearchClient::new(&settings_for(&server)).unwrap();
        let link = format!("{}/saramin.co.kr/company", server.url());
        assert_eq!(client.resolve_homepage(link.clone()).await, link);
    }

    #[tokio::test]
    async fn test_job_site_without_homepage_keeps_original_link() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/www.saramin.co.kr/company")
            .with_status(200)
            .with_body(r#"<div class="company_summary"><p>기업정보 준비중</p></div>"#)
            .create_async()
            .await;

        let client = SearchClient::new(&settings_for(&server)).unwrap();
        let link = format!("{}/www.saramin.co.kr/company", server.url());
        assert_eq!(client.resolve_homepage(link.clone()).await, link);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_job_site_link_is_followed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/jobkorea.co.kr/company")
            .with_status(200)
            .with_body(r#"<div class="coInfo"><a href="https://www.abctech.co.kr">site</a></div>"#)
            .create_async()
            .await;

        let client = SearchClient::new(&settings_for(&server)).unwrap();
        let link = format!("{}/jobkorea.co.kr/company", server.url());
        assert_eq!(client.resolve_homepage(link).await, "https://www.abctech.co.kr");
    }

    #[tokio::test]
    async fn test_non_job_site_link_is_not_fetched() {
        let server = mockito::Server::new_async().await;
        let client = SearchClient::new(&settings_for(&server)).unwrap();
        let link = "https://www.abctech.co.kr".to_string();
        assert_eq!(client.resolve_homepage(link.clone()).await, link);
    }
}
