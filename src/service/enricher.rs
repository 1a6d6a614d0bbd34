//! Enrich pipeline: fill in the address and homepage columns of the member
//! list, one company at a time.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::models::{is_blank_cell, CompanyInfo, EnrichSettings, EnrichSummary};
use crate::error::Result;
use crate::repository::{default_output_path, Sheet};
use crate::service::search::{CompanyLookup, SearchClient};

const ADDRESS_PREVIEW_CHARS: usize = 50;

pub struct Enricher<L: CompanyLookup> {
    lookup: L,
    settings: EnrichSettings,
}

impl<L: CompanyLookup> Enricher<L> {
    pub fn new(lookup: L, settings: EnrichSettings) -> Self {
        Self { lookup, settings }
    }

    /// Look up every company that is still missing data and write the
    /// results into `sheet`. A failed lookup leaves the row untouched.
    pub async fn enrich(&self, sheet: &mut Sheet) -> Result<EnrichSummary> {
        let columns = &self.settings.columns;
        let name_col = sheet.require_column(&columns.company)?;
        let address_col = sheet.ensure_column(&columns.address);
        let homepage_col = sheet.ensure_column(&columns.homepage);

        let total = sheet.len();
        let mut summary = EnrichSummary {
            total,
            ..Default::default()
        };

        for row in 0..total {
            let company = sheet.get(row, name_col).trim().to_string();
            if is_blank_cell(&company) {
                log::warn!("[ENRICH] Row {}: no company name", row + 1);
                summary.skipped_unnamed += 1;
                continue;
            }

            log::info!("[ENRICH] {}/{} - searching {}", row + 1, total, company);

            if !is_blank_cell(sheet.get(row, address_col))
                && !is_blank_cell(sheet.get(row, homepage_col))
            {
                log::info!("[ENRICH]   already filled in, skipping");
                summary.skipped_existing += 1;
                continue;
            }

            match self.lookup.lookup(&company).await {
                Ok(info) => {
                    summary.searched += 1;
                    if info.is_empty() {
                        log::warn!("[ENRICH]   nothing found for {}", company);
                    }
                    log::info!("[ENRICH]   address: {}", preview(&info.address));
                    log::info!("[ENRICH]   homepage: {}", info.homepage);
                    apply(sheet, row, address_col, homepage_col, info);
                }
                Err(e) => {
                    log::error!("[ENRICH] Row {} ({}) failed: {}", row + 1, company, e);
                    summary.failed += 1;
                }
            }

            if self.settings.delay_between_requests > 0 {
                sleep(Duration::from_millis(self.settings.delay_between_requests)).await;
            }
        }

        log::info!(
            "[ENRICH] Done: {} searched, {} already filled, {} unnamed, {} failed",
            summary.searched,
            summary.skipped_existing,
            summary.skipped_unnamed,
            summary.failed
        );
        Ok(summary)
    }
}

/// Only found values are written. Cells without a result keep whatever the
/// sheet had, the same as after a failed lookup.
fn apply(sheet: &mut Sheet, row: usize, address_col: usize, homepage_col: usize, info: CompanyInfo) {
    for (col, value) in [(address_col, info.address), (homepage_col, info.homepage)] {
        if !value.is_empty() {
            sheet.set(row, col, value);
        }
    }
}

fn preview(address: &str) -> String {
    if address.chars().count() > ADDRESS_PREVIEW_CHARS {
        let head: String = address.chars().take(ADDRESS_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        address.to_string()
    }
}

/// Load the member list, enrich it through the search engine and save the
/// result. Returns the path written.
#[tracing::instrument(skip(settings))]
pub async fn run(input: &Path, output: Option<&Path>, settings: EnrichSettings) -> Result<PathBuf> {
    log::info!("[ENRICH] Starting company lookup for {}", input.display());
    let mut sheet = Sheet::load(input)?;

    let lookup = SearchClient::new(&settings)?;
    let enricher = Enricher::new(lookup, settings);
    enricher.enrich(&mut sheet).await?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    sheet.save(&output)?;
    log::info!("[ENRICH] All done, results in {}", output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned lookup results; unknown names fail.
    struct StubLookup {
        answers: HashMap<String, CompanyInfo>,
        calls: Mutex<Vec<String>>,
    }

    impl StubLookup {
        fn new(answers: &[(&str, &str, &str)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(name, address, homepage)| {
                        (
                            name.to_string(),
                            CompanyInfo {
                                address: address.to_string(),
                                homepage: homepage.to_string(),
                            },
                        )
                    })
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompanyLookup for StubLookup {
        async fn lookup(&self, company: &str) -> Result<CompanyInfo> {
            self.calls.lock().unwrap().push(company.to_string());
            self.answers
                .get(company)
                .cloned()
                .ok_or_else(|| AppError::network("connection reset"))
        }
    }

    fn quick_settings() -> EnrichSettings {
        EnrichSettings {
            delay_between_requests: 0,
            ..Default::default()
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_enrich_fills_missing_columns() {
        let mut sheet = Sheet::new(row(&["회원사명"]), vec![row(&["알파테크"]), row(&["베타"])]);
        let lookup = StubLookup::new(&[
            ("알파테크", "서울특별시 강남구 테헤란로 152", "https://alpha.co.kr"),
            ("베타", "", ""),
        ]);
        let enricher = Enricher::new(lookup, quick_settings());

        let summary = enricher.enrich(&mut sheet).await.unwrap();
        assert_eq!(summary.searched, 2);
        assert_eq!(sheet.headers(), &["회원사명", "주소", "홈페이지"]);
        assert_eq!(sheet.get(0, 1), "서울특별시 강남구 테헤란로 152");
        assert_eq!(sheet.get(0, 2), "https://alpha.co.kr");
        assert_eq!(sheet.get(1, 1), "");
    }

    #[tokio::test]
    async fn test_enrich_skips_unnamed_and_complete_rows() {
        let mut sheet = Sheet::new(
            row(&["회원사명", "주소", "홈페이지"]),
            vec![
                row(&["", "", ""]),
                row(&["nan", "", ""]),
                row(&["감마", "부산광역시 해운대구 센텀로 1", "https://gamma.kr"]),
                row(&["델타", "대구광역시 수성구 달구벌대로 1", ""]),
            ],
        );
        let lookup = StubLookup::new(&[("델타", "", "https://delta.co.kr")]);
        let enricher = Enricher::new(lookup, quick_settings());

        let summary = enricher.enrich(&mut sheet).await.unwrap();
        assert_eq!(
            summary,
            EnrichSummary {
                total: 4,
                searched: 1,
                skipped_existing: 1,
                skipped_unnamed: 2,
                failed: 0,
            }
        );
        assert_eq!(*enricher.lookup.calls.lock().unwrap(), vec!["델타".to_string()]);
        // the empty address result kept the existing one
        assert_eq!(sheet.get(3, 1), "대구광역시 수성구 달구벌대로 1");
        assert_eq!(sheet.get(3, 2), "https://delta.co.kr");
    }

    #[tokio::test]
    async fn test_enrich_counts_failures_and_continues() {
        let mut sheet = Sheet::new(
            row(&["회원사명", "주소"]),
            vec![row(&["unknown", "nan"]), row(&["알파", ""])],
        );
        let lookup = StubLookup::new(&[("알파", "서울특별시 중구 세종대로 110", "")]);
        let enricher = Enricher::new(lookup, quick_settings());

        let summary = enricher.enrich(&mut sheet).await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.searched, 1);
        assert_eq!(sheet.get(0, 1), "nan");
        assert_eq!(sheet.get(1, 1), "서울특별시 중구 세종대로 110");
    }

    #[tokio::test]
    async fn test_empty_result_and_failure_leave_cells_alike() {
        let mut sheet = Sheet::new(
            row(&["회원사명", "주소", "홈페이지"]),
            vec![row(&["알파", "nan", ""]), row(&["unknown", "nan", ""])],
        );
        let lookup = StubLookup::new(&[("알파", "", "")]);
        let enricher = Enricher::new(lookup, quick_settings());

        let summary = enricher.enrich(&mut sheet).await.unwrap();
        assert_eq!(summary.searched, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(sheet.get(0, 1), "nan");
        assert_eq!(sheet.get(1, 1), "nan");
        assert_eq!(sheet.get(0, 2), "");
    }

    #[tokio::test]
    async fn test_enrich_requires_company_column() {
        let mut sheet = Sheet::new(row(&["이름"]), vec![row(&["알파"])]);
        let enricher = Enricher::new(StubLookup::new(&[]), quick_settings());
        assert!(matches!(
            enricher.enrich(&mut sheet).await,
            Err(AppError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_preview_truncates_long_addresses() {
        let long = "가".repeat(60);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 53);
        assert_eq!(preview("짧은 주소"), "짧은 주소");
    }
}
