//! Spreadsheet handoff file.
//!
//! Both pipelines read the first worksheet of a workbook (or a CSV export of
//! it) as a header row plus string cells, and the enrich pipeline writes the
//! updated table back out.

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const OUTPUT_SUFFIX: &str = "_업데이트";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Load a `.csv` file or the first worksheet of any workbook format
    /// calamine understands.
    pub fn load(path: &Path) -> Result<Self> {
        let sheet = if is_csv(path) {
            Self::load_csv(path)?
        } else {
            Self::load_workbook(path)?
        };
        log::info!(
            "[SHEET] Loaded {} rows ({} columns) from {}",
            sheet.len(),
            sheet.headers.len(),
            path.display()
        );
        Ok(sheet)
    }

    fn load_csv(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let text = decode_text(&bytes);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    fn load_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::spreadsheet(format!("{} has no worksheets", path.display())))??;

        let mut iter = range.rows();
        let headers = iter
            .next()
            .ok_or_else(|| AppError::spreadsheet(format!("{} is empty", path.display())))?
            .iter()
            .map(|c| cell_to_string(c).trim().to_string())
            .collect();
        let rows = iter
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(Self { headers, rows })
    }

    /// Write the table as `.csv` (UTF-8 with BOM so Excel picks the right
    /// encoding) or `.xlsx`, chosen by the extension of `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if is_csv(path) {
            self.save_csv(path)?;
        } else {
            self.save_xlsx(path)?;
        }
        log::info!("[SHEET] Saved {} rows to {}", self.len(), path.display());
        Ok(())
    }

    fn save_csv(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn save_xlsx(&self, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, excel_col(col)?, header, &bold)?;
        }
        for (idx, row) in self.rows.iter().enumerate() {
            let excel_row = u32::try_from(idx + 1)
                .map_err(|_| AppError::spreadsheet("too many rows for xlsx"))?;
            for (col, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet.write_string(excel_row, excel_col(col)?, value)?;
            }
        }
        worksheet.autofit();

        workbook.save(path)?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| AppError::MissingColumn(name.to_string()))
    }

    /// Index of `name`, appending an empty column when it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        log::debug!("[SHEET] Adding column '{}'", name);
        self.headers.push(name.trim().to_string());
        self.headers.len() - 1
    }

    /// Cell text; cells beyond a short row read as empty.
    pub fn get(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        let Some(cells) = self.rows.get_mut(row) else {
            log::warn!("[SHEET] Ignoring write to missing row {}", row);
            return;
        };
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.into();
    }
}

/// `<stem>_업데이트.<ext>` beside the input. CSV stays CSV, every workbook
/// format is written back as xlsx.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "members".to_string());
    let ext = if is_csv(input) { "csv" } else { "xlsx" };
    input.with_file_name(format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn excel_col(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| AppError::spreadsheet("too many columns for xlsx"))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // phone numbers and zip codes come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Korean CSV exports are frequently EUC-KR (CP949) rather than UTF-8.
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            log::debug!("[SHEET] Input is not UTF-8, decoding as EUC-KR");
            let (text, _, _) = encoding_rs::EUC_KR.decode(bytes);
            text.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sheet {
        Sheet::new(
            vec!["회원사명".into(), "주소".into()],
            vec![
                vec!["알파테크".into(), "서울특별시 강남구 테헤란로 152".into()],
                vec!["베타시스템".into()],
            ],
        )
    }

    #[test]
    fn test_get_and_set_pad_short_rows() {
        let mut sheet = sample();
        let homepage = sheet.ensure_column("홈페이지");
        assert_eq!(homepage, 2);
        assert_eq!(sheet.get(1, 1), "");
        assert_eq!(sheet.get(1, homepage), "");

        sheet.set(1, homepage, "https://beta.co.kr");
        assert_eq!(sheet.get(1, homepage), "https://beta.co.kr");
        assert_eq!(sheet.get(1, 1), "");
        // writing past the end of the table is ignored
        sheet.set(10, 0, "x");
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn test_ensure_column_is_idempotent() {
        let mut sheet = sample();
        assert_eq!(sheet.ensure_column("주소"), 1);
        assert_eq!(sheet.headers().len(), 2);
        assert!(matches!(
            sheet.require_column("홈페이지"),
            Err(AppError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/회원사 목록.xlsx")),
            PathBuf::from("/data/회원사 목록_업데이트.xlsx")
        );
        assert_eq!(
            default_output_path(Path::new("members.CSV")),
            PathBuf::from("members_업데이트.csv")
        );
        assert_eq!(
            default_output_path(Path::new("legacy.xls")),
            PathBuf::from("legacy_업데이트.xlsx")
        );
    }

    #[test]
    fn test_csv_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.csv");
        let mut sheet = sample();
        let col = sheet.ensure_column("홈페이지");
        sheet.set(0, col, "https://alpha.co.kr");
        sheet.save(&path).unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert!(raw.starts_with(UTF8_BOM));

        let loaded = Sheet::load(&path).unwrap();
        assert_eq!(loaded.headers(), &["회원사명", "주소", "홈페이지"]);
        assert_eq!(loaded.get(0, 2), "https://alpha.co.kr");
        assert_eq!(loaded.get(1, 0), "베타시스템");
    }

    #[test]
    fn test_csv_euc_kr_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.csv");
        let (bytes, _, _) = encoding_rs::EUC_KR.encode("회원사명,주소\n감마전자,부산광역시 해운대구 센텀로 1\n");
        std::fs::write(&path, &bytes).unwrap();

        let loaded = Sheet::load(&path).unwrap();
        assert_eq!(loaded.column("주소"), Some(1));
        assert_eq!(loaded.get(0, 0), "감마전자");
    }

    #[test]
    fn test_xlsx_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.xlsx");
        sample().save(&path).unwrap();

        let loaded = Sheet::load(&path).unwrap();
        assert_eq!(loaded.headers(), &["회원사명", "주소"]);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(0, 1), "서울특별시 강남구 테헤란로 152");
        assert_eq!(loaded.get(1, 1), "");
    }

    #[test]
    fn test_integral_floats_print_without_fraction() {
        assert_eq!(cell_to_string(&Data::Float(1234.0)), "1234");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Sheet::load(&dir.path().join("nope.xlsx")).is_err());
        assert!(Sheet::load(&dir.path().join("nope.csv")).is_err());
    }
}
