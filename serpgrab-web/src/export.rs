//! Downloadable blobs: the whole result set as a spreadsheet, one article as text.
use regex::Regex;
use rust_xlsxwriter::{Workbook, XlsxError};
use serpgrab_common::ResultSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

pub const SPREADSHEET_FILE_NAME: &str = "results.xlsx";
pub const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const TEXT_MIME: &str = "text/plain";
pub const SHEET_NAME: &str = "Sheet1";
pub const HEADER: [&str; 2] = ["Title", "Link"];

const MAX_STEM_BYTES: usize = 120;
const UNTITLED: &str = "untitled";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet serialization failed: {0}")]
    Spreadsheet(#[from] XlsxError),
    #[error("{0} results do not fit in one sheet")]
    TooManyRows(usize),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Single-sheet workbook: header `Title, Link`, then one row per item in order.
pub fn to_spreadsheet(results: &ResultSet) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, label) in (0u16..).zip(HEADER) {
        sheet.write_string(0, col, label)?;
    }
    for (idx, item) in results.iter().enumerate() {
        let row = u32::try_from(idx + 1).map_err(|_| ExportError::TooManyRows(results.len()))?;
        sheet.write_string(row, 0, &item.title)?;
        sheet.write_string(row, 1, &item.link)?;
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(rows = results.len(), bytes = bytes.len(), "export.spreadsheet");
    Ok(bytes)
}

/// UTF-8 bytes of the article text, otherwise untouched.
pub fn to_text_blob(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

fn whitespace_runs() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").ok()).as_ref()
}

/// Turn a result title into a file stem every common filesystem accepts.
///
/// Whitespace runs collapse to one space. Path separators, reserved
/// punctuation and control characters become `_`. Surrounding whitespace and
/// dots are dropped, Windows device names (`CON`, `NUL`, `COM1`, ...) get a
/// `_` prefix, and the stem is capped on a char boundary.
///
/// ```
/// use serpgrab_web::export::sanitize_file_stem;
///
/// assert_eq!(sanitize_file_stem("a/b: \"c\"?"), "a_b_ _c__");
/// assert_eq!(sanitize_file_stem("  ...  "), "untitled");
/// ```
pub fn sanitize_file_stem(title: &str) -> String {
    let collapsed = match whitespace_runs() {
        Some(re) => re.replace_all(title, " ").into_owned(),
        None => title.to_string(),
    };
    let replaced: String = collapsed
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let mut stem = replaced
        .trim()
        .trim_matches('.')
        .trim()
        .to_string();
    if stem.len() > MAX_STEM_BYTES {
        let mut end = MAX_STEM_BYTES;
        while !stem.is_char_boundary(end) {
            end -= 1;
        }
        stem.truncate(end);
        stem = stem.trim_end().trim_end_matches('.').to_string();
    }
    if stem.is_empty() {
        UNTITLED.to_string()
    } else if is_reserved_device_name(&stem) {
        format!("_{stem}")
    } else {
        stem
    }
}

/// Names Windows maps to devices regardless of extension.
fn is_reserved_device_name(stem: &str) -> bool {
    let base = stem.split('.').next().unwrap_or(stem).trim_end().to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => base
            .strip_prefix("COM")
            .or_else(|| base.strip_prefix("LPT"))
            .is_some_and(|digit| matches!(digit.as_bytes(), [b'1'..=b'9'])),
    }
}

/// A blob the user can save, with the name and MIME type a browser would get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    /// `results.xlsx` for the whole result set.
    pub fn spreadsheet(results: &ResultSet) -> Result<Self, ExportError> {
        Ok(Self {
            file_name: SPREADSHEET_FILE_NAME.to_string(),
            mime: SPREADSHEET_MIME,
            bytes: to_spreadsheet(results)?,
        })
    }

    /// `<sanitized title>.txt` holding one article's text.
    ///
    /// ```
    /// use serpgrab_web::Download;
    ///
    /// let d = Download::article("Seoul: rain?", "body");
    /// assert_eq!(d.file_name, "Seoul_ rain_.txt");
    /// assert_eq!(d.mime, "text/plain");
    /// assert_eq!(d.bytes, b"body");
    /// ```
    pub fn article(title: &str, text: &str) -> Self {
        Self {
            file_name: format!("{}.txt", sanitize_file_stem(title)),
            mime: TEXT_MIME,
            bytes: to_text_blob(text),
        }
    }

    /// Write the blob into `dir` (created if missing), replacing any file of
    /// the same name. Returns the written path.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            mime = self.mime,
            bytes = self.bytes.len(),
            "export.download.written"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use serpgrab_common::ResultItem;
    use std::io::Cursor;

    fn read_rows(bytes: Vec<u8>) -> Vec<Vec<String>> {
        let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(wb.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = wb.worksheet_range(SHEET_NAME).unwrap();
        range
            .rows()
            .map(|r| {
                r.iter()
                    .map(|c| match c {
                        Data::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn spreadsheet_reads_back_in_order() {
        let set = ResultSet::from(vec![
            ResultItem::new("첫 번째 기사", "https://news.example.com/1"),
            ResultItem::new("second", "https://news.example.com/2"),
            ResultItem::new("second", "https://news.example.com/2"),
        ]);
        let rows = read_rows(to_spreadsheet(&set).unwrap());

        assert_eq!(
            rows,
            vec![
                vec!["Title".to_string(), "Link".to_string()],
                vec!["첫 번째 기사".to_string(), "https://news.example.com/1".to_string()],
                vec!["second".to_string(), "https://news.example.com/2".to_string()],
                vec!["second".to_string(), "https://news.example.com/2".to_string()],
            ]
        );
    }

    #[test]
    fn empty_result_set_still_has_header() {
        let rows = read_rows(to_spreadsheet(&ResultSet::default()).unwrap());
        assert_eq!(rows, vec![vec!["Title".to_string(), "Link".to_string()]]);
    }

    #[test]
    fn text_blob_is_verbatim_utf8() {
        assert_eq!(to_text_blob("본문\n둘째 줄"), "본문\n둘째 줄".as_bytes());
    }

    #[test]
    fn sanitize_handles_separators_and_controls() {
        assert_eq!(sanitize_file_stem("a\\b|c<d>e*f"), "a_b_c_d_e_f");
        assert_eq!(sanitize_file_stem("line\none\ttab"), "line one tab");
        assert_eq!(sanitize_file_stem("ends with dots..."), "ends with dots");
        assert_eq!(sanitize_file_stem(".hidden"), "hidden");
        assert_eq!(sanitize_file_stem("... leading"), "leading");
        assert_eq!(sanitize_file_stem("bell\u{7}"), "bell_");
        assert_eq!(sanitize_file_stem(""), "untitled");
    }

    #[test]
    fn sanitize_escapes_windows_device_names() {
        assert_eq!(sanitize_file_stem("CON"), "_CON");
        assert_eq!(sanitize_file_stem("nul"), "_nul");
        assert_eq!(sanitize_file_stem("com1"), "_com1");
        assert_eq!(sanitize_file_stem("LPT9.report"), "_LPT9.report");
        assert_eq!(sanitize_file_stem("COM0"), "COM0");
        assert_eq!(sanitize_file_stem("CONSOLE"), "CONSOLE");
        assert_eq!(sanitize_file_stem("Com 1"), "Com 1");
    }

    #[test]
    fn sanitize_caps_length_on_char_boundary() {
        let title = "가".repeat(100); // 300 bytes
        let stem = sanitize_file_stem(&title);
        assert!(stem.len() <= MAX_STEM_BYTES);
        assert_eq!(stem.chars().count(), MAX_STEM_BYTES / 3);
    }

    #[test]
    fn downloads_are_written_into_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("out");

        let article = Download::article("기사: 제목", "본문");
        let path = article.write_into(&nested).unwrap();
        assert_eq!(path, nested.join("기사_ 제목.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "본문");

        let sheet = Download::spreadsheet(&ResultSet::default()).unwrap();
        let path = sheet.write_into(&nested).unwrap();
        assert_eq!(path.file_name().unwrap(), SPREADSHEET_FILE_NAME);
        assert_eq!(sheet.mime, SPREADSHEET_MIME);
    }
}
