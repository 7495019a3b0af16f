//! Format extraction: raw bytes + declared format -> structured records.
//!
//! Extraction is a pure transformation with no I/O: the background parse
//! worker reads the blob and hands the bytes here. Three formats are
//! supported, dispatched on the declared filename's suffix:
//!
//! - `.csv`  -> one JSON object per data row, header row as keys
//! - `.xlsx` -> same shape, first worksheet only
//! - `.pdf`  -> one `{page, text}` object per page
//!
//! Anything else is a terminal [`ExtractError::Unsupported`].

use serde_json::Value;
use thiserror::Error;

mod csv;
mod pdf;
mod xlsx;

/// Supported input formats, derived from the declared filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl FileFormat {
    /// Determine the format from a filename suffix, case-insensitive.
    pub fn from_name(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Some(FileFormat::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(FileFormat::Xlsx)
        } else if lower.ends_with(".pdf") {
            Some(FileFormat::Pdf)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("CSV parse error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Spreadsheet parse error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("Spreadsheet has no worksheets")]
    EmptyWorkbook,

    #[error("PDF parse error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Extract structured records from `bytes`, dispatching on the declared
/// filename's suffix.
pub fn extract(bytes: &[u8], filename: &str) -> Result<Vec<Value>, ExtractError> {
    match FileFormat::from_name(filename) {
        Some(format) => extract_records(bytes, format),
        None => Err(ExtractError::Unsupported(filename.to_string())),
    }
}

/// Extract structured records from `bytes` in a known format.
pub fn extract_records(bytes: &[u8], format: FileFormat) -> Result<Vec<Value>, ExtractError> {
    match format {
        FileFormat::Csv => csv::parse_rows(bytes),
        FileFormat::Xlsx => xlsx::parse_rows(bytes),
        FileFormat::Pdf => pdf::parse_pages(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_name() {
        assert_eq!(FileFormat::from_name("data.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_name("REPORT.XLSX"), Some(FileFormat::Xlsx));
        assert_eq!(FileFormat::from_name("doc.pdf"), Some(FileFormat::Pdf));
        assert_eq!(FileFormat::from_name("image.tiff"), None);
        assert_eq!(FileFormat::from_name("csv"), None);
    }

    #[test]
    fn test_unsupported_suffix_is_terminal_error() {
        let err = extract(b"whatever", "b.tiff").unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported(_)));
        assert!(err.to_string().contains("b.tiff"));
    }

    #[test]
    fn test_csv_dispatch() {
        let rows = extract(b"x\n1\n2\n", "a.csv").unwrap();
        assert_eq!(rows.len(), 2);
    }
}
