//! Spreadsheet and CSV decoding into a header-keyed table.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use super::ImportError;

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    /// `.xlsx` or `.xls`; the first worksheet is read.
    Spreadsheet,
}

impl FileFormat {
    /// Detect the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedFormat`] for any other extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, ImportError> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(Self::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Ok(Self::Spreadsheet)
        } else {
            Err(ImportError::UnsupportedFormat(file_name.to_string()))
        }
    }
}

/// Rows of an uploaded file, in file order, with the header row split off.
///
/// Every row has exactly as many cells as there are headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push_row(&mut self, mut cells: Vec<String>) {
        if cells.iter().all(|c| c.trim().is_empty()) {
            return;
        }
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Decode an uploaded file.
///
/// # Errors
///
/// Returns error if the format is unsupported or the bytes cannot be decoded.
pub fn parse_file(file_name: &str, bytes: &[u8]) -> Result<RawTable, ImportError> {
    match FileFormat::from_file_name(file_name)? {
        FileFormat::Csv => parse_csv(bytes),
        FileFormat::Spreadsheet => parse_spreadsheet(bytes),
    }
}

/// Decode CSV bytes; the first record holds the headers.
///
/// # Errors
///
/// Returns error if the CSV is malformed.
pub fn parse_csv(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = RawTable::new(headers);
    for result in reader.records() {
        let record = result?;
        table.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

/// Decode the first worksheet of an `.xlsx`/`.xls` workbook.
///
/// # Errors
///
/// Returns error if the workbook cannot be opened or has no worksheet.
pub fn parse_spreadsheet(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::EmptyFile)??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(ImportError::EmptyFile);
    };
    let headers = header_row
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();

    let mut table = RawTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_text).collect());
    }
    Ok(table)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.trim().to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v
            .as_datetime()
            .map_or_else(|| v.to_string(), |dt| dt.date().to_string()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => v.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}
