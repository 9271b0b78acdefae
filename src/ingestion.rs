use crate::error::{ProfitError, Result};
use crate::table::{CellValue, RawTable, SourceKind};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::{debug, warn};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum EmptyReason {
    /// The file could not be opened or parsed.
    Unreadable(String),
    /// The file parsed but carried no header or no data rows.
    NoRows,
}

/// Result of loading one upload. Loading never fails outright; the caller
/// decides whether an empty outcome is acceptable for that source.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(RawTable),
    Empty { name: String, reason: EmptyReason },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    /// Optional sources degrade to absent.
    pub fn into_optional(self, kind: SourceKind) -> Option<RawTable> {
        match self {
            LoadOutcome::Loaded(table) => Some(table),
            LoadOutcome::Empty { name, reason } => {
                warn!("{} source '{}' treated as absent: {:?}", kind, name, reason);
                None
            }
        }
    }

    pub fn into_required(self, kind: SourceKind) -> Result<RawTable> {
        match self {
            LoadOutcome::Loaded(table) => Ok(table),
            LoadOutcome::Empty {
                name,
                reason: EmptyReason::Unreadable(reason),
            } => Err(ProfitError::SourceRead { path: name, reason }),
            LoadOutcome::Empty {
                reason: EmptyReason::NoRows,
                ..
            } => Err(ProfitError::MissingSource(kind)),
        }
    }
}

/// Reads an upload from disk. `.csv` files are parsed as delimited text,
/// everything else as a workbook whose first sheet is used.
pub fn load_table(path: impl AsRef<Path>) -> LoadOutcome {
    let path = path.as_ref();
    let name = path.to_string_lossy().into_owned();

    match std::fs::read(path) {
        Ok(bytes) => load_table_from_bytes(&name, &bytes),
        Err(e) => LoadOutcome::Empty {
            name,
            reason: EmptyReason::Unreadable(e.to_string()),
        },
    }
}

pub fn load_table_from_bytes(file_name: &str, bytes: &[u8]) -> LoadOutcome {
    let parsed = if file_name.to_lowercase().ends_with(".csv") {
        parse_delimited(bytes)
    } else {
        parse_workbook(bytes)
    };

    match parsed {
        Ok(table) if table.is_empty() => LoadOutcome::Empty {
            name: file_name.to_string(),
            reason: EmptyReason::NoRows,
        },
        Ok(table) => {
            debug!(
                "Loaded '{}': {} columns, {} rows",
                file_name,
                table.headers().len(),
                table.row_count()
            );
            LoadOutcome::Loaded(table)
        }
        Err(e) => LoadOutcome::Empty {
            name: file_name.to_string(),
            reason: EmptyReason::Unreadable(e.to_string()),
        },
    }
}

fn parse_delimited(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::text).collect());
    }

    Ok(RawTable::new(headers, rows))
}

fn parse_workbook(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ProfitError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ProfitError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| ProfitError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_to_value(cell).as_label())
            .collect(),
        None => return Ok(RawTable::empty()),
    };

    let data = rows
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect();

    Ok(RawTable::new(headers, data))
}

fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::text(v.as_str()),
        Data::Bool(v) => CellValue::Text(v.to_string()),
        Data::DateTime(v) => CellValue::Text(v.to_string()),
        Data::DateTimeIso(v) => CellValue::text(v.as_str()),
        Data::DurationIso(v) => CellValue::text(v.as_str()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
