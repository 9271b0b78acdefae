use serde::{Deserialize, Serialize};
use std::fmt;

/// Which uploaded export a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Orders,
    Income,
    Ads,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::Orders => "Orders",
            SourceKind::Income => "Income",
            SourceKind::Ads => "Ads",
        };
        f.write_str(label)
    }
}

/// A single cell as it arrived from the export. Spreadsheets give us real
/// numbers, delimited text only ever gives us text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text used for identifiers (product names, statuses). Whole numbers drop
    /// their fractional part so a numeric SKU of `1001` stays `"1001"`.
    pub fn as_label(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{:.0}", n),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Column-ordered view of one uploaded export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    headers: Vec<String>,
    columns: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Builds a table from a header row and row-major data. Short rows are
    /// padded with empty cells and cells beyond the header width are dropped.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let mut columns: Vec<Vec<CellValue>> = vec![Vec::with_capacity(rows.len()); width];

        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.push(cells.next().unwrap_or(CellValue::Empty));
            }
        }

        Self { headers, columns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_at(&self, index: usize) -> Option<&[CellValue]> {
        self.columns.get(index).map(|c| c.as_slice())
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| self.column_at(idx))
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    /// A table with no header or no data rows carries nothing to reconcile.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.row_count() == 0
    }
}
