use crate::error::{ProfitError, Result};
use crate::table::CellValue;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY_MARKER: &str = "Rp";

const NULL_TOKENS: [&str; 4] = ["", "nan", "none", "null"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Unparseable values count as zero so a dirty export never blocks the report.
    #[default]
    Lenient,
    /// Unparseable values are reported as errors.
    Strict,
}

/// Turns currency-formatted export cells into plain numbers.
///
/// Both `.` and `,` are treated as thousands separators and removed, so
/// `"Rp 1.234.567"` and `"1,234,567"` both become `1234567.0`. Marketplace
/// exports in rupiah carry no sub-unit fractions, which is what makes this safe;
/// a value such as `"12,50"` is read as `1250`.
#[derive(Debug, Clone)]
pub struct Normalizer {
    currency_marker: String,
    mode: NormalizationMode,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_MARKER, NormalizationMode::Lenient)
    }
}

impl Normalizer {
    pub fn new(currency_marker: impl Into<String>, mode: NormalizationMode) -> Self {
        Self {
            currency_marker: currency_marker.into(),
            mode,
        }
    }

    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }

    /// Returns `None` when the residual text is not a number.
    pub fn normalize_text(&self, raw: &str) -> Option<f64> {
        let stripped = if self.currency_marker.is_empty() {
            raw.to_string()
        } else {
            raw.replace(&self.currency_marker, "")
        };

        let cleaned: String = stripped
            .chars()
            .filter(|c| *c != '.' && *c != ',' && !c.is_whitespace())
            .collect();

        if NULL_TOKENS.contains(&cleaned.to_lowercase().as_str()) {
            return Some(0.0);
        }

        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn normalize_cell(&self, cell: &CellValue) -> Option<f64> {
        match cell {
            CellValue::Number(n) if n.is_nan() => Some(0.0),
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => self.normalize_text(s),
            CellValue::Empty => Some(0.0),
        }
    }

    pub fn normalize_column(&self, column: &str, cells: &[CellValue]) -> Result<Vec<f64>> {
        cells
            .iter()
            .enumerate()
            .map(|(row, cell)| match self.normalize_cell(cell) {
                Some(value) => Ok(value),
                None => match self.mode {
                    NormalizationMode::Lenient => {
                        warn!(
                            "Column '{}' row {}: '{}' is not an amount, counting it as 0",
                            column,
                            row,
                            cell.as_label()
                        );
                        Ok(0.0)
                    }
                    NormalizationMode::Strict => Err(ProfitError::Normalization {
                        column: column.to_string(),
                        row,
                        value: cell.as_label(),
                    }),
                },
            })
            .collect()
    }

    pub fn sum_column(&self, column: &str, cells: &[CellValue]) -> Result<f64> {
        Ok(self.normalize_column(column, cells)?.iter().sum())
    }
}

/// Lenient normalization with the rupiah marker.
pub fn normalize(raw: &str) -> f64 {
    Normalizer::default().normalize_text(raw).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupiah_strings() {
        assert_eq!(normalize("Rp 1.234.567"), 1_234_567.0);
        assert_eq!(normalize("Rp50,000"), 50_000.0);
        assert_eq!(normalize(" 75.000 "), 75_000.0);
        assert_eq!(normalize("-Rp 12.000"), -12_000.0);
    }

    #[test]
    fn test_null_tokens_are_zero() {
        assert_eq!(normalize(""), 0.0);
        assert_eq!(normalize("nan"), 0.0);
        assert_eq!(normalize("None"), 0.0);
        assert_eq!(normalize("NULL"), 0.0);
        assert_eq!(normalize("Rp"), 0.0);
    }

    #[test]
    fn test_separators_are_always_thousands() {
        // Known simplification: a decimal comma is not recognised.
        assert_eq!(normalize("12,50"), 1250.0);
        assert_eq!(normalize("1.5"), 15.0);
    }

    #[test]
    fn test_numbers_pass_through() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize_cell(&CellValue::Number(1234.5)), Some(1234.5));
        assert_eq!(normalizer.normalize_cell(&CellValue::Number(f64::NAN)), Some(0.0));
        assert_eq!(normalizer.normalize_cell(&CellValue::Empty), Some(0.0));
    }

    #[test]
    fn test_lenient_mode_coerces_garbage() {
        let normalizer = Normalizer::default();
        let cells = vec![
            CellValue::text("Rp 10.000"),
            CellValue::text("gratis"),
            CellValue::text("inf"),
        ];
        let values = normalizer.normalize_column("Total", &cells).unwrap();
        assert_eq!(values, vec![10_000.0, 0.0, 0.0]);
    }

    #[test]
    fn test_strict_mode_reports_garbage() {
        let normalizer = Normalizer::new("Rp", NormalizationMode::Strict);
        let cells = vec![CellValue::text("Rp 10.000"), CellValue::text("gratis")];

        match normalizer.normalize_column("Total", &cells) {
            Err(ProfitError::Normalization { column, row, value }) => {
                assert_eq!(column, "Total");
                assert_eq!(row, 1);
                assert_eq!(value, "gratis");
            }
            other => panic!("expected normalization error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_and_lenient_agree_on_clean_input() {
        let cells = vec![
            CellValue::text("Rp 1.000"),
            CellValue::Number(2_000.0),
            CellValue::Empty,
            CellValue::text("nan"),
        ];
        let lenient = Normalizer::default().sum_column("Total", &cells).unwrap();
        let strict = Normalizer::new("Rp", NormalizationMode::Strict)
            .sum_column("Total", &cells)
            .unwrap();
        assert_eq!(lenient, strict);
        assert_eq!(lenient, 3_000.0);
    }
}
