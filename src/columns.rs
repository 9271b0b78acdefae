use crate::table::RawTable;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Finds the leftmost column whose header contains any of the keywords,
/// ignoring case. Columns are scanned in table order and keyword order only
/// matters within a single column, so an earlier column always wins.
pub fn resolve_column<H, K>(headers: &[H], keywords: &[K]) -> Option<usize>
where
    H: AsRef<str>,
    K: AsRef<str>,
{
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    headers.iter().position(|header| {
        let header = header.as_ref().to_lowercase();
        keywords.iter().any(|k| header.contains(k.as_str()))
    })
}

/// A canonical field and the header fragments that identify it in an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSpec {
    #[schemars(description = "Canonical name of the field, used in logs and errors")]
    pub field: String,

    #[schemars(
        description = "Case-insensitive header fragments. The leftmost column containing any of them is used."
    )]
    pub keywords: Vec<String>,
}

impl ColumnSpec {
    pub fn new(field: &str, keywords: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn resolve(&self, table: &RawTable) -> Option<usize> {
        let found = resolve_column(table.headers(), &self.keywords);
        match found {
            Some(idx) => debug!(
                "Resolved '{}' to column '{}'",
                self.field,
                table.headers()[idx]
            ),
            None => debug!(
                "No column for '{}' among {:?} (keywords {:?})",
                self.field,
                table.headers(),
                self.keywords
            ),
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leftmost_column_wins() {
        let headers = ["Total Produk", "Biaya Iklan"];
        assert_eq!(resolve_column(&headers, &["biaya", "total"]), Some(0));
    }

    #[test]
    fn test_case_insensitive_substring() {
        let headers = ["No. Pesanan", "STATUS PESANAN", "Total Pembayaran"];
        assert_eq!(resolve_column(&headers, &["status"]), Some(1));
        assert_eq!(resolve_column(&headers, &["Pembayaran"]), Some(2));
    }

    #[test]
    fn test_no_match() {
        let headers = ["Tanggal", "Catatan"];
        assert_eq!(resolve_column(&headers, &["biaya", "cost", "spend"]), None);
        assert_eq!(resolve_column::<&str, &str>(&[], &["biaya"]), None);
    }

    #[test]
    fn test_blank_keywords_never_match() {
        let headers = ["Tanggal"];
        assert_eq!(resolve_column(&headers, &["", "  "]), None);
    }

    #[test]
    fn test_spec_resolves_against_table() {
        let table = RawTable::new(
            vec!["Dana Belum Cair".to_string(), "Dana Cair".to_string()],
            vec![],
        );
        let pending = ColumnSpec::new("pending", &["belum", "pending", "hold"]);
        assert_eq!(pending.resolve(&table), Some(0));
    }
}
