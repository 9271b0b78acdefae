use crate::columns::ColumnSpec;
use crate::error::Result;
use crate::normalize::{NormalizationMode, Normalizer, DEFAULT_CURRENCY_MARKER};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoasThresholds {
    #[schemars(description = "ROAS at or above this value is healthy")]
    pub healthy: f64,

    #[schemars(
        description = "ROAS at or above this value (and below healthy) needs review; anything lower is a loss"
    )]
    pub break_even: f64,
}

impl Default for RoasThresholds {
    fn default() -> Self {
        Self {
            healthy: 3.0,
            break_even: 1.0,
        }
    }
}

/// Everything the pipeline needs to know about the shape of the exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    #[schemars(description = "Column holding the order status in the orders export")]
    pub order_status: ColumnSpec,

    #[schemars(description = "Column holding the order payment amount in the orders export")]
    pub order_amount: ColumnSpec,

    #[schemars(description = "Column holding the product name in the orders export")]
    pub order_product: ColumnSpec,

    #[schemars(description = "Column holding the spend in the ads export")]
    pub ad_cost: ColumnSpec,

    #[schemars(description = "Column holding disbursed funds in the income export")]
    pub settled: ColumnSpec,

    #[schemars(description = "Column holding funds not yet disbursed in the income export")]
    pub pending: ColumnSpec,

    #[schemars(
        description = "Order statuses (case-insensitive, trimmed) that count as completed. Every other status is excluded from revenue and cost."
    )]
    pub completed_statuses: Vec<String>,

    #[schemars(description = "How unparseable amounts are treated")]
    pub normalization: NormalizationMode,

    #[schemars(description = "Currency marker stripped from amounts before parsing")]
    pub currency_marker: String,

    pub roas_thresholds: RoasThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            order_status: ColumnSpec::new("status", &["status"]),
            order_amount: ColumnSpec::new("amount", &["total pembayaran", "amount", "revenue"]),
            order_product: ColumnSpec::new("product", &["nama produk", "product name", "product"]),
            ad_cost: ColumnSpec::new("ad cost", &["biaya", "cost", "spend"]),
            settled: ColumnSpec::new("settled", &["cair", "settled", "released"]),
            pending: ColumnSpec::new("pending", &["belum", "pending", "hold"]),
            completed_statuses: vec!["selesai".to_string(), "completed".to_string()],
            normalization: NormalizationMode::Lenient,
            currency_marker: DEFAULT_CURRENCY_MARKER.to_string(),
            roas_thresholds: RoasThresholds::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn with_normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization = mode;
        self
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.currency_marker.clone(), self.normalization)
    }

    pub fn is_completed_status(&self, status: &str) -> bool {
        let status = status.trim().to_lowercase();
        self.completed_statuses
            .iter()
            .any(|s| s.trim().to_lowercase() == status)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PipelineConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema_json = PipelineConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("completed_statuses"));
        assert!(schema_json.contains("roas_thresholds"));
        assert!(schema_json.contains("keywords"));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "completed_statuses": ["Delivered"], "normalization": "strict" }"#,
        )
        .unwrap();

        assert!(config.is_completed_status("  delivered "));
        assert!(!config.is_completed_status("selesai"));
        assert_eq!(config.normalization, NormalizationMode::Strict);
        assert_eq!(config.ad_cost, PipelineConfig::default().ad_cost);
        assert_eq!(config.roas_thresholds.healthy, 3.0);
    }

    #[test]
    fn test_default_completed_vocabulary() {
        let config = PipelineConfig::default();
        assert!(config.is_completed_status("Selesai"));
        assert!(config.is_completed_status("COMPLETED"));
        assert!(!config.is_completed_status("Dibatalkan"));
        assert!(!config.is_completed_status(""));
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored = PipelineConfig::from_json_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
