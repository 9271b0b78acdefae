//! # Marketplace Profit
//!
//! A library for turning raw marketplace exports (orders, income, ads) into
//! accrual profitability and cashflow figures.
//!
//! ## Core Concepts
//!
//! - **Accrual revenue (omzet)**: revenue recognised when an order completes, regardless of payout
//! - **HPP**: cost of goods sold, user-supplied unit cost × completed order count, per product
//! - **ROAS**: omzet ÷ ad spend, classified as healthy, needs-review, loss or undefined
//! - **Cashflow**: disbursed vs. pending funds reported by the income export
//! - **Loose schemas**: columns are found by keyword, not by exact header
//!
//! ## Example
//!
//! ```rust,ignore
//! use marketplace_profit::*;
//!
//! let sources = ReportSources::from_paths("Order.all.xlsx", Some("Income.xlsx"), None::<&str>)?;
//!
//! let mut costs = UnitCostSheet::new();
//! costs.set("Kaos Polos Hitam", 35_000.0)?;
//!
//! let report = ProfitPipeline::default().run(&sources, &costs)?;
//! println!("{}", render_summary_document(&report));
//! ```

pub mod ads;
pub mod cashflow;
pub mod columns;
pub mod costs;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod metrics;
pub mod normalize;
pub mod orders;
pub mod schema;
pub mod table;
pub mod utils;

pub use ads::{compute_roas, evaluate_ads, AdSpendEvaluation, RoasStatus};
pub use cashflow::{extract_cashflow, Cashflow};
pub use columns::{resolve_column, ColumnSpec};
pub use costs::{allocate_costs, CostAllocation, CostEdit, UnitCostSheet};
pub use error::{OrderField, ProfitError, Result};
pub use export::{
    product_rows, render_product_table, render_summary_document, write_summary_document,
    ProductRow,
};
pub use ingestion::{load_table, load_table_from_bytes, EmptyReason, LoadOutcome};
pub use metrics::{aggregate_metrics, verify_metrics, MetricsSummary};
pub use normalize::{normalize, NormalizationMode, Normalizer};
pub use orders::{reconcile_orders, OrderReconciliation, ProductAggregate};
pub use schema::{PipelineConfig, RoasThresholds};
pub use table::{CellValue, RawTable, SourceKind};
pub use utils::*;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The uploads for one run. Only the orders export is required.
#[derive(Debug, Clone, Default)]
pub struct ReportSources {
    pub orders: RawTable,
    pub income: Option<RawTable>,
    pub ads: Option<RawTable>,
}

impl ReportSources {
    pub fn new(orders: RawTable) -> Self {
        Self {
            orders,
            income: None,
            ads: None,
        }
    }

    pub fn with_income(mut self, income: RawTable) -> Self {
        self.income = Some(income);
        self
    }

    pub fn with_ads(mut self, ads: RawTable) -> Self {
        self.ads = Some(ads);
        self
    }

    /// Loads the uploads from disk. An unreadable or empty orders file is an
    /// error; unreadable optional files are treated as not uploaded.
    pub fn from_paths(
        orders: impl AsRef<Path>,
        income: Option<impl AsRef<Path>>,
        ads: Option<impl AsRef<Path>>,
    ) -> Result<Self> {
        Ok(Self {
            orders: load_table(orders).into_required(SourceKind::Orders)?,
            income: income.and_then(|p| load_table(p).into_optional(SourceKind::Income)),
            ads: ads.and_then(|p| load_table(p).into_optional(SourceKind::Ads)),
        })
    }
}

/// Everything the report renderer needs from one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitReport {
    pub summary: MetricsSummary,
    pub products: Vec<ProductRow>,
    pub valid_orders: usize,
    pub excluded_orders: usize,
    /// Whether the cashflow figures came from an actual income export.
    pub income_provided: bool,
    pub generated_at: DateTime<Utc>,
}

impl ProfitReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the whole reconciliation. Holds no state between runs: the same
/// sources and cost sheet always give the same figures.
#[derive(Debug, Clone, Default)]
pub struct ProfitPipeline {
    config: PipelineConfig,
}

impl ProfitPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Completed orders grouped per product, before any cost is applied.
    /// Useful for seeding the cost sheet with one row per product.
    pub fn reconcile(&self, sources: &ReportSources) -> Result<OrderReconciliation> {
        if sources.orders.is_empty() {
            return Err(ProfitError::MissingSource(SourceKind::Orders));
        }
        reconcile_orders(&sources.orders, &self.config)
    }

    pub fn run(&self, sources: &ReportSources, costs: &UnitCostSheet) -> Result<ProfitReport> {
        info!(
            "Building profit report (income: {}, ads: {})",
            sources.income.is_some(),
            sources.ads.is_some()
        );

        let reconciliation = self.reconcile(sources)?;
        let allocation = allocate_costs(&reconciliation.aggregates, costs);
        let ads = evaluate_ads(sources.ads.as_ref(), reconciliation.omzet, &self.config)?;
        let cashflow = extract_cashflow(sources.income.as_ref(), &self.config)?;

        let summary = aggregate_metrics(reconciliation.omzet, allocation.hpp_total, &ads, &cashflow);

        debug!("Metrics summary: {:?}", summary);
        info!(
            "Profit bersih {} on omzet {} ({} products)",
            summary.profit_bersih,
            summary.omzet,
            allocation.aggregates.len()
        );

        Ok(ProfitReport {
            summary,
            products: product_rows(&allocation.aggregates),
            valid_orders: reconciliation.valid_orders,
            excluded_orders: reconciliation.excluded_orders,
            income_provided: cashflow.income_provided,
            generated_at: Utc::now(),
        })
    }

    pub fn run_with_verification(
        &self,
        sources: &ReportSources,
        costs: &UnitCostSheet,
        tolerance: f64,
    ) -> Result<ProfitReport> {
        let report = self.run(sources, costs)?;
        verify_metrics(&report.summary, tolerance)?;
        Ok(report)
    }
}

pub fn build_profit_report(sources: &ReportSources, costs: &UnitCostSheet) -> Result<ProfitReport> {
    ProfitPipeline::default().run(sources, costs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| CellValue::text(*c)).collect())
                .collect(),
        )
    }

    fn sample_orders() -> RawTable {
        table(
            &["Status Pesanan", "Total Pembayaran", "Nama Produk"],
            &[
                &["Selesai", "Rp 50.000", "A"],
                &["Selesai", "Rp 30.000", "A"],
                &["Batal", "Rp 10.000", "A"],
            ],
        )
    }

    #[test]
    fn test_end_to_end_processing() {
        let sources = ReportSources::new(sample_orders())
            .with_ads(table(&["Biaya Iklan"], &[&["Rp 40.000"]]));

        let mut costs = UnitCostSheet::new();
        costs.set("A", 10_000.0).unwrap();

        let report = ProfitPipeline::default()
            .run_with_verification(&sources, &costs, 0.0)
            .unwrap();

        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].order_count, 2);
        assert_eq!(report.summary.omzet, 80_000.0);
        assert_eq!(report.summary.hpp_total, 20_000.0);
        assert_eq!(report.summary.profit_kotor, 60_000.0);
        assert_eq!(report.summary.profit_bersih, 20_000.0);
        assert_eq!(report.summary.roas, 2.0);
        assert_eq!(report.summary.roas_status, RoasStatus::NeedsReview);
        assert_eq!(report.excluded_orders, 1);
        assert!(!report.income_provided);
    }

    #[test]
    fn test_empty_orders_are_rejected() {
        let sources = ReportSources::default();
        let result = build_profit_report(&sources, &UnitCostSheet::new());
        assert!(matches!(
            result,
            Err(ProfitError::MissingSource(SourceKind::Orders))
        ));
    }

    #[test]
    fn test_missing_column_halts_before_optional_sources() {
        let sources = ReportSources::new(table(&["Status", "Nama Produk"], &[&["Selesai", "A"]]))
            .with_ads(table(&["Biaya"], &[&["Rp 1.000"]]));
        let err = build_profit_report(&sources, &UnitCostSheet::new()).unwrap_err();
        assert!(matches!(
            err,
            ProfitError::MissingColumn {
                field: OrderField::Amount,
                ..
            }
        ));
    }

    #[test]
    fn test_reruns_do_not_accumulate() {
        let sources = ReportSources::new(sample_orders());
        let costs = UnitCostSheet::new();
        let pipeline = ProfitPipeline::default();

        let first = pipeline.run(&sources, &costs).unwrap();
        let second = pipeline.run(&sources, &costs).unwrap();
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.products, second.products);
    }

    #[test]
    fn test_report_json() {
        let report = build_profit_report(&ReportSources::new(sample_orders()), &UnitCostSheet::new())
            .unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"profit_bersih\""));
        assert!(json.contains("\"roas_status\": \"undefined\""));
    }
}
