//! Presentation-ready output: the per-product table handed to the dashboard
//! and the plain summary document offered for download.

use crate::error::Result;
use crate::orders::ProductAggregate;
use crate::utils::{format_figure, format_rupiah};
use crate::ProfitReport;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DOCUMENT_TITLE: &str = "Laporan Keuangan Marketplace (Accrual-Based)";

/// One line of the product breakdown, with the loss flag the renderer uses
/// to colour the profit cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product: String,
    pub order_count: u64,
    pub gross_revenue: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub profit: f64,
    pub is_loss: bool,
}

impl From<&ProductAggregate> for ProductRow {
    fn from(aggregate: &ProductAggregate) -> Self {
        Self {
            product: aggregate.product.clone(),
            order_count: aggregate.order_count,
            gross_revenue: aggregate.gross_revenue,
            unit_cost: aggregate.unit_cost,
            total_cost: aggregate.total_cost,
            profit: aggregate.profit,
            is_loss: aggregate.is_loss(),
        }
    }
}

pub fn product_rows(aggregates: &[ProductAggregate]) -> Vec<ProductRow> {
    aggregates.iter().map(ProductRow::from).collect()
}

/// Renders the downloadable summary: a title, the generation time and the
/// seven headline figures as `Label: Rp <amount>` lines.
pub fn render_summary_document(report: &ProfitReport) -> String {
    let mut lines = vec![
        DOCUMENT_TITLE.to_string(),
        format!(
            "Dibuat: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        String::new(),
    ];
    lines.extend(
        report
            .summary
            .headline_figures()
            .into_iter()
            .map(|(label, value)| format_figure(label, value)),
    );

    join_lines(lines)
}

pub fn write_summary_document(report: &ProfitReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_summary_document(report))?;
    info!("Summary document written to {}", path.display());
    Ok(())
}

/// Plain-text product table for terminals and logs.
pub fn render_product_table(rows: &[ProductRow]) -> String {
    let mut lines = vec![format!(
        "{:<30} {:>8} {:>18} {:>14} {:>18} {:>18}",
        "Produk", "Order", "Omzet", "HPP Satuan", "HPP Total", "Profit"
    )];

    for row in rows {
        let marker = if row.is_loss { " (rugi)" } else { "" };
        lines.push(format!(
            "{:<30} {:>8} {:>18} {:>14} {:>18} {:>18}{}",
            row.product,
            row.order_count,
            format_rupiah(row.gross_revenue),
            format_rupiah(row.unit_cost),
            format_rupiah(row.total_cost),
            format_rupiah(row.profit),
            marker
        ));
    }

    join_lines(lines)
}

/// Newline-terminated text, one entry per line.
fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
