use crate::error::{OrderField, ProfitError, Result};
use crate::schema::PipelineConfig;
use crate::table::{RawTable, SourceKind};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Group key for completed orders that carry no product name.
pub const UNNAMED_PRODUCT: &str = "(tanpa nama produk)";

/// Per-product totals over completed orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductAggregate {
    pub product: String,
    pub order_count: u64,
    pub gross_revenue: f64,
    /// Never negative.
    pub unit_cost: f64,
    /// `unit_cost * order_count`
    pub total_cost: f64,
    /// `gross_revenue - total_cost`
    pub profit: f64,
}

impl ProductAggregate {
    pub fn new(product: impl Into<String>, order_count: u64, gross_revenue: f64) -> Self {
        Self {
            product: product.into(),
            order_count,
            gross_revenue,
            unit_cost: 0.0,
            total_cost: 0.0,
            profit: gross_revenue,
        }
    }

    /// Sets the unit cost (clamped to zero) and refreshes the derived fields.
    pub fn recompute(&mut self, unit_cost: f64) {
        self.unit_cost = unit_cost.max(0.0);
        self.total_cost = self.unit_cost * self.order_count as f64;
        self.profit = self.gross_revenue - self.total_cost;
    }

    pub fn is_loss(&self) -> bool {
        self.profit < 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReconciliation {
    /// In order of first appearance in the export.
    pub aggregates: Vec<ProductAggregate>,
    /// Accrual revenue: the sum of every aggregate's gross revenue.
    pub omzet: f64,
    pub valid_orders: usize,
    pub excluded_orders: usize,
}

fn require_column(table: &RawTable, config: &PipelineConfig, field: OrderField) -> Result<usize> {
    let spec = match field {
        OrderField::Status => &config.order_status,
        OrderField::Amount => &config.order_amount,
        OrderField::Product => &config.order_product,
    };

    spec.resolve(table).ok_or(ProfitError::MissingColumn {
        table: SourceKind::Orders,
        field,
    })
}

/// Keeps only completed orders and totals them per product.
///
/// Orders in any other status (cancelled, returned, unpaid) contribute to
/// neither revenue nor cost, since they will never settle.
pub fn reconcile_orders(table: &RawTable, config: &PipelineConfig) -> Result<OrderReconciliation> {
    let status_idx = require_column(table, config, OrderField::Status)?;
    let amount_idx = require_column(table, config, OrderField::Amount)?;
    let product_idx = require_column(table, config, OrderField::Product)?;

    let headers = table.headers();
    let statuses = table.column_at(status_idx).unwrap_or_default();
    let products = table.column_at(product_idx).unwrap_or_default();
    let amounts = config
        .normalizer()
        .normalize_column(&headers[amount_idx], table.column_at(amount_idx).unwrap_or_default())?;

    let mut aggregates: Vec<ProductAggregate> = Vec::new();
    let mut index_by_product: HashMap<String, usize> = HashMap::new();
    let mut valid_orders = 0;

    for ((status, product), amount) in statuses.iter().zip(products).zip(&amounts) {
        if !config.is_completed_status(&status.as_label()) {
            continue;
        }
        valid_orders += 1;

        let mut key = product.as_label();
        if key.is_empty() {
            key = UNNAMED_PRODUCT.to_string();
        }

        let idx = *index_by_product.entry(key.clone()).or_insert_with(|| {
            aggregates.push(ProductAggregate::new(key, 0, 0.0));
            aggregates.len() - 1
        });

        let aggregate = &mut aggregates[idx];
        aggregate.order_count += 1;
        aggregate.gross_revenue += amount;
        aggregate.profit = aggregate.gross_revenue;
    }

    let omzet: f64 = aggregates.iter().map(|a| a.gross_revenue).sum();
    let excluded_orders = table.row_count() - valid_orders;

    info!(
        "Reconciled {} completed orders across {} products ({} excluded), omzet {}",
        valid_orders,
        aggregates.len(),
        excluded_orders,
        omzet
    );
    debug!(
        "Orders resolved columns: status='{}', amount='{}', product='{}'",
        headers[status_idx], headers[amount_idx], headers[product_idx]
    );

    Ok(OrderReconciliation {
        aggregates,
        omzet,
        valid_orders,
        excluded_orders,
    })
}
