use crate::columns::ColumnSpec;
use crate::error::Result;
use crate::schema::PipelineConfig;
use crate::table::RawTable;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Disbursed and not-yet-disbursed funds from the income export. The two
/// figures are read independently and need not add up to anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cashflow {
    pub dana_cair: f64,
    pub dana_belum_cair: f64,
    /// False when no usable income export was supplied.
    pub income_provided: bool,
}

fn sum_resolved(table: &RawTable, spec: &ColumnSpec, config: &PipelineConfig) -> Result<f64> {
    match spec.resolve(table) {
        Some(idx) => {
            let header = &table.headers()[idx];
            config
                .normalizer()
                .sum_column(header, table.column_at(idx).unwrap_or_default())
        }
        None => Ok(0.0),
    }
}

pub fn extract_cashflow(income: Option<&RawTable>, config: &PipelineConfig) -> Result<Cashflow> {
    let Some(table) = income.filter(|t| !t.is_empty()) else {
        debug!("No income export, cashflow is 0");
        return Ok(Cashflow::default());
    };

    let cashflow = Cashflow {
        dana_cair: sum_resolved(table, &config.settled, config)?,
        dana_belum_cair: sum_resolved(table, &config.pending, config)?,
        income_provided: true,
    };

    info!(
        "Cashflow: {} settled, {} pending",
        cashflow.dana_cair, cashflow.dana_belum_cair
    );

    Ok(cashflow)
}
