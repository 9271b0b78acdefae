use crate::ads::{compute_roas, AdSpendEvaluation, RoasStatus};
use crate::cashflow::Cashflow;
use crate::error::{ProfitError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Top-line figures of one pipeline run. Values are kept unrounded; rounding
/// happens only when they are presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricsSummary {
    #[schemars(description = "Accrual revenue from completed orders")]
    pub omzet: f64,
    #[schemars(description = "Cost of goods sold over completed orders")]
    pub hpp_total: f64,
    #[schemars(description = "omzet - hpp_total")]
    pub profit_kotor: f64,
    pub biaya_iklan: f64,
    #[schemars(description = "profit_kotor - biaya_iklan")]
    pub profit_bersih: f64,
    #[schemars(description = "omzet / biaya_iklan, or 0 without ad spend")]
    pub roas: f64,
    pub roas_status: RoasStatus,
    pub dana_cair: f64,
    pub dana_belum_cair: f64,
}

impl MetricsSummary {
    /// The seven currency figures shown on the dashboard and in the export,
    /// in display order.
    pub fn headline_figures(&self) -> [(&'static str, f64); 7] {
        [
            ("Omzet", self.omzet),
            ("HPP", self.hpp_total),
            ("Profit Kotor", self.profit_kotor),
            ("Biaya Iklan", self.biaya_iklan),
            ("Profit Bersih", self.profit_bersih),
            ("Dana Cair", self.dana_cair),
            ("Dana Belum Cair", self.dana_belum_cair),
        ]
    }
}

pub fn aggregate_metrics(
    omzet: f64,
    hpp_total: f64,
    ads: &AdSpendEvaluation,
    cashflow: &Cashflow,
) -> MetricsSummary {
    let profit_kotor = omzet - hpp_total;

    MetricsSummary {
        omzet,
        hpp_total,
        profit_kotor,
        biaya_iklan: ads.biaya_iklan,
        profit_bersih: profit_kotor - ads.biaya_iklan,
        roas: ads.roas,
        roas_status: ads.roas_status,
        dana_cair: cashflow.dana_cair,
        dana_belum_cair: cashflow.dana_belum_cair,
    }
}

/// Checks the derived fields against their formulas.
pub fn verify_metrics(summary: &MetricsSummary, tolerance: f64) -> Result<()> {
    let expected_kotor = summary.omzet - summary.hpp_total;
    let expected_bersih = expected_kotor - summary.biaya_iklan;
    let expected_roas = compute_roas(summary.omzet, summary.biaya_iklan);

    let checks = [
        ("profit_kotor", expected_kotor, summary.profit_kotor),
        ("profit_bersih", expected_bersih, summary.profit_bersih),
        ("roas", expected_roas, summary.roas),
    ];

    for (field, expected, actual) in checks {
        if (expected - actual).abs() > tolerance {
            return Err(ProfitError::MetricsInvariantViolation {
                field: field.to_string(),
                expected,
                actual,
            });
        }
    }

    if summary.biaya_iklan <= 0.0 && summary.roas_status != RoasStatus::Undefined {
        return Err(ProfitError::MetricsInvariantViolation {
            field: "roas_status".to_string(),
            expected: 0.0,
            actual: summary.roas,
        });
    }

    Ok(())
}
