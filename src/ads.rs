use crate::error::Result;
use crate::schema::{PipelineConfig, RoasThresholds};
use crate::table::RawTable;
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RoasStatus {
    Healthy,
    NeedsReview,
    Loss,
    /// No ad spend to measure against.
    Undefined,
}

impl RoasStatus {
    /// Classifies a ROAS figure. Without positive spend there is nothing to
    /// classify, whatever the ratio says.
    pub fn classify(ad_spend: f64, roas: f64, thresholds: &RoasThresholds) -> Self {
        if ad_spend <= 0.0 {
            RoasStatus::Undefined
        } else if roas >= thresholds.healthy {
            RoasStatus::Healthy
        } else if roas >= thresholds.break_even {
            RoasStatus::NeedsReview
        } else {
            RoasStatus::Loss
        }
    }

    /// Presentation label for the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            RoasStatus::Healthy => "Sehat",
            RoasStatus::NeedsReview => "Perlu Evaluasi",
            RoasStatus::Loss => "Rugi",
            RoasStatus::Undefined => "Tidak Ada Iklan",
        }
    }
}

impl fmt::Display for RoasStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            RoasStatus::Healthy => "healthy",
            RoasStatus::NeedsReview => "needs-review",
            RoasStatus::Loss => "loss",
            RoasStatus::Undefined => "undefined",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdSpendEvaluation {
    pub biaya_iklan: f64,
    pub roas: f64,
    pub roas_status: RoasStatus,
    /// Header of the column the spend was read from, if any.
    pub cost_column: Option<String>,
}

/// `omzet / ad_spend`, or 0 when there is no positive spend.
pub fn compute_roas(omzet: f64, ad_spend: f64) -> f64 {
    if ad_spend > 0.0 {
        omzet / ad_spend
    } else {
        0.0
    }
}

pub fn evaluate_ads(
    ads: Option<&RawTable>,
    omzet: f64,
    config: &PipelineConfig,
) -> Result<AdSpendEvaluation> {
    let (biaya_iklan, cost_column) = match ads.filter(|t| !t.is_empty()) {
        None => {
            debug!("No ads export, ad spend is 0");
            (0.0, None)
        }
        Some(table) => match config.ad_cost.resolve(table) {
            None => (0.0, None),
            Some(idx) => {
                let header = table.headers()[idx].clone();
                let cells = table.column_at(idx).unwrap_or_default();
                let total = config.normalizer().sum_column(&header, cells)?;
                (total, Some(header))
            }
        },
    };

    let roas = compute_roas(omzet, biaya_iklan);
    let roas_status = RoasStatus::classify(biaya_iklan, roas, &config.roas_thresholds);

    info!(
        "Ad spend {} against omzet {}: ROAS {:.2} ({})",
        biaya_iklan, omzet, roas, roas_status
    );

    Ok(AdSpendEvaluation {
        biaya_iklan,
        roas,
        roas_status,
        cost_column,
    })
}
