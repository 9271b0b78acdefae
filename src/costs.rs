use crate::error::{ProfitError, Result};
use crate::orders::ProductAggregate;
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-entered unit costs (HPP per unit), keyed by product name.
///
/// The sheet is owned by the caller and survives between runs; the pipeline
/// only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UnitCostSheet {
    costs: BTreeMap<String, f64>,
}

/// A single edit to the unit cost sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CostEdit {
    /// Set the unit cost of one product. Negative values are stored as 0.
    Set { product: String, unit_cost: f64 },
    /// Forget the unit cost of one product, so it falls back to 0.
    Clear { product: String },
}

impl UnitCostSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, product: &str) -> f64 {
        self.costs.get(product).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, product: &str) -> bool {
        self.costs.contains_key(product)
    }

    pub fn set(&mut self, product: impl Into<String>, unit_cost: f64) -> Result<()> {
        let product = product.into();
        if !unit_cost.is_finite() {
            return Err(ProfitError::InvalidUnitCost {
                product,
                value: unit_cost,
            });
        }

        let clamped = if unit_cost < 0.0 {
            warn!(
                "Unit cost {} for '{}' is negative, storing 0",
                unit_cost, product
            );
            0.0
        } else {
            unit_cost
        };

        self.costs.insert(product, clamped);
        Ok(())
    }

    pub fn apply(&mut self, edits: &[CostEdit]) -> Result<()> {
        for edit in edits {
            match edit {
                CostEdit::Set { product, unit_cost } => self.set(product.clone(), *unit_cost)?,
                CostEdit::Clear { product } => {
                    self.costs.remove(product);
                }
            }
        }
        Ok(())
    }

    /// Adds a zero-cost row for every product not yet on the sheet. Existing
    /// entries, including ones for products absent from this upload, are kept.
    pub fn seed_from(&mut self, aggregates: &[ProductAggregate]) {
        for aggregate in aggregates {
            self.costs.entry(aggregate.product.clone()).or_insert(0.0);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.costs.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAllocation {
    pub aggregates: Vec<ProductAggregate>,
    pub hpp_total: f64,
}

impl CostAllocation {
    /// Recomputes a single product after its unit cost changed. Other products
    /// are left untouched. Returns `false` if the product is not present.
    pub fn update_product(&mut self, product: &str, unit_cost: f64) -> bool {
        let Some(aggregate) = self.aggregates.iter_mut().find(|a| a.product == product) else {
            return false;
        };
        aggregate.recompute(unit_cost);
        self.hpp_total = self.aggregates.iter().map(|a| a.total_cost).sum();
        true
    }
}

/// Applies the sheet's unit costs to each product. Products without an entry
/// cost nothing.
pub fn allocate_costs(aggregates: &[ProductAggregate], sheet: &UnitCostSheet) -> CostAllocation {
    let aggregates: Vec<ProductAggregate> = aggregates
        .iter()
        .map(|aggregate| {
            let mut allocated = aggregate.clone();
            allocated.recompute(sheet.get(&aggregate.product));
            allocated
        })
        .collect();

    let hpp_total: f64 = aggregates.iter().map(|a| a.total_cost).sum();
    let missing = aggregates
        .iter()
        .filter(|a| !sheet.contains(&a.product))
        .count();

    debug!(
        "Allocated HPP {} across {} products ({} without a unit cost)",
        hpp_total,
        aggregates.len(),
        missing
    );

    CostAllocation {
        aggregates,
        hpp_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregates() -> Vec<ProductAggregate> {
        vec![
            ProductAggregate::new("A", 2, 80_000.0),
            ProductAggregate::new("B", 5, 100_000.0),
        ]
    }

    #[test]
    fn test_missing_costs_default_to_zero() {
        let allocation = allocate_costs(&aggregates(), &UnitCostSheet::new());
        assert_eq!(allocation.hpp_total, 0.0);
        assert_eq!(allocation.aggregates[1].profit, 100_000.0);
    }

    #[test]
    fn test_total_cost_and_profit() {
        let mut sheet = UnitCostSheet::new();
        sheet.set("A", 10_000.0).unwrap();
        sheet.set("B", 25_000.0).unwrap();

        let allocation = allocate_costs(&aggregates(), &sheet);
        assert_eq!(allocation.aggregates[0].total_cost, 20_000.0);
        assert_eq!(allocation.aggregates[0].profit, 60_000.0);
        assert_eq!(allocation.aggregates[1].total_cost, 125_000.0);
        assert_eq!(allocation.aggregates[1].profit, -25_000.0);
        assert!(allocation.aggregates[1].is_loss());
        assert_eq!(allocation.hpp_total, 145_000.0);
    }

    #[test]
    fn test_editing_one_product_leaves_others_alone() {
        let mut sheet = UnitCostSheet::new();
        sheet.set("A", 10_000.0).unwrap();
        sheet.set("B", 15_000.0).unwrap();
        let first = allocate_costs(&aggregates(), &sheet);

        sheet
            .apply(&[CostEdit::Set {
                product: "A".to_string(),
                unit_cost: 12_000.0,
            }])
            .unwrap();
        let second = allocate_costs(&aggregates(), &sheet);
        let third = allocate_costs(&aggregates(), &sheet);

        assert_eq!(first.aggregates[1], second.aggregates[1]);
        assert_eq!(second, third);
        assert_eq!(second.aggregates[0].total_cost, 24_000.0);
        assert_eq!(second.hpp_total, 24_000.0 + 75_000.0);
    }

    #[test]
    fn test_update_product_in_place() {
        let mut allocation = allocate_costs(&aggregates(), &UnitCostSheet::new());
        let b_before = allocation.aggregates[1].clone();

        assert!(allocation.update_product("A", 30_000.0));
        assert!(!allocation.update_product("Z", 1.0));

        assert_eq!(allocation.aggregates[0].total_cost, 60_000.0);
        assert_eq!(allocation.aggregates[1], b_before);
        assert_eq!(allocation.hpp_total, 60_000.0);
    }

    #[test]
    fn test_sheet_clamps_and_rejects() {
        let mut sheet = UnitCostSheet::new();
        sheet.set("A", -500.0).unwrap();
        assert_eq!(sheet.get("A"), 0.0);
        assert!(matches!(
            sheet.set("B", f64::NAN),
            Err(ProfitError::InvalidUnitCost { .. })
        ));
        assert!(!sheet.contains("B"));
    }

    #[test]
    fn test_seed_keeps_existing_entries() {
        let mut sheet = UnitCostSheet::new();
        sheet.set("A", 7_000.0).unwrap();
        sheet.set("Old", 1_000.0).unwrap();
        sheet.seed_from(&aggregates());

        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.get("A"), 7_000.0);
        assert!(sheet.contains("B"));
        assert_eq!(sheet.get("B"), 0.0);
    }

    #[test]
    fn test_clear_edit() {
        let mut sheet = UnitCostSheet::new();
        sheet.set("A", 7_000.0).unwrap();
        sheet
            .apply(&[CostEdit::Clear {
                product: "A".to_string(),
            }])
            .unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_sheet_serializes_as_plain_map() {
        let mut sheet = UnitCostSheet::new();
        sheet.set("Kaos", 35_000.0).unwrap();
        let json = serde_json::to_string(&sheet).unwrap();
        assert_eq!(json, r#"{"Kaos":35000.0}"#);

        let edit: CostEdit =
            serde_json::from_str(r#"{"action":"set","product":"Kaos","unit_cost":40000}"#).unwrap();
        assert_eq!(
            edit,
            CostEdit::Set {
                product: "Kaos".to_string(),
                unit_cost: 40_000.0
            }
        );
    }
}
