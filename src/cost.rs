//! Per-unit monthly cost history: cleaning, administration fee and revenue
//! net of channel commission.

use crate::period::Period;
use crate::types::{UnitCostHistory, UnitKey};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostFigures {
    pub cleaning_revenue: f64,
    pub admin_fee: f64,
    pub net_of_commission: f64,
}

impl CostFigures {
    fn add(&mut self, row: &UnitCostHistory) {
        self.cleaning_revenue += row.cleaning_revenue;
        self.admin_fee += row.admin_fee;
        self.net_of_commission += row.net_of_commission;
    }
}

/// Sum of the given rows, or `None` when there are none, so a missing
/// history shows as undefined rather than as zero cost.
pub fn cost_totals(rows: &[&UnitCostHistory]) -> Option<CostFigures> {
    if rows.is_empty() {
        return None;
    }
    let mut totals = CostFigures::default();
    for row in rows {
        totals.add(row);
    }
    Some(totals)
}

/// Lookup of cost figures by unit and month. Repeated rows for the same
/// unit-month are summed.
#[derive(Debug, Clone, Default)]
pub struct CostIndex {
    by_unit_month: HashMap<(UnitKey, Period), CostFigures>,
}

impl CostIndex {
    pub fn new(rows: &[UnitCostHistory]) -> Self {
        let mut by_unit_month: HashMap<(UnitKey, Period), CostFigures> = HashMap::new();
        for row in rows {
            by_unit_month
                .entry((row.unit_key.clone(), row.period))
                .or_default()
                .add(row);
        }
        Self { by_unit_month }
    }

    pub fn lookup(&self, key: &UnitKey, period: Period) -> Option<CostFigures> {
        self.by_unit_month.get(&(key.clone(), period)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(unit: &str, month: &str, admin: f64) -> UnitCostHistory {
        UnitCostHistory {
            unit_key: UnitKey::new("Sol", unit),
            property_name: "Sol".into(),
            unit_name: unit.into(),
            period: Period::resolve(month).unwrap(),
            cleaning_revenue: 50.0,
            admin_fee: admin,
            net_of_commission: 800.0,
            partnership: Some("Alpha".into()),
        }
    }

    #[test]
    fn totals_are_undefined_without_rows() {
        assert_eq!(cost_totals(&[]), None);
        let a = row("101", "2024-05", 120.0);
        let b = row("102", "2024-05", 80.0);
        let t = cost_totals(&[&a, &b]).unwrap();
        assert_eq!(t.admin_fee, 200.0);
        assert_eq!(t.cleaning_revenue, 100.0);
        assert_eq!(t.net_of_commission, 1600.0);
    }

    #[test]
    fn index_sums_duplicates_and_misses_cleanly() {
        let rows = vec![
            row("101", "2024-05", 120.0),
            row("101", "2024-05", 30.0),
            row("101", "2024-06", 10.0),
        ];
        let index = CostIndex::new(&rows);
        let may = Period::resolve("2024-05").unwrap();
        let key = UnitKey::new("Sol", "101");
        assert_eq!(index.lookup(&key, may).unwrap().admin_fee, 150.0);
        assert_eq!(index.lookup(&UnitKey::new("Sol", "999"), may), None);
        assert_eq!(index.lookup(&key, may.add(-1)), None);
    }
}
