//! Performance tiers from revenue-target attainment.
//!
//! Boundaries are closed below and open above, checked from the top:
//! `>= 1.15` Tier 5, `>= 1.00` Tier 4, `>= 0.85` Tier 3, `>= 0.50` Tier 2,
//! anything lower Tier 1. Units without a positive target are `NoTarget`.

use crate::types::{UnitKey, UnitTarget};
use crate::util::mean_defined;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    Tier5,
    Tier4,
    Tier3,
    Tier2,
    Tier1,
    NoTarget,
}

impl Tier {
    /// Display order for distribution tables.
    pub const DISPLAY_ORDER: [Tier; 6] = [
        Tier::Tier5,
        Tier::Tier4,
        Tier::Tier3,
        Tier::Tier2,
        Tier::Tier1,
        Tier::NoTarget,
    ];

    /// Numeric level, `None` for `NoTarget`.
    pub fn level(self) -> Option<u8> {
        match self {
            Tier::Tier5 => Some(5),
            Tier::Tier4 => Some(4),
            Tier::Tier3 => Some(3),
            Tier::Tier2 => Some(2),
            Tier::Tier1 => Some(1),
            Tier::NoTarget => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level() {
            Some(level) => write!(f, "Tier {}", level),
            None => write!(f, "No target"),
        }
    }
}

pub fn classify(attainment: f64) -> Tier {
    if !attainment.is_finite() {
        Tier::NoTarget
    } else if attainment >= 1.15 {
        Tier::Tier5
    } else if attainment >= 1.0 {
        Tier::Tier4
    } else if attainment >= 0.85 {
        Tier::Tier3
    } else if attainment >= 0.5 {
        Tier::Tier2
    } else {
        Tier::Tier1
    }
}

/// Actual daily revenue over the target; only defined for a positive target.
pub fn attainment(daily_revenue: f64, expected_revenue: Option<f64>) -> Option<f64> {
    match expected_revenue {
        Some(expected) if expected > 0.0 && expected.is_finite() => Some(daily_revenue / expected),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierAssessment {
    pub attainment: Option<f64>,
    pub tier: Tier,
}

impl TierAssessment {
    pub fn new(daily_revenue: f64, expected_revenue: Option<f64>) -> Self {
        match attainment(daily_revenue, expected_revenue) {
            Some(a) => Self {
                attainment: Some(a),
                tier: classify(a),
            },
            None => Self {
                attainment: None,
                tier: Tier::NoTarget,
            },
        }
    }
}

/// Monthly daily-revenue targets keyed by unit.
#[derive(Debug, Clone, Default)]
pub struct TargetTable {
    targets: HashMap<UnitKey, f64>,
}

impl TargetTable {
    /// The first row wins when a unit is listed twice.
    pub fn new(rows: &[UnitTarget]) -> Self {
        let mut targets = HashMap::new();
        for row in rows {
            targets
                .entry(row.unit_key.clone())
                .or_insert(row.expected_revenue);
        }
        Self { targets }
    }

    /// The unit's target when it is present and positive.
    pub fn expected(&self, key: &UnitKey) -> Option<f64> {
        self.targets
            .get(key)
            .copied()
            .filter(|v| *v > 0.0 && v.is_finite())
    }

    pub fn assess(&self, key: &UnitKey, daily_revenue: f64) -> TierAssessment {
        TierAssessment::new(daily_revenue, self.expected(key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierShare {
    pub tier: Tier,
    pub count: usize,
    pub share_pct: Option<f64>,
}

/// Count of units per tier in display order; `NoTarget` is its own bucket.
pub fn distribution(tiers: &[Tier]) -> Vec<TierShare> {
    let total = tiers.len();
    Tier::DISPLAY_ORDER
        .iter()
        .map(|tier| {
            let count = tiers.iter().filter(|t| *t == tier).count();
            TierShare {
                tier: *tier,
                count,
                share_pct: (total > 0).then(|| count as f64 / total as f64 * 100.0),
            }
        })
        .collect()
}

/// Mean tier level, leaving out `NoTarget`.
pub fn mean_tier(assessments: &[TierAssessment]) -> Option<f64> {
    mean_defined(
        assessments
            .iter()
            .map(|a| a.tier.level().map(f64::from)),
    )
}

/// Mean attainment in percent, leaving out `NoTarget`.
pub fn mean_attainment_pct(assessments: &[TierAssessment]) -> Option<f64> {
    mean_defined(assessments.iter().map(|a| a.attainment)).map(|a| a * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries() {
        assert_eq!(classify(1.20), Tier::Tier5);
        assert_eq!(classify(1.15), Tier::Tier5);
        assert_eq!(classify(1.149), Tier::Tier4);
        assert_eq!(classify(1.00), Tier::Tier4);
        assert_eq!(classify(0.99), Tier::Tier3);
        assert_eq!(classify(0.85), Tier::Tier3);
        assert_eq!(classify(0.84), Tier::Tier2);
        assert_eq!(classify(0.50), Tier::Tier2);
        assert_eq!(classify(0.49), Tier::Tier1);
        assert_eq!(classify(0.0), Tier::Tier1);
        assert_eq!(classify(-0.3), Tier::Tier1);
        assert_eq!(classify(f64::NAN), Tier::NoTarget);
    }

    #[test]
    fn missing_or_non_positive_target_is_no_target() {
        assert_eq!(TierAssessment::new(900.0, None).tier, Tier::NoTarget);
        assert_eq!(TierAssessment::new(900.0, Some(0.0)).tier, Tier::NoTarget);
        assert_eq!(TierAssessment::new(900.0, Some(-10.0)).tier, Tier::NoTarget);
        let a = TierAssessment::new(900.0, Some(1000.0));
        assert_eq!(a.tier, Tier::Tier3);
        assert_eq!(a.attainment, Some(0.9));
    }

    #[test]
    fn target_table_lookup() {
        let key = UnitKey::new("Sol", "101");
        let table = TargetTable::new(&[
            UnitTarget {
                unit_key: key.clone(),
                property_name: "Sol".into(),
                unit_name: "101".into(),
                expected_revenue: 2000.0,
            },
            UnitTarget {
                unit_key: key.clone(),
                property_name: "Sol".into(),
                unit_name: "101".into(),
                expected_revenue: 1.0,
            },
            UnitTarget {
                unit_key: UnitKey::new("Sol", "102"),
                property_name: "Sol".into(),
                unit_name: "102".into(),
                expected_revenue: 0.0,
            },
        ]);
        assert_eq!(table.expected(&key), Some(2000.0));
        assert_eq!(table.expected(&UnitKey::new("Sol", "102")), None);
        assert_eq!(table.expected(&UnitKey::new("Mar", "1")), None);
        assert_eq!(table.assess(&key, 2400.0).tier, Tier::Tier5);
    }

    #[test]
    fn distribution_uses_fixed_order() {
        let d = distribution(&[Tier::Tier1, Tier::NoTarget, Tier::Tier5, Tier::Tier1]);
        let order: Vec<Tier> = d.iter().map(|s| s.tier).collect();
        assert_eq!(order, Tier::DISPLAY_ORDER.to_vec());
        assert_eq!(d[0].count, 1);
        assert_eq!(d[4].count, 2);
        assert_eq!(d[4].share_pct, Some(50.0));
        assert_eq!(d[5].count, 1);
        assert!(distribution(&[]).iter().all(|s| s.share_pct.is_none()));
    }

    #[test]
    fn means_skip_no_target() {
        let a = [
            TierAssessment::new(1200.0, Some(1000.0)),
            TierAssessment::new(400.0, Some(1000.0)),
            TierAssessment::new(999.0, None),
        ];
        assert_eq!(mean_tier(&a), Some(3.0));
        assert!((mean_attainment_pct(&a).unwrap() - 80.0).abs() < 1e-9);
        assert_eq!(mean_tier(&a[2..]), None);
    }
}
