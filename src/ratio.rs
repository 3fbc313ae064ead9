//! Occupancy, ADR and RevPAR from aggregated sums.
//!
//! Two zero policies coexist here and must not be merged: occupancy with no
//! active units is `0`, while ADR with no nights is undefined (`None`), and
//! RevPAR inherits that undefined state.

use crate::aggregate::Aggregate;
use crate::period::Period;
use crate::util::mean_defined;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Ratios {
    pub occupancy_pct: f64,
    pub daily_revenue: f64,
    pub adr: Option<f64>,
    pub revpar: Option<f64>,
}

/// Nights sold over nights available (`active_units * days`), in percent.
pub fn occupancy_pct(nights: i64, active_units: usize, days_in_month: u32) -> f64 {
    let available = active_units as f64 * days_in_month as f64;
    if available <= 0.0 {
        0.0
    } else {
        nights as f64 / available * 100.0
    }
}

pub fn adr(daily_revenue: f64, nights: i64) -> Option<f64> {
    if nights == 0 {
        None
    } else {
        Some(daily_revenue / nights as f64)
    }
}

pub fn revpar(adr: Option<f64>, occupancy_pct: f64) -> Option<f64> {
    adr.map(|a| a * (occupancy_pct / 100.0))
}

/// Ratios for one aggregated group within `period`. Occupancy is exact over
/// the group's unit-months, not an average of per-unit figures.
pub fn compute(agg: &Aggregate, period: &Period) -> Ratios {
    let occupancy_pct = occupancy_pct(agg.nights_sum, agg.active_units, period.days_in_month());
    let daily_revenue = agg.daily_revenue();
    let adr = adr(daily_revenue, agg.nights_sum);
    Ratios {
        occupancy_pct,
        daily_revenue,
        adr,
        revpar: revpar(adr, occupancy_pct),
    }
}

/// Simple mean of per-unit occupancies, used by ranking roll-ups.
pub fn mean_occupancy<'a, I>(units: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Ratios>,
{
    mean_defined(units.into_iter().map(|r| Some(r.occupancy_pct)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(nights: i64, gross: f64, cleaning: f64, units: usize) -> Aggregate {
        Aggregate {
            reservations: 1,
            nights_sum: nights,
            gross_revenue_sum: gross,
            cleaning_revenue_sum: cleaning,
            active_units: units,
        }
    }

    #[test]
    fn full_month_single_unit() {
        let r = compute(&agg(30, 3000.0, 300.0, 1), &Period::resolve("2024-06").unwrap());
        assert_eq!(r.occupancy_pct, 100.0);
        assert_eq!(r.daily_revenue, 2700.0);
        assert_eq!(r.adr, Some(90.0));
        assert_eq!(r.revpar, Some(90.0));
    }

    #[test]
    fn no_units_means_zero_occupancy() {
        assert_eq!(occupancy_pct(12, 0, 31), 0.0);
        let r = compute(&Aggregate::default(), &Period::resolve("2024-01").unwrap());
        assert_eq!(r.occupancy_pct, 0.0);
    }

    #[test]
    fn no_nights_means_undefined_adr() {
        let r = compute(&agg(0, 500.0, 100.0, 2), &Period::resolve("2024-01").unwrap());
        assert_eq!(r.adr, None);
        assert_eq!(r.revpar, None);
        assert_eq!(r.occupancy_pct, 0.0);
    }

    #[test]
    fn property_occupancy_is_exact() {
        // two units in a 31-day month, 31 + 0 nights
        let r = compute(&agg(31, 3100.0, 0.0, 2), &Period::resolve("2024-01").unwrap());
        assert!((r.occupancy_pct - 50.0).abs() < 1e-9);
        assert_eq!(r.adr, Some(100.0));
        assert_eq!(r.revpar, Some(50.0));
    }

    #[test]
    fn mean_of_unit_occupancies() {
        let units = [
            Ratios { occupancy_pct: 100.0, ..Default::default() },
            Ratios { occupancy_pct: 20.0, ..Default::default() },
        ];
        assert_eq!(mean_occupancy(&units), Some(60.0));
        let none: [Ratios; 0] = [];
        assert_eq!(mean_occupancy(&none), None);
    }
}
