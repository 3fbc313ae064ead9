//! Period-over-period deltas: month-over-month, year-over-year and short
//! trend series.
//!
//! Money and count metrics change in relative percent. Occupancy and tier
//! change in points (percentage points, tier levels). An undefined side
//! gives an undefined delta, never `0` or infinity.

use crate::period::Period;
use crate::reports::KpiSummary;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeltaKind {
    Relative,
    Points,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Delta {
    pub absolute: Option<f64>,
    pub percent: Option<f64>,
}

fn defined(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

pub fn delta(current: Option<f64>, baseline: Option<f64>, kind: DeltaKind) -> Delta {
    let (current, baseline) = (defined(current), defined(baseline));
    let absolute = match (current, baseline) {
        (Some(c), Some(b)) => Some(c - b),
        _ => None,
    };
    let percent = match (kind, current, baseline) {
        (DeltaKind::Relative, Some(c), Some(b)) if b != 0.0 => Some((c / b - 1.0) * 100.0),
        _ => None,
    };
    Delta { absolute, percent }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub current: Option<f64>,
    pub baseline: Option<f64>,
    pub kind: DeltaKind,
    pub delta: Delta,
}

impl Comparison {
    pub fn between(current: Option<f64>, baseline: Option<f64>, kind: DeltaKind) -> Self {
        Self {
            current,
            baseline,
            kind,
            delta: delta(current, baseline, kind),
        }
    }
}

/// Evaluate `metric_fn` at both periods and compare.
pub fn compare<F>(metric_fn: F, current: Period, baseline: Period, kind: DeltaKind) -> Comparison
where
    F: Fn(Period) -> Option<f64>,
{
    Comparison::between(metric_fn(current), metric_fn(baseline), kind)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: Period,
    pub value: Option<f64>,
    /// Change against the month before this point.
    pub delta: Delta,
}

/// `len` consecutive months ending at `end`, oldest first.
pub fn trend<F>(metric_fn: F, end: Period, len: usize, kind: DeltaKind) -> Vec<TrendPoint>
where
    F: Fn(Period) -> Option<f64>,
{
    let mut previous = metric_fn(end.add(-(len as i32)));
    end.window(len)
        .into_iter()
        .map(|period| {
            let value = metric_fn(period);
            let point = TrendPoint {
                period,
                value,
                delta: delta(value, previous, kind),
            };
            previous = value;
            point
        })
        .collect()
}

/// Headline figures tracked across periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    Reservations,
    TotalRevenue,
    DailyRevenue,
    CleaningRevenue,
    Occupancy,
    Adr,
    RevPar,
    MeanTier,
    AdminFee,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Reservations,
        Metric::TotalRevenue,
        Metric::DailyRevenue,
        Metric::CleaningRevenue,
        Metric::Occupancy,
        Metric::Adr,
        Metric::RevPar,
        Metric::MeanTier,
        Metric::AdminFee,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Reservations => "Reservations",
            Metric::TotalRevenue => "Total revenue",
            Metric::DailyRevenue => "Daily revenue",
            Metric::CleaningRevenue => "Cleaning revenue",
            Metric::Occupancy => "Occupancy (%)",
            Metric::Adr => "ADR",
            Metric::RevPar => "RevPAR",
            Metric::MeanTier => "Mean tier",
            Metric::AdminFee => "Admin fee",
        }
    }

    pub fn kind(self) -> DeltaKind {
        match self {
            Metric::Occupancy | Metric::MeanTier => DeltaKind::Points,
            _ => DeltaKind::Relative,
        }
    }

    pub fn is_money(self) -> bool {
        matches!(
            self,
            Metric::TotalRevenue
                | Metric::DailyRevenue
                | Metric::CleaningRevenue
                | Metric::Adr
                | Metric::RevPar
                | Metric::AdminFee
        )
    }

    /// The metric's value in a KPI summary. Sums of an empty month are zero;
    /// ratios and means follow their own undefined rules.
    pub fn of(self, k: &KpiSummary) -> Option<f64> {
        match self {
            Metric::Reservations => Some(k.reservations as f64),
            Metric::TotalRevenue => Some(k.total_revenue),
            Metric::DailyRevenue => Some(k.daily_revenue),
            Metric::CleaningRevenue => Some(k.cleaning_revenue),
            Metric::Occupancy => Some(k.occupancy_pct),
            Metric::Adr => k.adr,
            Metric::RevPar => k.revpar,
            Metric::MeanTier => k.mean_tier,
            Metric::AdminFee => k.costs.map(|c| c.admin_fee),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub metric: Metric,
    pub comparison: Comparison,
}

/// One comparison per metric between two KPI summaries.
pub fn compare_kpis(current: &KpiSummary, baseline: &KpiSummary) -> Vec<MetricComparison> {
    Metric::ALL
        .iter()
        .map(|m| MetricComparison {
            metric: *m,
            comparison: Comparison::between(m.of(current), m.of(baseline), m.kind()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTrend {
    pub metric: Metric,
    pub points: Vec<TrendPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn zero_baseline_leaves_percent_undefined() {
        let d = delta(Some(500.0), Some(0.0), DeltaKind::Relative);
        assert_eq!(d.percent, None);
        assert_eq!(d.absolute, Some(500.0));
    }

    #[test]
    fn relative_and_point_changes() {
        let d = delta(Some(150.0), Some(100.0), DeltaKind::Relative);
        assert_eq!(d.percent, Some(50.0));
        assert_eq!(d.absolute, Some(50.0));

        let d = delta(Some(72.0), Some(60.0), DeltaKind::Points);
        assert_eq!(d.absolute, Some(12.0));
        assert_eq!(d.percent, None);
    }

    #[test]
    fn undefined_sides_propagate() {
        assert_eq!(delta(None, Some(10.0), DeltaKind::Relative), Delta::default());
        assert_eq!(delta(Some(10.0), None, DeltaKind::Relative), Delta::default());
        assert_eq!(delta(Some(f64::NAN), Some(10.0), DeltaKind::Relative), Delta::default());
        assert_eq!(delta(Some(1.0), Some(f64::NAN), DeltaKind::Points), Delta::default());
    }

    #[test]
    fn compare_shifts_through_metric_fn() {
        let values: HashMap<Period, f64> = [
            (Period::resolve("2024-03").unwrap(), 120.0),
            (Period::resolve("2024-02").unwrap(), 100.0),
            (Period::resolve("2023-03").unwrap(), 80.0),
        ]
        .into_iter()
        .collect();
        let f = |p: Period| values.get(&p).copied();
        let now = Period::resolve("2024-03").unwrap();

        let mom = compare(f, now, now.previous(), DeltaKind::Relative);
        assert!((mom.delta.percent.unwrap() - 20.0).abs() < 1e-9);

        let yoy = compare(f, now, now.same_month_last_year(), DeltaKind::Relative);
        assert!((yoy.delta.percent.unwrap() - 50.0).abs() < 1e-9);

        let missing = compare(f, now, now.add(-5), DeltaKind::Relative);
        assert_eq!(missing.delta.percent, None);
    }

    #[test]
    fn trend_walks_consecutive_months() {
        let end = Period::resolve("2024-02").unwrap();
        let f = |p: Period| Some(p.month() as f64 * 10.0);
        let points = trend(f, end, 3, DeltaKind::Points);
        let labels: Vec<String> = points.iter().map(|p| p.period.to_string()).collect();
        assert_eq!(labels, vec!["2023-12", "2024-01", "2024-02"]);
        assert_eq!(points[0].value, Some(120.0));
        assert_eq!(points[0].delta.absolute, Some(10.0));
        assert_eq!(points[1].delta.absolute, Some(-110.0));
        assert_eq!(points[2].delta.absolute, Some(10.0));
    }

    #[test]
    fn metric_kinds() {
        assert_eq!(Metric::Occupancy.kind(), DeltaKind::Points);
        assert_eq!(Metric::MeanTier.kind(), DeltaKind::Points);
        assert_eq!(Metric::Adr.kind(), DeltaKind::Relative);
        assert_eq!(Metric::AdminFee.kind(), DeltaKind::Relative);
    }
}
