use crate::aggregate::{aggregate, totals, Aggregate, Dimension};
use crate::compare::{compare_kpis, trend, Metric, MetricComparison, MetricTrend};
use crate::cost::{cost_totals, CostFigures, CostIndex};
use crate::filter::FilterCriteria;
use crate::period::Period;
use crate::ratio::{self, Ratios};
use crate::tier::{self, TargetTable, TierAssessment, TierShare};
use crate::types::{ReservationRecord, Snapshot, UnitKey};
use crate::util::{mean_defined, normalize_name};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Headline figures for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub period: Period,
    /// No reservation rows matched the selection.
    pub is_empty: bool,
    pub reservations: usize,
    pub nights: i64,
    pub occupancy_pct: f64,
    pub total_revenue: f64,
    pub daily_revenue: f64,
    pub cleaning_revenue: f64,
    pub adr: Option<f64>,
    pub revpar: Option<f64>,
    pub mean_tier: Option<f64>,
    pub mean_attainment_pct: Option<f64>,
    pub costs: Option<CostFigures>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDetail {
    pub property_id: i64,
    pub property_name: String,
    pub unit_name: String,
    #[serde(skip)]
    pub unit_key: UnitKey,
    pub totals: Aggregate,
    pub ratios: Ratios,
    pub assessment: TierAssessment,
    pub costs: Option<CostFigures>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedUnit {
    pub rank: usize,
    pub unit: UnitDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySummary {
    pub rank: usize,
    pub property_id: i64,
    pub property_name: String,
    pub totals: Aggregate,
    /// Exact occupancy over the property's unit-months.
    pub ratios: Ratios,
    /// Plain mean of the units' own occupancies.
    pub mean_unit_occupancy: Option<f64>,
    pub mean_adr: Option<f64>,
    pub mean_revpar: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelShare {
    pub channel: String,
    pub revenue: f64,
    /// Undefined when the selection has no revenue at all.
    pub share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub period: Period,
    pub totals: Aggregate,
    pub ratios: Ratios,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitHistory {
    pub property_name: String,
    pub unit_name: String,
    pub points: Vec<HistoryPoint>,
    /// Tier at the selected month.
    pub assessment: TierAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub filter: FilterCriteria,
    pub kpis: KpiSummary,
    pub unit_detail: Vec<UnitDetail>,
    pub unit_ranking: Vec<RankedUnit>,
    pub property_ranking: Vec<PropertySummary>,
    pub channel_share: Vec<ChannelShare>,
    pub tier_distribution: Vec<TierShare>,
    pub month_over_month: Vec<MetricComparison>,
    pub year_over_year: Vec<MetricComparison>,
    pub trends: Vec<MetricTrend>,
    pub unit_history: Option<UnitHistory>,
    pub property_history: Option<Vec<HistoryPoint>>,
}

/// Reference tables indexed once per snapshot, shared by every computation
/// over that snapshot.
pub struct ReportContext<'a> {
    snapshot: &'a Snapshot,
    targets: TargetTable,
    costs: CostIndex,
}

impl<'a> ReportContext<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            targets: TargetTable::new(&snapshot.targets),
            costs: CostIndex::new(&snapshot.cost_history),
        }
    }

    pub fn rows(&self, filter: &FilterCriteria) -> Vec<&'a ReservationRecord> {
        filter.apply(&self.snapshot.reservations)
    }

    /// One row per unit, ordered by property id then unit name.
    pub fn unit_details(&self, filter: &FilterCriteria) -> Vec<UnitDetail> {
        let rows = self.rows(filter);
        let mut details: Vec<UnitDetail> = aggregate(rows, &[Dimension::Unit])
            .into_iter()
            .map(|row| {
                let unit_key = UnitKey::new(&row.property_name, &row.unit_name);
                let ratios = ratio::compute(&row.totals, &filter.period);
                UnitDetail {
                    property_id: row.property_id,
                    assessment: self.targets.assess(&unit_key, ratios.daily_revenue),
                    costs: self.costs.lookup(&unit_key, filter.period),
                    property_name: row.property_name,
                    unit_name: row.unit_name,
                    unit_key,
                    totals: row.totals,
                    ratios,
                }
            })
            .collect();
        details.sort_by(|a, b| {
            a.property_id
                .cmp(&b.property_id)
                .then_with(|| a.unit_name.cmp(&b.unit_name))
        });
        details
    }

    pub fn kpis(&self, filter: &FilterCriteria) -> KpiSummary {
        let rows = self.rows(filter);
        let agg = totals(rows.iter().copied());
        let ratios = ratio::compute(&agg, &filter.period);
        let assessments: Vec<TierAssessment> = self
            .unit_details(filter)
            .iter()
            .map(|u| u.assessment)
            .collect();
        let cost_rows = filter.apply_costs(&self.snapshot.cost_history);
        KpiSummary {
            period: filter.period,
            is_empty: rows.is_empty(),
            reservations: agg.reservations,
            nights: agg.nights_sum,
            occupancy_pct: ratios.occupancy_pct,
            total_revenue: agg.gross_revenue_sum,
            daily_revenue: ratios.daily_revenue,
            cleaning_revenue: agg.cleaning_revenue_sum,
            adr: ratios.adr,
            revpar: ratios.revpar,
            mean_tier: tier::mean_tier(&assessments),
            mean_attainment_pct: tier::mean_attainment_pct(&assessments),
            costs: cost_totals(&cost_rows),
        }
    }

    /// Full dashboard for `filter`, with trends over `trend_len` months.
    pub fn dashboard(&self, filter: &FilterCriteria, trend_len: usize) -> Dashboard {
        let period = filter.period;
        let mut needed: Vec<Period> = period.add(-(trend_len as i32)).window(trend_len + 1);
        needed.push(period.previous());
        needed.push(period.same_month_last_year());

        let mut by_period: HashMap<Period, KpiSummary> = HashMap::new();
        for p in needed.into_iter().chain(std::iter::once(period)) {
            by_period
                .entry(p)
                .or_insert_with(|| self.kpis(&filter.with_period(p)));
        }
        let kpis_at = |p: Period| by_period.get(&p).cloned().unwrap_or_else(|| self.kpis(&filter.with_period(p)));

        let kpis = kpis_at(period);
        let month_over_month = compare_kpis(&kpis, &kpis_at(period.previous()));
        let year_over_year = compare_kpis(&kpis, &kpis_at(period.same_month_last_year()));
        let trends = Metric::ALL
            .iter()
            .map(|m| MetricTrend {
                metric: *m,
                points: trend(
                    |p| by_period.get(&p).and_then(|k| m.of(k)),
                    period,
                    trend_len,
                    m.kind(),
                ),
            })
            .collect();

        let rows = self.rows(filter);
        let unit_detail = self.unit_details(filter);
        let tiers: Vec<_> = unit_detail.iter().map(|u| u.assessment.tier).collect();

        debug!(
            period = %period,
            rows = rows.len(),
            units = unit_detail.len(),
            "computed dashboard"
        );

        let unit_history = self.unit_history_from(filter, &unit_detail);
        let property_history = filter
            .property
            .as_deref()
            .map(|property| property_history(&self.snapshot.reservations, property));

        Dashboard {
            filter: filter.clone(),
            kpis,
            unit_ranking: unit_ranking(&unit_detail),
            property_ranking: property_ranking(&rows, &unit_detail, period),
            channel_share: channel_share(&rows),
            tier_distribution: tier::distribution(&tiers),
            unit_detail,
            month_over_month,
            year_over_year,
            trends,
            unit_history,
            property_history,
        }
    }

    /// Month-by-month figures for the unit named by `filter`, across the
    /// whole snapshot regardless of month, partner or channels. The tier is
    /// the one the unit holds under the full selection. `None` unless both a
    /// property and a unit are selected.
    pub fn unit_history(&self, filter: &FilterCriteria) -> Option<UnitHistory> {
        self.unit_history_from(filter, &self.unit_details(filter))
    }

    fn unit_history_from(&self, filter: &FilterCriteria, details: &[UnitDetail]) -> Option<UnitHistory> {
        let key = UnitKey::new(filter.property.as_deref()?, filter.unit.as_deref()?);
        let points = history_points(
            self.snapshot
                .reservations
                .iter()
                .filter(|r| r.unit_key == key),
        );
        let (property_name, unit_name, assessment) = match details.iter().find(|d| d.unit_key == key) {
            Some(d) => (d.property_name.clone(), d.unit_name.clone(), d.assessment),
            None => (
                normalize_name(filter.property.as_deref().unwrap_or_default()),
                normalize_name(filter.unit.as_deref().unwrap_or_default()),
                self.targets.assess(&key, 0.0),
            ),
        };
        Some(UnitHistory {
            property_name,
            unit_name,
            points,
            assessment,
        })
    }
}

fn history_points<'a, I>(rows: I) -> Vec<HistoryPoint>
where
    I: IntoIterator<Item = &'a ReservationRecord>,
{
    aggregate(rows, &[Dimension::Period])
        .into_iter()
        .filter_map(|row| {
            let period = row.key.period?;
            Some(HistoryPoint {
                period,
                ratios: ratio::compute(&row.totals, &period),
                totals: row.totals,
            })
        })
        .collect()
}

/// Month-by-month figures for one property; occupancy is over the units
/// active in each month.
pub fn property_history(rows: &[ReservationRecord], property: &str) -> Vec<HistoryPoint> {
    let wanted = UnitKey::part(property);
    history_points(rows.iter().filter(|r| r.unit_key.property == wanted))
}

fn by_revenue_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Units by total revenue, highest first, ranked from 1.
pub fn unit_ranking(details: &[UnitDetail]) -> Vec<RankedUnit> {
    let mut sorted: Vec<UnitDetail> = details.to_vec();
    sorted.sort_by(|a, b| by_revenue_desc(a.totals.gross_revenue_sum, b.totals.gross_revenue_sum));
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, unit)| RankedUnit { rank: idx + 1, unit })
        .collect()
}

/// Properties by total revenue, highest first. Carries both the exact
/// occupancy and the mean of unit occupancies.
pub fn property_ranking(
    rows: &[&ReservationRecord],
    details: &[UnitDetail],
    period: Period,
) -> Vec<PropertySummary> {
    let mut units_by_property: BTreeMap<&str, Vec<&UnitDetail>> = BTreeMap::new();
    for d in details {
        units_by_property
            .entry(d.unit_key.property.as_str())
            .or_default()
            .push(d);
    }

    let mut summaries: Vec<PropertySummary> = aggregate(rows.iter().copied(), &[Dimension::Property])
        .into_iter()
        .map(|row| {
            let units = row
                .key
                .property
                .as_deref()
                .and_then(|p| units_by_property.get(p))
                .cloned()
                .unwrap_or_default();
            PropertySummary {
                rank: 0,
                property_id: row.property_id,
                ratios: ratio::compute(&row.totals, &period),
                mean_unit_occupancy: ratio::mean_occupancy(units.iter().map(|u| &u.ratios)),
                mean_adr: mean_defined(units.iter().map(|u| u.ratios.adr)),
                mean_revpar: mean_defined(units.iter().map(|u| u.ratios.revpar)),
                property_name: row.property_name,
                totals: row.totals,
            }
        })
        .collect();

    summaries.sort_by(|a, b| by_revenue_desc(a.totals.gross_revenue_sum, b.totals.gross_revenue_sum));
    for (idx, s) in summaries.iter_mut().enumerate() {
        s.rank = idx + 1;
    }
    summaries
}

/// Revenue and share per channel, highest revenue first.
pub fn channel_share(rows: &[&ReservationRecord]) -> Vec<ChannelShare> {
    let grouped = aggregate(rows.iter().copied(), &[Dimension::Channel]);
    let total: f64 = grouped.iter().map(|g| g.totals.gross_revenue_sum).sum();
    let mut shares: Vec<ChannelShare> = grouped
        .into_iter()
        .map(|g| ChannelShare {
            channel: g.key.channel.unwrap_or_default(),
            revenue: g.totals.gross_revenue_sum,
            share_pct: (total != 0.0).then(|| g.totals.gross_revenue_sum / total * 100.0),
        })
        .collect();
    shares.sort_by(|a, b| by_revenue_desc(a.revenue, b.revenue));
    shares
}
