// Rendering of computed metrics: display rows, CSV/JSON export and
// markdown previews. Nothing here feeds back into the numbers.
use crate::compare::{Delta, DeltaKind, Metric, MetricComparison, MetricTrend};
use crate::error::Result;
use crate::reports::{ChannelShare, Dashboard, HistoryPoint, PropertySummary, RankedUnit, UnitDetail};
use crate::tier::{Tier, TierShare};
use crate::types::{
    ChannelShareRow, ComparisonRow, HistoryRow, PropertyRankingRow, TierDistributionRow, TrendRow,
    UnitDetailRow, UnitRankingRow,
};
use crate::util::{
    format_money, format_number, format_opt, format_opt_money, format_opt_pct, UNDEFINED,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

/// Display colors for known booking channels.
pub fn channel_color(channel: &str) -> Option<&'static str> {
    match channel {
        "Airbnb" => Some("#FF00CC"),
        "Booking.com" => Some("#0217FF"),
        "Direct" => Some("#02812C"),
        "Direct_Partner" => Some("#00CC7E"),
        "Site" => Some("#FF0000"),
        "Expedia" => Some("#EEFF00"),
        _ => None,
    }
}

pub fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::Tier5 => "#1A9850",
        Tier::Tier4 => "#91CF60",
        Tier::Tier3 => "#FEE08B",
        Tier::Tier2 => "#FC8D59",
        Tier::Tier1 => "#D73027",
        Tier::NoTarget => "#BDBDBD",
    }
}

fn format_metric(metric: Metric, value: Option<f64>) -> String {
    match metric {
        Metric::Reservations => format_opt(value, 0),
        Metric::Occupancy => format_opt_pct(value, 1),
        Metric::MeanTier => format_opt(value, 2),
        _ => format_opt_money(value),
    }
}

pub fn format_delta(delta: &Delta, kind: DeltaKind) -> String {
    match kind {
        DeltaKind::Relative => delta
            .percent
            .map(|p| format!("{:+.1}%", p))
            .unwrap_or_else(|| UNDEFINED.to_string()),
        DeltaKind::Points => delta
            .absolute
            .map(|a| format!("{:+.1} pts", a))
            .unwrap_or_else(|| UNDEFINED.to_string()),
    }
}

fn month_label(point: &HistoryPoint) -> String {
    point.period.format("%m-%Y")
}

pub fn unit_detail_rows(details: &[UnitDetail]) -> Vec<UnitDetailRow> {
    details
        .iter()
        .map(|d| UnitDetailRow {
            property_id: d.property_id,
            property: d.property_name.clone(),
            unit: d.unit_name.clone(),
            reservations: d.totals.reservations,
            total_revenue: format_money(d.totals.gross_revenue_sum),
            daily_revenue: format_money(d.ratios.daily_revenue),
            cleaning_revenue: format_money(d.totals.cleaning_revenue_sum),
            occupancy: format_opt_pct(Some(d.ratios.occupancy_pct), 1),
            adr: format_opt_money(d.ratios.adr),
            revpar: format_opt_money(d.ratios.revpar),
            attainment: format_opt_pct(d.assessment.attainment.map(|a| a * 100.0), 1),
            tier: d.assessment.tier.to_string(),
        })
        .collect()
}

pub fn unit_ranking_rows(ranking: &[RankedUnit]) -> Vec<UnitRankingRow> {
    ranking
        .iter()
        .map(|r| UnitRankingRow {
            rank: r.rank,
            property: r.unit.property_name.clone(),
            unit: r.unit.unit_name.clone(),
            total_revenue: format_money(r.unit.totals.gross_revenue_sum),
            daily_revenue: format_money(r.unit.ratios.daily_revenue),
            occupancy: format_opt_pct(Some(r.unit.ratios.occupancy_pct), 1),
            adr: format_opt_money(r.unit.ratios.adr),
            revpar: format_opt_money(r.unit.ratios.revpar),
        })
        .collect()
}

pub fn property_ranking_rows(ranking: &[PropertySummary]) -> Vec<PropertyRankingRow> {
    ranking
        .iter()
        .map(|p| PropertyRankingRow {
            rank: p.rank,
            property: p.property_name.clone(),
            total_revenue: format_money(p.totals.gross_revenue_sum),
            daily_revenue: format_money(p.ratios.daily_revenue),
            occupancy: format_opt_pct(Some(p.ratios.occupancy_pct), 1),
            mean_unit_occupancy: format_opt_pct(p.mean_unit_occupancy, 1),
            mean_adr: format_opt_money(p.mean_adr),
            mean_revpar: format_opt_money(p.mean_revpar),
        })
        .collect()
}

pub fn channel_share_rows(shares: &[ChannelShare]) -> Vec<ChannelShareRow> {
    shares
        .iter()
        .map(|s| ChannelShareRow {
            channel: s.channel.clone(),
            revenue: format_money(s.revenue),
            share: format_opt_pct(s.share_pct, 1),
            color: channel_color(&s.channel).unwrap_or(UNDEFINED).to_string(),
        })
        .collect()
}

pub fn tier_distribution_rows(shares: &[TierShare]) -> Vec<TierDistributionRow> {
    shares
        .iter()
        .map(|s| TierDistributionRow {
            tier: s.tier.to_string(),
            units: s.count,
            share: format_opt_pct(s.share_pct, 1),
            color: tier_color(s.tier).to_string(),
        })
        .collect()
}

pub fn comparison_rows(comparisons: &[MetricComparison]) -> Vec<ComparisonRow> {
    comparisons
        .iter()
        .map(|c| ComparisonRow {
            metric: c.metric.label().to_string(),
            current: format_metric(c.metric, c.comparison.current),
            baseline: format_metric(c.metric, c.comparison.baseline),
            change: format_delta(&c.comparison.delta, c.comparison.kind),
        })
        .collect()
}

pub fn trend_rows(trends: &[MetricTrend]) -> Vec<TrendRow> {
    trends
        .iter()
        .flat_map(|t| {
            t.points.iter().map(move |p| TrendRow {
                metric: t.metric.label().to_string(),
                month: p.period.format("%m-%Y"),
                value: format_metric(t.metric, p.value),
                change: format_delta(&p.delta, t.metric.kind()),
            })
        })
        .collect()
}

pub fn history_rows(points: &[HistoryPoint]) -> Vec<HistoryRow> {
    points
        .iter()
        .map(|p| HistoryRow {
            month: month_label(p),
            nights: p.totals.nights_sum,
            total_revenue: format_money(p.totals.gross_revenue_sum),
            occupancy: format_opt_pct(Some(p.ratios.occupancy_pct), 1),
            adr: format_opt_money(p.ratios.adr),
            revpar: format_opt_money(p.ratios.revpar),
        })
        .collect()
}

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

fn export<T: Serialize>(dir: &Path, name: &str, rows: &[T], written: &mut Vec<PathBuf>) -> Result<()> {
    let path = dir.join(name);
    write_csv(&path, rows)?;
    written.push(path);
    Ok(())
}

/// Export every table of the dashboard plus a JSON dump into `dir`.
/// Returns the written paths.
pub fn write_dashboard(dir: &Path, dashboard: &Dashboard) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    export(dir, "unit_detail.csv", &unit_detail_rows(&dashboard.unit_detail), &mut written)?;
    export(dir, "unit_ranking.csv", &unit_ranking_rows(&dashboard.unit_ranking), &mut written)?;
    export(
        dir,
        "property_ranking.csv",
        &property_ranking_rows(&dashboard.property_ranking),
        &mut written,
    )?;
    export(dir, "channel_share.csv", &channel_share_rows(&dashboard.channel_share), &mut written)?;
    export(
        dir,
        "tier_distribution.csv",
        &tier_distribution_rows(&dashboard.tier_distribution),
        &mut written,
    )?;
    export(dir, "month_over_month.csv", &comparison_rows(&dashboard.month_over_month), &mut written)?;
    export(dir, "year_over_year.csv", &comparison_rows(&dashboard.year_over_year), &mut written)?;
    export(dir, "trends.csv", &trend_rows(&dashboard.trends), &mut written)?;
    if let Some(history) = &dashboard.unit_history {
        export(dir, "unit_history.csv", &history_rows(&history.points), &mut written)?;
    }
    if let Some(history) = &dashboard.property_history {
        export(dir, "property_history.csv", &history_rows(history), &mut written)?;
    }
    let json_path = dir.join("dashboard.json");
    write_json(&json_path, dashboard)?;
    written.push(json_path);
    info!(files = written.len(), dir = %dir.display(), "dashboard exported");
    Ok(written)
}

/// Print the KPI block the way the dashboard header shows it.
pub fn print_kpis(dashboard: &Dashboard) {
    let k = &dashboard.kpis;
    if k.is_empty {
        println!("No reservations match the selected filters for {}.\n", k.period);
        return;
    }
    println!("Month: {}", k.period.format("%m-%Y"));
    println!("Reservations:     {}", k.reservations);
    println!("Occupancy:        {}%", format_number(k.occupancy_pct, 1));
    println!("Total revenue:    {}", format_money(k.total_revenue));
    println!("Daily revenue:    {}", format_money(k.daily_revenue));
    println!("Cleaning revenue: {}", format_money(k.cleaning_revenue));
    println!("ADR:              {}", format_opt_money(k.adr));
    println!("RevPAR:           {}", format_opt_money(k.revpar));
    println!("Mean tier:        {}", format_opt(k.mean_tier, 2));
    println!("Mean attainment:  {}", format_opt_pct(k.mean_attainment_pct, 1));
    if let Some(costs) = k.costs {
        println!("Admin fee:        {}", format_money(costs.admin_fee));
    }
    println!();
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
