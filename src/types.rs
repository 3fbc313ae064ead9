use crate::period::Period;
use crate::util::normalize_name;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

// ---------------------------------------------------------------------------
// Raw sheet rows
// ---------------------------------------------------------------------------

/// One reservation-month row as exported from the reservations sheet.
/// Both the English column names and the sheet's Portuguese names are
/// accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReservationRow {
    #[serde(alias = "id_reserva")]
    pub reservation_id: Option<String>,
    #[serde(alias = "id_propriedade")]
    pub property_id: Option<String>,
    #[serde(alias = "propriedade")]
    pub property_name: Option<String>,
    #[serde(alias = "unidade")]
    pub unit_name: Option<String>,
    #[serde(alias = "canal")]
    pub channel: Option<String>,
    pub partner: Option<String>,
    #[serde(alias = "mes")]
    pub period_month: Option<String>,
    #[serde(alias = "noites_mes")]
    pub nights: Option<String>,
    #[serde(alias = "valor_mes")]
    pub gross_revenue: Option<String>,
    #[serde(alias = "limpeza_mes")]
    pub cleaning_revenue: Option<String>,
}

/// One row of the per-unit revenue target sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTargetRow {
    #[serde(alias = "propriedade")]
    pub property_name: Option<String>,
    #[serde(alias = "unidade")]
    pub unit_name: Option<String>,
    #[serde(alias = "receita_esperada")]
    pub expected_revenue: Option<String>,
}

/// One row of the unit cost-history sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCostRow {
    #[serde(alias = "propriedade")]
    pub property_name: Option<String>,
    #[serde(alias = "unidade")]
    pub unit_name: Option<String>,
    #[serde(alias = "mês", alias = "mes")]
    pub period_month: Option<String>,
    pub cleaning_revenue: Option<String>,
    #[serde(alias = "adm 360", alias = "adm_fee")]
    pub admin_fee: Option<String>,
    #[serde(alias = "price_less_comission", alias = "price_less_commission")]
    pub net_of_commission: Option<String>,
    pub partnership: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalized records
// ---------------------------------------------------------------------------

/// Join key of a rentable unit: the normalized, lower-cased
/// `(property, unit)` pair. Built once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnitKey {
    pub property: String,
    pub unit: String,
}

impl UnitKey {
    pub fn new(property: &str, unit: &str) -> Self {
        Self {
            property: Self::part(property),
            unit: Self::part(unit),
        }
    }

    /// Canonical form of one name: collapsed whitespace, lower case.
    pub fn part(name: &str) -> String {
        normalize_name(name).to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationRecord {
    pub reservation_id: i64,
    pub property_id: i64,
    pub property_name: String,
    pub unit_name: String,
    #[serde(skip)]
    pub unit_key: UnitKey,
    pub channel: String,
    pub partner: String,
    pub period: Period,
    pub nights: i64,
    pub gross_revenue: f64,
    pub cleaning_revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitTarget {
    pub unit_key: UnitKey,
    pub property_name: String,
    pub unit_name: String,
    pub expected_revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitCostHistory {
    pub unit_key: UnitKey,
    pub property_name: String,
    pub unit_name: String,
    pub period: Period,
    pub cleaning_revenue: f64,
    pub admin_fee: f64,
    pub net_of_commission: f64,
    pub partnership: Option<String>,
}

/// The three source tables for one cache window. Never mutated by the
/// metric code.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub reservations: Vec<ReservationRecord>,
    pub targets: Vec<UnitTarget>,
    pub cost_history: Vec<UnitCostHistory>,
}

// ---------------------------------------------------------------------------
// Rendered report rows
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct UnitDetailRow {
    #[serde(rename = "PropertyId")]
    #[tabled(rename = "PropertyId")]
    pub property_id: i64,
    #[serde(rename = "Property")]
    #[tabled(rename = "Property")]
    pub property: String,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Reservations")]
    #[tabled(rename = "Reservations")]
    pub reservations: usize,
    #[serde(rename = "TotalRevenue")]
    #[tabled(rename = "TotalRevenue")]
    pub total_revenue: String,
    #[serde(rename = "DailyRevenue")]
    #[tabled(rename = "DailyRevenue")]
    pub daily_revenue: String,
    #[serde(rename = "CleaningRevenue")]
    #[tabled(rename = "CleaningRevenue")]
    pub cleaning_revenue: String,
    #[serde(rename = "Occupancy")]
    #[tabled(rename = "Occupancy")]
    pub occupancy: String,
    #[serde(rename = "ADR")]
    #[tabled(rename = "ADR")]
    pub adr: String,
    #[serde(rename = "RevPAR")]
    #[tabled(rename = "RevPAR")]
    pub revpar: String,
    #[serde(rename = "Attainment")]
    #[tabled(rename = "Attainment")]
    pub attainment: String,
    #[serde(rename = "Tier")]
    #[tabled(rename = "Tier")]
    pub tier: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct UnitRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Property")]
    #[tabled(rename = "Property")]
    pub property: String,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "TotalRevenue")]
    #[tabled(rename = "TotalRevenue")]
    pub total_revenue: String,
    #[serde(rename = "DailyRevenue")]
    #[tabled(rename = "DailyRevenue")]
    pub daily_revenue: String,
    #[serde(rename = "Occupancy")]
    #[tabled(rename = "Occupancy")]
    pub occupancy: String,
    #[serde(rename = "ADR")]
    #[tabled(rename = "ADR")]
    pub adr: String,
    #[serde(rename = "RevPAR")]
    #[tabled(rename = "RevPAR")]
    pub revpar: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PropertyRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Property")]
    #[tabled(rename = "Property")]
    pub property: String,
    #[serde(rename = "TotalRevenue")]
    #[tabled(rename = "TotalRevenue")]
    pub total_revenue: String,
    #[serde(rename = "DailyRevenue")]
    #[tabled(rename = "DailyRevenue")]
    pub daily_revenue: String,
    #[serde(rename = "Occupancy")]
    #[tabled(rename = "Occupancy")]
    pub occupancy: String,
    #[serde(rename = "AvgUnitOccupancy")]
    #[tabled(rename = "AvgUnitOccupancy")]
    pub mean_unit_occupancy: String,
    #[serde(rename = "AvgADR")]
    #[tabled(rename = "AvgADR")]
    pub mean_adr: String,
    #[serde(rename = "AvgRevPAR")]
    #[tabled(rename = "AvgRevPAR")]
    pub mean_revpar: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChannelShareRow {
    #[serde(rename = "Channel")]
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TierDistributionRow {
    #[serde(rename = "Tier")]
    #[tabled(rename = "Tier")]
    pub tier: String,
    #[serde(rename = "Units")]
    #[tabled(rename = "Units")]
    pub units: usize,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Current")]
    #[tabled(rename = "Current")]
    pub current: String,
    #[serde(rename = "Baseline")]
    #[tabled(rename = "Baseline")]
    pub baseline: String,
    #[serde(rename = "Change")]
    #[tabled(rename = "Change")]
    pub change: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HistoryRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Nights")]
    #[tabled(rename = "Nights")]
    pub nights: i64,
    #[serde(rename = "TotalRevenue")]
    #[tabled(rename = "TotalRevenue")]
    pub total_revenue: String,
    #[serde(rename = "Occupancy")]
    #[tabled(rename = "Occupancy")]
    pub occupancy: String,
    #[serde(rename = "ADR")]
    #[tabled(rename = "ADR")]
    pub adr: String,
    #[serde(rename = "RevPAR")]
    #[tabled(rename = "RevPAR")]
    pub revpar: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Change")]
    #[tabled(rename = "Change")]
    pub change: String,
}
