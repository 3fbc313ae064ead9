use crate::error::Result;
use crate::period::Period;
use crate::types::{
    RawCostRow, RawReservationRow, RawTargetRow, ReservationRecord, Snapshot, UnitCostHistory,
    UnitKey, UnitTarget,
};
use crate::util::{
    normalize_count, normalize_currency, normalize_id, normalize_name, parse_plain_number,
};
use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// What happened while cleaning one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
    pub invalid_periods: usize,
    pub negative_nights: usize,
    pub negative_revenue: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderCase {
    Keep,
    Lower,
}

fn text(field: Option<&str>) -> String {
    normalize_name(field.unwrap_or_default())
}

fn period_of(field: Option<&str>) -> Option<Period> {
    Period::resolve(field.unwrap_or_default()).ok()
}

pub fn ingest_reservations<I>(rows: I) -> (Vec<ReservationRecord>, IngestReport)
where
    I: IntoIterator<Item = RawReservationRow>,
{
    let mut report = IngestReport::default();
    let mut out = Vec::new();
    for row in rows {
        report.total_rows += 1;
        let Some(period) = period_of(row.period_month.as_deref()) else {
            report.invalid_periods += 1;
            warn!(label = ?row.period_month, "skipping reservation row with invalid month");
            continue;
        };
        let property_name = text(row.property_name.as_deref());
        let unit_name = text(row.unit_name.as_deref());
        let record = ReservationRecord {
            reservation_id: normalize_id(row.reservation_id.as_deref().unwrap_or_default()),
            property_id: normalize_id(row.property_id.as_deref().unwrap_or_default()),
            unit_key: UnitKey::new(&property_name, &unit_name),
            property_name,
            unit_name,
            channel: text(row.channel.as_deref()),
            partner: text(row.partner.as_deref()),
            period,
            nights: normalize_count(row.nights.as_deref().unwrap_or_default()),
            gross_revenue: normalize_currency(row.gross_revenue.as_deref().unwrap_or_default()),
            cleaning_revenue: normalize_currency(row.cleaning_revenue.as_deref().unwrap_or_default()),
        };
        if record.nights < 0 {
            report.negative_nights += 1;
            warn!(
                reservation = record.reservation_id,
                nights = record.nights,
                "negative nights kept as-is"
            );
        }
        if record.gross_revenue < 0.0 || record.cleaning_revenue < 0.0 {
            report.negative_revenue += 1;
            warn!(reservation = record.reservation_id, "negative revenue kept as-is");
        }
        out.push(record);
    }
    report.kept_rows = out.len();
    (out, report)
}

/// Targets are kept even when blank or zero; the tier lookup treats those
/// as "no target".
pub fn ingest_targets<I>(rows: I) -> (Vec<UnitTarget>, IngestReport)
where
    I: IntoIterator<Item = RawTargetRow>,
{
    let mut report = IngestReport::default();
    let mut out = Vec::new();
    for row in rows {
        report.total_rows += 1;
        let property_name = text(row.property_name.as_deref());
        let unit_name = text(row.unit_name.as_deref());
        if unit_name.is_empty() {
            report.parse_errors += 1;
            continue;
        }
        out.push(UnitTarget {
            unit_key: UnitKey::new(&property_name, &unit_name),
            property_name,
            unit_name,
            expected_revenue: normalize_currency(row.expected_revenue.as_deref().unwrap_or_default()),
        });
    }
    report.kept_rows = out.len();
    (out, report)
}

pub fn ingest_cost_history<I>(rows: I) -> (Vec<UnitCostHistory>, IngestReport)
where
    I: IntoIterator<Item = RawCostRow>,
{
    let mut report = IngestReport::default();
    let mut out = Vec::new();
    for row in rows {
        report.total_rows += 1;
        let Some(period) = period_of(row.period_month.as_deref()) else {
            report.invalid_periods += 1;
            warn!(label = ?row.period_month, "skipping cost row with invalid month");
            continue;
        };
        let property_name = text(row.property_name.as_deref());
        let unit_name = text(row.unit_name.as_deref());
        let partnership = Some(text(row.partnership.as_deref())).filter(|p| !p.is_empty());
        out.push(UnitCostHistory {
            unit_key: UnitKey::new(&property_name, &unit_name),
            property_name,
            unit_name,
            period,
            cleaning_revenue: parse_plain_number(row.cleaning_revenue.as_deref().unwrap_or_default()),
            admin_fee: parse_plain_number(row.admin_fee.as_deref().unwrap_or_default()),
            net_of_commission: parse_plain_number(row.net_of_commission.as_deref().unwrap_or_default()),
            partnership,
        });
    }
    report.kept_rows = out.len();
    (out, report)
}

/// Read a CSV into raw rows, trimming header names (and lower-casing them
/// for the reference sheets). Rows that fail to deserialize are counted.
fn read_rows<T, P>(path: P, case: HeaderCase) -> Result<(Vec<T>, usize)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| match case {
            HeaderCase::Keep => h.trim().to_string(),
            HeaderCase::Lower => h.trim().to_lowercase(),
        })
        .collect();
    rdr.set_headers(headers);

    let mut rows = Vec::new();
    let mut errors = 0usize;
    for result in rdr.deserialize::<T>() {
        match result {
            Ok(r) => rows.push(r),
            Err(e) => {
                errors += 1;
                warn!(error = %e, "unreadable CSV row");
            }
        }
    }
    Ok((rows, errors))
}

pub fn load_reservations<P: AsRef<Path>>(path: P) -> Result<(Vec<ReservationRecord>, IngestReport)> {
    let (raw, errors) = read_rows::<RawReservationRow, _>(path, HeaderCase::Keep)?;
    let (records, mut report) = ingest_reservations(raw);
    report.total_rows += errors;
    report.parse_errors += errors;
    Ok((records, report))
}

pub fn load_targets<P: AsRef<Path>>(path: P) -> Result<(Vec<UnitTarget>, IngestReport)> {
    let (raw, errors) = read_rows::<RawTargetRow, _>(path, HeaderCase::Lower)?;
    let (targets, mut report) = ingest_targets(raw);
    report.total_rows += errors;
    report.parse_errors += errors;
    Ok((targets, report))
}

pub fn load_cost_history<P: AsRef<Path>>(path: P) -> Result<(Vec<UnitCostHistory>, IngestReport)> {
    let (raw, errors) = read_rows::<RawCostRow, _>(path, HeaderCase::Lower)?;
    let (rows, mut report) = ingest_cost_history(raw);
    report.total_rows += errors;
    report.parse_errors += errors;
    Ok((rows, report))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotReport {
    pub reservations: IngestReport,
    pub targets: IngestReport,
    pub cost_history: IngestReport,
}

/// Load all three tables. The reference tables are optional: a missing
/// file leaves that table empty, so every unit shows as "no target" and
/// cost figures as undefined.
pub fn load_snapshot(
    reservations: &Path,
    targets: &Path,
    cost_history: &Path,
) -> Result<(Snapshot, SnapshotReport)> {
    let (reservations, res_report) = load_reservations(reservations)?;
    let (targets, target_report) = if targets.exists() {
        load_targets(targets)?
    } else {
        warn!(path = %targets.display(), "targets file not found");
        (Vec::new(), IngestReport::default())
    };
    let (cost_history, cost_report) = if cost_history.exists() {
        load_cost_history(cost_history)?
    } else {
        warn!(path = %cost_history.display(), "cost history file not found");
        (Vec::new(), IngestReport::default())
    };
    info!(
        reservations = res_report.kept_rows,
        targets = target_report.kept_rows,
        cost_rows = cost_report.kept_rows,
        "snapshot loaded"
    );
    Ok((
        Snapshot {
            reservations,
            targets,
            cost_history,
        },
        SnapshotReport {
            reservations: res_report,
            targets: target_report,
            cost_history: cost_report,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn raw(month: &str, nights: &str, gross: &str) -> RawReservationRow {
        RawReservationRow {
            reservation_id: Some("R-0042".into()),
            property_id: Some("12".into()),
            property_name: Some("  Edificio  Sol ".into()),
            unit_name: Some("101".into()),
            channel: Some("Airbnb".into()),
            partner: Some("Alpha".into()),
            period_month: Some(month.into()),
            nights: Some(nights.into()),
            gross_revenue: Some(gross.into()),
            cleaning_revenue: None,
        }
    }

    #[test]
    fn reservations_are_normalized_once() {
        let (rows, report) = ingest_reservations(vec![
            raw("2024-06", "3,5", "R$ 1.234,56"),
            raw("junho", "1", "10"),
            raw("2024-07", "-1", "-50,00"),
        ]);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.kept_rows, 2);
        assert_eq!(report.invalid_periods, 1);
        assert_eq!(report.negative_nights, 1);
        assert_eq!(report.negative_revenue, 1);

        let r = &rows[0];
        assert_eq!(r.reservation_id, 42);
        assert_eq!(r.property_id, 12);
        assert_eq!(r.property_name, "Edificio Sol");
        assert_eq!(r.unit_key, UnitKey::new("edificio sol", "101"));
        assert_eq!(r.nights, 3);
        assert_eq!(r.gross_revenue, 1234.56);
        assert_eq!(r.cleaning_revenue, 0.0);
        assert_eq!(rows[1].nights, -1);
    }

    #[test]
    fn cost_rows_use_plain_numbers() {
        let (rows, report) = ingest_cost_history(vec![
            RawCostRow {
                property_name: Some("Sol".into()),
                unit_name: Some("101".into()),
                period_month: Some("2024-06".into()),
                cleaning_revenue: Some("150.5".into()),
                admin_fee: Some("n/a".into()),
                net_of_commission: Some("900".into()),
                partnership: Some(" ".into()),
            },
            RawCostRow::default(),
        ]);
        assert_eq!(report.invalid_periods, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cleaning_revenue, 150.5);
        assert_eq!(rows[0].admin_fee, 0.0);
        assert_eq!(rows[0].partnership, None);
    }

    #[test]
    fn csv_headers_are_trimmed_and_aliases_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let res_path = dir.path().join("reservas.csv");
        let mut f = std::fs::File::create(&res_path).unwrap();
        writeln!(f, " id_reserva ,id_propriedade,propriedade,unidade,canal,partner,mes,noites_mes,valor_mes,limpeza_mes").unwrap();
        writeln!(f, "1,10,Sol,101,Airbnb,Alpha,2024-06,10,\"1.000,00\",\"100,00\"").unwrap();
        writeln!(f, "2,10,Sol,101,Booking.com,Alpha,2024-06,20,\"2.000,00\",\"200,00\"").unwrap();
        drop(f);

        let target_path = dir.path().join("niveis.csv");
        std::fs::write(&target_path, "Propriedade,Unidade, Receita_Esperada\nSol,101,\"R$ 2.500,00\"\n").unwrap();

        let cost_path = dir.path().join("historico.csv");
        std::fs::write(
            &cost_path,
            "property_name,unit_name,Mês,cleaning_revenue,adm 360,price_less_comission,partnership\nSol,101,2024-06,300,270.5,2400,Alpha\n",
        )
        .unwrap();

        let (snap, report) = load_snapshot(&res_path, &target_path, &cost_path).unwrap();
        assert_eq!(report.reservations.kept_rows, 2);
        assert_eq!(snap.reservations[1].gross_revenue, 2000.0);
        assert_eq!(snap.targets[0].expected_revenue, 2500.0);
        assert_eq!(snap.cost_history[0].admin_fee, 270.5);
        assert_eq!(snap.cost_history[0].partnership.as_deref(), Some("Alpha"));
    }

    #[test]
    fn missing_reference_files_leave_tables_empty() {
        let dir = tempfile::tempdir().unwrap();
        let res_path = dir.path().join("reservas.csv");
        std::fs::write(
            &res_path,
            "reservation_id,property_id,property_name,unit_name,channel,partner,period_month,nights,gross_revenue,cleaning_revenue\n1,1,Sol,101,Airbnb,Alpha,2024-06,1,100,0\n",
        )
        .unwrap();
        let (snap, _) = load_snapshot(
            &res_path,
            &dir.path().join("none.csv"),
            &dir.path().join("none2.csv"),
        )
        .unwrap();
        assert_eq!(snap.reservations.len(), 1);
        assert!(snap.targets.is_empty());
        assert!(snap.cost_history.is_empty());
        assert!(load_reservations(dir.path().join("missing.csv")).is_err());
    }
}
