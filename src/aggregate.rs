//! Grouped sums and distinct counts over reservation rows.

use crate::period::Period;
use crate::types::{ReservationRecord, UnitKey};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A column rows can be grouped by. `Unit` always implies its property,
/// since unit names are only unique within a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Property,
    Unit,
    Channel,
    Partner,
    Period,
}

/// Sums and counts for one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregate {
    /// Distinct reservation ids.
    pub reservations: usize,
    pub nights_sum: i64,
    pub gross_revenue_sum: f64,
    pub cleaning_revenue_sum: f64,
    /// Distinct `(property, unit)` pairs.
    pub active_units: usize,
}

impl Aggregate {
    pub fn daily_revenue(&self) -> f64 {
        self.gross_revenue_sum - self.cleaning_revenue_sum
    }
}

/// Grouping key; dimensions not grouped on stay `None`. Property and unit
/// hold the lower-cased join key so case variants land in one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub property: Option<String>,
    pub unit: Option<String>,
    pub channel: Option<String>,
    pub partner: Option<String>,
    pub period: Option<Period>,
}

impl GroupKey {
    fn for_record(r: &ReservationRecord, group_by: &[Dimension]) -> Self {
        let mut key = GroupKey::default();
        for dim in group_by {
            match dim {
                Dimension::Property => key.property = Some(r.unit_key.property.clone()),
                Dimension::Unit => {
                    key.property = Some(r.unit_key.property.clone());
                    key.unit = Some(r.unit_key.unit.clone());
                }
                Dimension::Channel => key.channel = Some(r.channel.clone()),
                Dimension::Partner => key.partner = Some(r.partner.clone()),
                Dimension::Period => key.period = Some(r.period),
            }
        }
        key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    /// Smallest property id seen in the group.
    pub property_id: i64,
    /// Display names from the first row of the group.
    pub property_name: String,
    pub unit_name: String,
    pub totals: Aggregate,
}

#[derive(Default)]
struct Acc {
    property_id: Option<i64>,
    property_name: String,
    unit_name: String,
    ids: HashSet<i64>,
    units: HashSet<UnitKey>,
    nights: i64,
    gross: f64,
    cleaning: f64,
}

impl Acc {
    fn push(&mut self, r: &ReservationRecord) {
        if self.property_id.is_none() {
            self.property_name = r.property_name.clone();
            self.unit_name = r.unit_name.clone();
        }
        self.property_id = Some(self.property_id.map_or(r.property_id, |id| id.min(r.property_id)));
        self.ids.insert(r.reservation_id);
        self.units.insert(r.unit_key.clone());
        self.nights += r.nights;
        self.gross += r.gross_revenue;
        self.cleaning += r.cleaning_revenue;
    }

    fn finish(self) -> Aggregate {
        Aggregate {
            reservations: self.ids.len(),
            nights_sum: self.nights,
            gross_revenue_sum: self.gross,
            cleaning_revenue_sum: self.cleaning,
            active_units: self.units.len(),
        }
    }
}

/// Group rows by `group_by` and sum each group. One output row per distinct
/// key present in the input, ordered by key; no rows in, no rows out.
pub fn aggregate<'a, I>(rows: I, group_by: &[Dimension]) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a ReservationRecord>,
{
    let mut map: BTreeMap<GroupKey, Acc> = BTreeMap::new();
    for r in rows {
        map.entry(GroupKey::for_record(r, group_by))
            .or_default()
            .push(r);
    }
    map.into_iter()
        .map(|(key, acc)| AggregateRow {
            key,
            property_id: acc.property_id.unwrap_or_default(),
            property_name: acc.property_name.clone(),
            unit_name: acc.unit_name.clone(),
            totals: acc.finish(),
        })
        .collect()
}

/// Sums over all rows as a single group; zeros for an empty input.
pub fn totals<'a, I>(rows: I) -> Aggregate
where
    I: IntoIterator<Item = &'a ReservationRecord>,
{
    let mut acc = Acc::default();
    for r in rows {
        acc.push(r);
    }
    acc.finish()
}
