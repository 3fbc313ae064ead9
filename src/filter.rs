//! Selection state passed explicitly into every report computation.

use crate::period::Period;
use crate::types::{ReservationRecord, UnitCostHistory, UnitKey};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// What the user is looking at. `None` (or an empty channel list) means
/// "all".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub period: Period,
    pub partner: Option<String>,
    pub property: Option<String>,
    pub unit: Option<String>,
    pub channels: Vec<String>,
}

impl FilterCriteria {
    pub fn for_period(period: Period) -> Self {
        Self {
            period,
            partner: None,
            property: None,
            unit: None,
            channels: Vec::new(),
        }
    }

    /// The same selection at another month.
    pub fn with_period(&self, period: Period) -> Self {
        Self {
            period,
            ..self.clone()
        }
    }

    /// Whether a record passes every dimension except the period.
    pub fn matches_entity(&self, r: &ReservationRecord) -> bool {
        self.entity().matches(self, r)
    }

    pub fn matches(&self, r: &ReservationRecord) -> bool {
        r.period == self.period && self.matches_entity(r)
    }

    /// Records of the selected period that pass every filter.
    pub fn apply<'a>(&self, rows: &'a [ReservationRecord]) -> Vec<&'a ReservationRecord> {
        let entity = self.entity();
        rows.iter()
            .filter(|r| r.period == self.period && entity.matches(self, r))
            .collect()
    }

    /// Cost-history rows for the selection. Channels do not apply; a partner
    /// filter drops rows with no partnership.
    pub fn apply_costs<'a>(&self, rows: &'a [UnitCostHistory]) -> Vec<&'a UnitCostHistory> {
        let entity = self.entity();
        rows.iter()
            .filter(|c| c.period == self.period)
            .filter(|c| match (&self.partner, &c.partnership) {
                (None, _) => true,
                (Some(want), Some(have)) => want == have,
                (Some(_), None) => false,
            })
            .filter(|c| entity.matches_key(&c.unit_key))
            .collect()
    }

    fn entity(&self) -> EntityKey {
        EntityKey {
            property: self.property.as_deref().map(UnitKey::part),
            unit: self.unit.as_deref().map(UnitKey::part),
        }
    }
}

/// Property and unit selection in `UnitKey` form, so filters match the same
/// identity the joins use.
struct EntityKey {
    property: Option<String>,
    unit: Option<String>,
}

impl EntityKey {
    fn matches_key(&self, key: &UnitKey) -> bool {
        self.property.as_ref().map_or(true, |p| *p == key.property)
            && self.unit.as_ref().map_or(true, |u| *u == key.unit)
    }

    fn matches(&self, filter: &FilterCriteria, r: &ReservationRecord) -> bool {
        filter.partner.as_ref().map_or(true, |p| *p == r.partner)
            && self.matches_key(&r.unit_key)
            && (filter.channels.is_empty() || filter.channels.iter().any(|c| *c == r.channel))
    }
}

/// Choices available for each selector, cascading partner -> property ->
/// unit the way the dashboard selectors do. Property and unit names are
/// listed once per key, under the first spelling seen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub periods: Vec<Period>,
    pub partners: Vec<String>,
    pub properties: Vec<String>,
    pub units: Vec<String>,
    pub channels: Vec<String>,
}

fn first_spellings<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut by_key: BTreeMap<&str, &str> = BTreeMap::new();
    for (key, display) in names {
        by_key.entry(key).or_insert(display);
    }
    by_key.into_values().map(String::from).collect()
}

impl FilterOptions {
    pub fn from_records(
        rows: &[ReservationRecord],
        partner: Option<&str>,
        property: Option<&str>,
    ) -> Self {
        let in_partner = |r: &&ReservationRecord| partner.map_or(true, |p| r.partner == p);

        let periods: BTreeSet<Period> = rows.iter().map(|r| r.period).collect();
        let partners: BTreeSet<&str> = rows.iter().map(|r| r.partner.as_str()).collect();
        let properties = first_spellings(
            rows.iter()
                .filter(in_partner)
                .map(|r| (r.unit_key.property.as_str(), r.property_name.as_str())),
        );
        let units = match property.map(UnitKey::part) {
            Some(prop) => first_spellings(
                rows.iter()
                    .filter(in_partner)
                    .filter(|r| r.unit_key.property == prop)
                    .map(|r| (r.unit_key.unit.as_str(), r.unit_name.as_str())),
            ),
            None => Vec::new(),
        };
        let channels: BTreeSet<&str> = rows.iter().map(|r| r.channel.as_str()).collect();

        Self {
            periods: periods.into_iter().collect(),
            partners: partners.into_iter().map(String::from).collect(),
            properties,
            units,
            channels: channels.into_iter().map(String::from).collect(),
        }
    }

    pub fn latest_period(&self) -> Option<Period> {
        self.periods.last().copied()
    }
}
