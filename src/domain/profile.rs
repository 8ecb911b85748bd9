use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{FeatureKey, Market};

/// One assembled observation: a single hour of a single day, carrying one
/// value per requested feature key.
///
/// Invariant: every row of one assembled table has the same key set (the
/// inner join across markets guarantees it).
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRow {
    pub date: NaiveDate,
    /// Hour-ending, 1..=24.
    pub hour: u32,
    pub values: BTreeMap<FeatureKey, f64>,
}

/// All assembled rows of one day, ordered by hour.
///
/// Profiles are only comparable to profiles with the same hour count; short
/// and long DST days are excluded from comparison, never interpolated.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyProfile {
    pub date: NaiveDate,
    rows: Vec<HourlyRow>,
}

impl DailyProfile {
    pub fn from_rows(date: NaiveDate, mut rows: Vec<HourlyRow>) -> Self {
        rows.sort_by_key(|r| r.hour);
        Self { date, rows }
    }

    pub fn rows(&self) -> &[HourlyRow] {
        &self.rows
    }

    pub fn hour_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The day's values for one feature key, in hour order. `None` when any
    /// row lacks the key.
    pub fn series(&self, key: &FeatureKey) -> Option<Vec<f64>> {
        self.rows
            .iter()
            .map(|r| r.values.get(key).copied())
            .collect()
    }
}

/// One ranked historical match.
///
/// `distance` is the weighted z-score blend and can be negative; `similarity`
/// rescales distance into [0, 1] relative to the returned set only, so it is
/// not comparable across requests.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub date: NaiveDate,
    /// 1-based; ties keep the candidate pool's date-ascending order.
    pub rank: u32,
    pub distance: f64,
    pub similarity: f64,
}

/// One hour of raw price history as returned to the caller for display,
/// tagged with the market it came from. All hours and all components are
/// included regardless of the filters used for matching.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub date: NaiveDate,
    pub hour_ending: u32,
    pub market: Market,
    pub lmp_total: f64,
    pub lmp_system_energy_price: f64,
    pub lmp_congestion_price: f64,
    pub lmp_marginal_loss_price: f64,
}
