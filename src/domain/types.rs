use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::Validate;

// ============================================================================
// Market and Price Component Enumerations
// ============================================================================

/// PJM settlement market.
///
/// `Dart` is the synthetic day-ahead minus real-time spread; sources derive it
/// from the two settled markets rather than reading it from a feed.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Market {
    Da,
    Rt,
    Dart,
}

/// LMP price component, one per column of the hourly price table.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PriceComponent {
    LmpTotal,
    LmpSystemEnergyPrice,
    LmpCongestionPrice,
    LmpMarginalLossPrice,
}

// ============================================================================
// Feature Keys and Specs
// ============================================================================

/// A market-qualified price component, e.g. day-ahead total LMP.
///
/// Used as the column identity everywhere downstream of assembly. `Ord` makes
/// map iteration (and therefore logs and blended sums) deterministic.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FeatureKey {
    pub market: Market,
    pub component: PriceComponent,
}

impl FeatureKey {
    pub fn new(market: Market, component: PriceComponent) -> Self {
        Self { market, component }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.market, self.component)
    }
}

/// One caller-supplied feature: which market, which price column, how much it
/// counts. Weights need not sum to 1; the engine normalizes by their total.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct FeatureSpec {
    pub market: Market,
    pub column: PriceComponent,
    #[validate(range(min = 0.0))]
    pub weight: f64,
}

impl FeatureSpec {
    pub fn new(market: Market, column: PriceComponent, weight: f64) -> Self {
        Self { market, column, weight }
    }

    pub fn key(&self) -> FeatureKey {
        FeatureKey::new(self.market, self.column)
    }
}

/// Collapse a spec list into per-key weights. Duplicate (market, column)
/// pairs merge by summing their weights.
pub fn feature_weights(specs: &[FeatureSpec]) -> BTreeMap<FeatureKey, f64> {
    let mut weights = BTreeMap::new();
    for spec in specs {
        *weights.entry(spec.key()).or_insert(0.0) += spec.weight;
    }
    weights
}

/// Distinct markets referenced by a spec list, in stable order.
pub fn referenced_markets(specs: &[FeatureSpec]) -> BTreeSet<Market> {
    specs.iter().map(|s| s.market).collect()
}

// ============================================================================
// Distance Metrics
// ============================================================================

/// Distance metric for comparing two hourly curves.
///
/// Closed set: an unrecognized name is rejected during request parsing rather
/// than falling back to a default.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    Mae,
    Rmse,
    Euclidean,
    #[default]
    Cosine,
}

// ============================================================================
// Unit Tests
// ============================================================================
