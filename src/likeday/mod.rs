pub mod assemble;
pub mod filters;
pub mod rank;

pub use assemble::*;
pub use filters::*;
pub use rank::*;

use chrono::NaiveDate;

use crate::domain::{FeatureKey, Market};

/// Validation failures raised by assembly and ranking.
///
/// All of these describe bad or insufficient input, never a transient
/// condition; callers surface them as 4xx and do not retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LikeDayError {
    #[error("target day {0} has no hourly rows after filtering")]
    EmptyTargetDay(NaiveDate),

    #[error("historical pool is empty after filtering")]
    EmptyHistoricalPool,

    #[error("no historical day shares the target's hour count ({0})")]
    NoMatchingHourCount(usize),

    #[error("at least one feature is required")]
    EmptyFeatures,

    #[error("feature weights must sum to a positive value")]
    ZeroWeightSum,

    #[error("feature {0} is missing from the assembled rows")]
    MissingFeature(FeatureKey),

    #[error("no price table was fetched for market {0}")]
    MissingMarket(Market),
}
