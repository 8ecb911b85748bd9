//! Like-day request boundary
//!
//! Parses the request body, applies the documented defaults, range-checks the
//! filters, and hands fully resolved parameters to the pipeline. Everything
//! the closed enumerations reject (unknown markets, components, metrics) dies
//! during deserialization before this module ever runs.

use axum::{extract::State, Json};
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::config::Config;
use crate::domain::{FeatureSpec, Market, Metric, PriceComponent};
use crate::likeday::LikeDayFilters;
use crate::pipeline::{self, AppState, LikeDayOutput, LikeDayParams};

use super::error::ApiError;

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LikeDayRequest {
    /// Defaults to tomorrow, resolved at request time.
    pub target_date: Option<NaiveDate>,
    /// Defaults to the configured hub.
    pub hub: Option<String>,
    /// Defaults to day-ahead total LMP with weight 1.
    #[validate(nested)]
    pub features: Option<Vec<FeatureSpec>>,
    #[validate(range(min = 1, max = 20))]
    pub n_neighbors: Option<u32>,
    /// Defaults to the configured metric (cosine out of the box).
    pub metric: Option<Metric>,
    pub hist_start: Option<NaiveDate>,
    pub hist_end: Option<NaiveDate>,
    /// Hour-endings to compare on, 1-24.
    #[validate(custom(function = "validate_hours"))]
    pub hours: Option<Vec<u32>>,
    /// Weekdays to keep in the pool, 0 = Sunday .. 6 = Saturday.
    #[validate(custom(function = "validate_days_of_week"))]
    pub days_of_week: Option<Vec<u32>>,
    /// Calendar months to keep in the pool, 1-12.
    #[validate(custom(function = "validate_months"))]
    pub months: Option<Vec<u32>>,
}

fn validate_hours(hours: &[u32]) -> Result<(), ValidationError> {
    match hours.iter().all(|h| (1..=24).contains(h)) {
        true => Ok(()),
        false => Err(ValidationError::new("hours must be within 1..=24")),
    }
}

fn validate_days_of_week(days: &[u32]) -> Result<(), ValidationError> {
    match days.iter().all(|d| *d <= 6) {
        true => Ok(()),
        false => Err(ValidationError::new("days_of_week must be within 0..=6")),
    }
}

fn validate_months(months: &[u32]) -> Result<(), ValidationError> {
    match months.iter().all(|m| (1..=12).contains(m)) {
        true => Ok(()),
        false => Err(ValidationError::new("months must be within 1..=12")),
    }
}

impl LikeDayRequest {
    /// Apply defaults and produce fully resolved pipeline parameters.
    fn resolve(self, cfg: &Config) -> Result<LikeDayParams, ApiError> {
        let target_date = self
            .target_date
            .unwrap_or_else(|| Utc::now().date_naive() + Days::new(1));

        let features = self.features.unwrap_or_else(|| {
            vec![FeatureSpec::new(Market::Da, PriceComponent::LmpTotal, 1.0)]
        });
        if features.is_empty() {
            return Err(ApiError::ValidationError(
                "features must not be empty".to_string(),
            ));
        }

        Ok(LikeDayParams {
            target_date,
            hub: self.hub.unwrap_or_else(|| cfg.source.hub.clone()),
            features,
            n_neighbors: self
                .n_neighbors
                .unwrap_or(cfg.likeday.default_n_neighbors) as usize,
            metric: self.metric.unwrap_or(cfg.likeday.default_metric),
            filters: LikeDayFilters {
                hist_start: self.hist_start,
                hist_end: self.hist_end,
                hours: self.hours,
                days_of_week: self.days_of_week,
                months: self.months,
            },
        })
    }
}

/// POST /api/v1/like-day - rank the most similar historical days
#[cfg_attr(feature = "swagger", utoipa::path(
    post,
    path = "/api/v1/like-day",
    request_body = LikeDayRequest,
    responses(
        (status = 200, description = "Ranked like days with hourly display profiles", body = LikeDayOutput),
        (status = 400, description = "Invalid parameters or no comparable history"),
        (status = 502, description = "Price source failure"),
    )
))]
pub async fn like_day(
    State(state): State<AppState>,
    Json(request): Json<LikeDayRequest>,
) -> Result<Json<LikeDayOutput>, ApiError> {
    request.validate()?;
    let params = request.resolve(&state.cfg)?;

    let output = pipeline::run(&state, params)
        .await
        .map_err(ApiError::from_pipeline)?;
    Ok(Json(output))
}
