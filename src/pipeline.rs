//! Pipeline orchestration
//!
//! Ties the boundary layers together for one like-day run: concurrent
//! per-market history pulls, core assembly and ranking, display profiles for
//! the matched dates, and a best-effort Slack report. All request validation
//! has already happened at the API layer by the time `run` is called.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use futures::future::try_join_all;
use itertools::Itertools;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{
    feature_weights, referenced_markets, FeatureKey, FeatureSpec, Market, MatchResult, Metric,
    ProfileRow,
};
use crate::likeday::{assemble, find_like_days, LikeDayFilters};
use crate::notify::SlackNotifier;
use crate::source::{LmpRow, PriceSource};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub source: Arc<dyn PriceSource>,
    pub notifier: Option<Arc<SlackNotifier>>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        let source: Arc<dyn PriceSource> = match cfg.source.provider.as_str() {
            #[cfg(feature = "sim")]
            "sim" => Arc::new(crate::source::sim::SimulatedPriceSource::new()),
            #[cfg(feature = "db")]
            "postgres" => Arc::new(
                crate::source::pg::PgPriceSource::connect(&cfg.source.db_url, &cfg.source.schema)
                    .await?,
            ),
            other => anyhow::bail!(
                "unknown price source provider '{other}' (is the matching cargo feature enabled?)"
            ),
        };

        let notifier = SlackNotifier::from_config(&cfg.slack)?.map(Arc::new);

        Ok(Self {
            cfg,
            source,
            notifier,
        })
    }
}

/// Fully resolved inputs for one run; the API layer has already applied
/// request defaults and validation.
#[derive(Debug, Clone)]
pub struct LikeDayParams {
    pub target_date: NaiveDate,
    pub hub: String,
    pub features: Vec<FeatureSpec>,
    pub n_neighbors: usize,
    pub metric: Metric,
    pub filters: LikeDayFilters,
}

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct LikeDayOutput {
    pub target_date: NaiveDate,
    pub hub: String,
    pub metric: Metric,
    pub n_neighbors: usize,
    pub like_days: Vec<MatchResult>,
    /// Full hourly history (all hours, all components) for the target day and
    /// every matched day, per referenced market.
    pub hourly_profiles: Vec<ProfileRow>,
}

/// Run the whole like-day pipeline and report the outcome to Slack when a
/// notifier is configured. Notification failures are logged, never surfaced.
pub async fn run(state: &AppState, params: LikeDayParams) -> Result<LikeDayOutput> {
    let result = execute(state, &params).await;

    if let Some(notifier) = &state.notifier {
        match &result {
            Ok(output) => {
                if let Err(e) = notifier
                    .report_success(params.target_date, &params.hub, params.metric, &output.like_days)
                    .await
                {
                    warn!(error = %e, "slack success notification failed");
                }
            }
            Err(error) => {
                if let Err(e) = notifier
                    .report_failure(params.target_date, &params.hub, error)
                    .await
                {
                    warn!(error = %e, "slack failure notification failed");
                }
            }
        }
    }

    result
}

async fn execute(state: &AppState, params: &LikeDayParams) -> Result<LikeDayOutput> {
    let weights = feature_weights(&params.features);
    let keys: BTreeSet<FeatureKey> = weights.keys().copied().collect();
    let markets = referenced_markets(&params.features);

    info!(
        target_date = %params.target_date,
        hub = %params.hub,
        metric = %params.metric,
        markets = %markets.iter().join(", "),
        "pulling LMP history"
    );

    let fetched = try_join_all(
        markets
            .iter()
            .map(|market| state.source.fetch_hourly(&params.hub, *market)),
    )
    .await?;
    let tables: BTreeMap<Market, Vec<LmpRow>> = markets.iter().copied().zip(fetched).collect();

    for (market, rows) in &tables {
        info!(market = %market, rows = rows.len(), "fetched market table");
    }

    let (target, pool) = assemble(&tables, params.target_date, &keys, &params.filters)?;
    info!(
        pool_days = pool.len(),
        target_hours = target.hour_count(),
        "assembled feature table"
    );

    let like_days = find_like_days(&target, &pool, &weights, params.n_neighbors, params.metric)?;
    info!(matches = like_days.len(), "ranked historical days");

    // Display profiles for the matched dates plus the target, rebuilt from
    // the unfiltered per-market tables.
    let mut display_dates: BTreeSet<NaiveDate> = like_days.iter().map(|m| m.date).collect();
    display_dates.insert(params.target_date);

    let mut hourly_profiles = Vec::new();
    for (market, rows) in &tables {
        let mut market_rows: Vec<&LmpRow> = rows
            .iter()
            .filter(|r| display_dates.contains(&r.date))
            .collect();
        market_rows.sort_by_key(|r| (r.date, r.hour_ending));
        hourly_profiles.extend(market_rows.into_iter().map(|r| ProfileRow {
            date: r.date,
            hour_ending: r.hour_ending,
            market: *market,
            lmp_total: r.lmp_total,
            lmp_system_energy_price: r.lmp_system_energy_price,
            lmp_congestion_price: r.lmp_congestion_price,
            lmp_marginal_loss_price: r.lmp_marginal_loss_price,
        }));
    }

    Ok(LikeDayOutput {
        target_date: params.target_date,
        hub: params.hub.clone(),
        metric: params.metric,
        n_neighbors: params.n_neighbors,
        like_days,
        hourly_profiles,
    })
}
