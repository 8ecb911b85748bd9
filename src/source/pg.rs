#![cfg(feature = "db")]

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::domain::Market;

use super::{LmpRow, PriceSource};

/// Hourly LMP history read from the warehouse's `pjm_lmps_hourly` table.
///
/// The schema name comes from configuration and is interpolated into the
/// query text; hub and market are bound parameters. The table is expected to
/// carry `dart` rows alongside the settled markets.
pub struct PgPriceSource {
    pool: PgPool,
    schema: String,
}

impl PgPriceSource {
    pub async fn connect(url: &str, schema: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .context("postgres connect failed")?;
        Ok(Self {
            pool,
            schema: schema.to_string(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgLmpRow {
    date: NaiveDate,
    hour_ending: i32,
    lmp_total: f64,
    lmp_system_energy_price: f64,
    lmp_congestion_price: f64,
    lmp_marginal_loss_price: f64,
}

#[async_trait]
impl PriceSource for PgPriceSource {
    async fn fetch_hourly(&self, hub: &str, market: Market) -> Result<Vec<LmpRow>> {
        let query = format!(
            "SELECT date, hour_ending, lmp_total, lmp_system_energy_price, \
             lmp_congestion_price, lmp_marginal_loss_price \
             FROM {}.pjm_lmps_hourly \
             WHERE pricing_hub = $1 AND market = $2",
            self.schema
        );

        let rows: Vec<PgLmpRow> = sqlx::query_as(&query)
            .bind(hub)
            .bind(market.to_string())
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("LMP query failed for {hub} ({market})"))?;

        Ok(rows
            .into_iter()
            .map(|r| LmpRow {
                date: r.date,
                hour_ending: r.hour_ending as u32,
                lmp_total: r.lmp_total,
                lmp_system_energy_price: r.lmp_system_energy_price,
                lmp_congestion_price: r.lmp_congestion_price,
                lmp_marginal_loss_price: r.lmp_marginal_loss_price,
            })
            .collect())
    }
}
