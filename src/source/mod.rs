use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Market, PriceComponent};

#[cfg(feature = "db")]
pub mod pg;
#[cfg(feature = "sim")]
pub mod sim;

/// One hour of raw LMP history for a single hub and market.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmpRow {
    pub date: NaiveDate,
    /// Hour-ending, 1..=24.
    pub hour_ending: u32,
    pub lmp_total: f64,
    pub lmp_system_energy_price: f64,
    pub lmp_congestion_price: f64,
    pub lmp_marginal_loss_price: f64,
}

impl LmpRow {
    pub fn component(&self, component: PriceComponent) -> f64 {
        match component {
            PriceComponent::LmpTotal => self.lmp_total,
            PriceComponent::LmpSystemEnergyPrice => self.lmp_system_energy_price,
            PriceComponent::LmpCongestionPrice => self.lmp_congestion_price,
            PriceComponent::LmpMarginalLossPrice => self.lmp_marginal_loss_price,
        }
    }
}

/// A source of hourly LMP history for a pricing hub.
///
/// Implementations return every available row for the hub/market pair, one
/// row per (date, hour_ending), in no guaranteed order. Reads are expected to
/// be safe to run concurrently.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_hourly(&self, hub: &str, market: Market) -> Result<Vec<LmpRow>>;
}
