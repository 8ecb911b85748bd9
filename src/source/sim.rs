#![cfg(feature = "sim")]

//! Simulated LMP history
//!
//! Deterministic synthetic price curves so the whole service runs with no
//! database or credentials. The same hub/market pair always yields the same
//! history: the RNG is seeded from the pair itself.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::domain::Market;

use super::{LmpRow, PriceSource};

/// Synthetic hourly LMP history with daily, weekly and seasonal shape.
///
/// History runs from two years back through tomorrow, so the default target
/// date always has rows. `dart` is derived per hour as `da - rt`.
pub struct SimulatedPriceSource {
    history_days: i64,
}

impl SimulatedPriceSource {
    pub fn new() -> Self {
        Self { history_days: 730 }
    }

    fn market_rows(&self, hub: &str, market: Market) -> Vec<LmpRow> {
        match market {
            Market::Da | Market::Rt => self.settled_rows(hub, market),
            Market::Dart => {
                let da = self.settled_rows(hub, Market::Da);
                let rt = self.settled_rows(hub, Market::Rt);
                da.into_iter()
                    .zip(rt)
                    .map(|(d, r)| {
                        let energy = d.lmp_system_energy_price - r.lmp_system_energy_price;
                        let congestion = d.lmp_congestion_price - r.lmp_congestion_price;
                        let loss = d.lmp_marginal_loss_price - r.lmp_marginal_loss_price;
                        LmpRow {
                            date: d.date,
                            hour_ending: d.hour_ending,
                            lmp_total: energy + congestion + loss,
                            lmp_system_energy_price: energy,
                            lmp_congestion_price: congestion,
                            lmp_marginal_loss_price: loss,
                        }
                    })
                    .collect()
            }
        }
    }

    fn settled_rows(&self, hub: &str, market: Market) -> Vec<LmpRow> {
        let mut rng = StdRng::seed_from_u64(seed_for(hub, market));

        // Real-time settles noisier than day-ahead.
        let energy_sd = if market == Market::Rt { 6.0 } else { 2.0 };
        let energy_noise = Normal::new(0.0, energy_sd).unwrap();
        let congestion_noise = Normal::new(0.0, 1.5).unwrap();
        let loss_noise = Normal::new(0.0, 0.4).unwrap();

        let base = hub_base_price(hub);
        let end = Utc::now().date_naive() + Duration::days(1);
        let start = end - Duration::days(self.history_days);

        let mut rows = Vec::with_capacity((self.history_days as usize + 1) * 24);
        let mut date = start;
        while date <= end {
            let seasonal = seasonal_factor(date);
            let weekly = weekly_factor(date);
            for hour_ending in 1..=24u32 {
                let hourly = hourly_factor(hour_ending);

                let energy =
                    base * seasonal * weekly * hourly + energy_noise.sample(&mut rng);
                let congestion = 0.05 * energy + congestion_noise.sample(&mut rng);
                let loss = 0.03 * energy + loss_noise.sample(&mut rng);

                rows.push(LmpRow {
                    date,
                    hour_ending,
                    lmp_total: energy + congestion + loss,
                    lmp_system_energy_price: energy,
                    lmp_congestion_price: congestion,
                    lmp_marginal_loss_price: loss,
                });
            }
            date += Duration::days(1);
        }
        rows
    }
}

impl Default for SimulatedPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for SimulatedPriceSource {
    async fn fetch_hourly(&self, hub: &str, market: Market) -> Result<Vec<LmpRow>> {
        Ok(self.market_rows(hub, market))
    }
}

fn seed_for(hub: &str, market: Market) -> u64 {
    let mut hasher = DefaultHasher::new();
    hub.hash(&mut hasher);
    market.hash(&mut hasher);
    hasher.finish()
}

/// Hubs land on different but stable base prices, roughly 30-40 $/MWh.
fn hub_base_price(hub: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    hub.hash(&mut hasher);
    30.0 + (hasher.finish() % 1000) as f64 / 100.0
}

/// Summer peak around late July, mild shoulder seasons.
fn seasonal_factor(date: NaiveDate) -> f64 {
    let day_of_year = date.ordinal() as f64;
    1.0 + 0.2 * ((day_of_year - 205.0) * std::f64::consts::TAU / 365.0).cos()
}

fn weekly_factor(date: NaiveDate) -> f64 {
    match date.weekday().num_days_from_sunday() {
        0 | 6 => 0.88,
        _ => 1.0,
    }
}

/// Morning ramp and a taller early-evening peak.
fn hourly_factor(hour_ending: u32) -> f64 {
    let h = hour_ending as f64;
    let morning = (-(h - 8.0) * (h - 8.0) / 10.0).exp();
    let evening = (-(h - 18.5) * (h - 18.5) / 14.0).exp();
    0.72 + 0.25 * morning + 0.45 * evening
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_pair_is_deterministic() {
        let source = SimulatedPriceSource::new();
        let first = source.fetch_hourly("WESTERN HUB", Market::Da).await.unwrap();
        let second = source.fetch_hourly("WESTERN HUB", Market::Da).await.unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn test_hubs_and_markets_differ() {
        let source = SimulatedPriceSource::new();
        let western = source.fetch_hourly("WESTERN HUB", Market::Da).await.unwrap();
        let dayton = source.fetch_hourly("AEP-DAYTON HUB", Market::Da).await.unwrap();
        let western_rt = source.fetch_hourly("WESTERN HUB", Market::Rt).await.unwrap();

        assert_ne!(western, dayton);
        assert_ne!(western, western_rt);
    }

    #[tokio::test]
    async fn test_history_covers_tomorrow_with_full_days() {
        let source = SimulatedPriceSource::new();
        let rows = source.fetch_hourly("WESTERN HUB", Market::Da).await.unwrap();

        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        let tomorrow_hours: Vec<u32> = rows
            .iter()
            .filter(|r| r.date == tomorrow)
            .map(|r| r.hour_ending)
            .collect();
        assert_eq!(tomorrow_hours, (1..=24).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_components_sum_to_total() {
        let source = SimulatedPriceSource::new();
        for market in [Market::Da, Market::Rt, Market::Dart] {
            let rows = source.fetch_hourly("WESTERN HUB", market).await.unwrap();
            for row in rows {
                assert_eq!(
                    row.lmp_total,
                    row.lmp_system_energy_price
                        + row.lmp_congestion_price
                        + row.lmp_marginal_loss_price,
                );
            }
        }
    }

    #[tokio::test]
    async fn test_dart_is_da_minus_rt() {
        let source = SimulatedPriceSource::new();
        let da = source.fetch_hourly("WESTERN HUB", Market::Da).await.unwrap();
        let rt = source.fetch_hourly("WESTERN HUB", Market::Rt).await.unwrap();
        let dart = source.fetch_hourly("WESTERN HUB", Market::Dart).await.unwrap();

        assert_eq!(da.len(), dart.len());
        for ((d, r), spread) in da.iter().zip(&rt).zip(&dart) {
            assert_eq!(spread.date, d.date);
            assert_eq!(spread.hour_ending, d.hour_ending);
            assert_eq!(
                spread.lmp_system_energy_price,
                d.lmp_system_energy_price - r.lmp_system_energy_price
            );
            assert_eq!(
                spread.lmp_congestion_price,
                d.lmp_congestion_price - r.lmp_congestion_price
            );
        }
    }
}
