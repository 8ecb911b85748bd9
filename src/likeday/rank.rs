//! Like-day ranking
//!
//! Turns assembled hourly curves into a similarity-ordered list of historical
//! dates. Three stages: one raw distance per (day, feature), cross-sectional
//! z-score normalization per feature across the pool, then a weighted blend
//! and top-N selection.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ordered_float::OrderedFloat;

use crate::domain::{DailyProfile, FeatureKey, MatchResult, Metric};

use super::LikeDayError;

/// Rank the historical pool against the target day and keep the `n_neighbors`
/// closest dates.
///
/// Only pool days with exactly the target's hour count are compared; others
/// are excluded outright. Ties keep the pool's date-ascending order. The
/// reported `similarity` is rescaled over the returned set alone and is not
/// comparable across calls.
pub fn find_like_days(
    target: &DailyProfile,
    pool: &[DailyProfile],
    weights: &BTreeMap<FeatureKey, f64>,
    n_neighbors: usize,
    metric: Metric,
) -> Result<Vec<MatchResult>, LikeDayError> {
    if target.is_empty() {
        return Err(LikeDayError::EmptyTargetDay(target.date));
    }
    if weights.is_empty() {
        return Err(LikeDayError::EmptyFeatures);
    }
    let weight_sum: f64 = weights.values().sum();
    if weight_sum <= 0.0 {
        return Err(LikeDayError::ZeroWeightSum);
    }

    let mut target_series: BTreeMap<FeatureKey, Vec<f64>> = BTreeMap::new();
    for key in weights.keys() {
        let series = target
            .series(key)
            .ok_or(LikeDayError::MissingFeature(*key))?;
        target_series.insert(*key, series);
    }

    let candidates: Vec<&DailyProfile> = pool
        .iter()
        .filter(|p| p.hour_count() == target.hour_count())
        .collect();
    if candidates.is_empty() {
        return Err(LikeDayError::NoMatchingHourCount(target.hour_count()));
    }

    // One raw distance per (feature, candidate), candidate order preserved.
    let mut raw: BTreeMap<FeatureKey, Vec<f64>> = BTreeMap::new();
    for (key, t_series) in &target_series {
        let mut distances = Vec::with_capacity(candidates.len());
        for day in &candidates {
            let h_series = day.series(key).ok_or(LikeDayError::MissingFeature(*key))?;
            distances.push(feature_distance(metric, t_series, &h_series));
        }
        raw.insert(*key, distances);
    }

    // Z-score each feature across the pool, then blend. A zero or undefined
    // std (identical distances, pool of one) is substituted with 1.0.
    let mut blended = vec![0.0; candidates.len()];
    for (key, distances) in &raw {
        let mu = mean(distances);
        let sd = sample_std(distances, mu);
        let sd = if sd.is_finite() && sd > 0.0 { sd } else { 1.0 };
        let weight = weights[key];
        for (acc, d) in blended.iter_mut().zip(distances) {
            *acc += weight * ((d - mu) / sd);
        }
    }
    for acc in blended.iter_mut() {
        *acc /= weight_sum;
    }

    // Smallest N distances win; sort_by_key is stable so equal distances
    // stay in date order.
    let mut ranked: Vec<(NaiveDate, f64)> =
        candidates.iter().map(|d| d.date).zip(blended).collect();
    ranked.sort_by_key(|&(_, d)| OrderedFloat(d));
    ranked.truncate(n_neighbors);

    let min = ranked.first().map(|&(_, d)| d).unwrap_or(0.0);
    let max = ranked.last().map(|&(_, d)| d).unwrap_or(0.0);
    let span = max - min;

    Ok(ranked
        .into_iter()
        .enumerate()
        .map(|(i, (date, distance))| {
            let similarity = if span > 0.0 {
                1.0 - (distance - min) / span
            } else {
                1.0
            };
            MatchResult {
                date,
                rank: (i + 1) as u32,
                distance,
                similarity,
            }
        })
        .collect())
}

/// Scalar distance between two equal-length hourly curves.
pub fn feature_distance(metric: Metric, target: &[f64], historical: &[f64]) -> f64 {
    match metric {
        Metric::Mae => mae(target, historical),
        Metric::Rmse => rmse(target, historical),
        Metric::Euclidean => euclidean(target, historical),
        Metric::Cosine => cosine(target, historical),
    }
}

fn mae(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().max(1);
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>() / n as f64
}

fn rmse(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().max(1);
    (a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>() / n as f64).sqrt()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Cosine distance, 1 - cos(a, b). A zero-norm vector on either side yields
/// exactly 1.0 instead of dividing by zero.
fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum();
    let norm_b: f64 = b.iter().map(|y| y * y).sum();
    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        return 1.0;
    }
    1.0 - dot / denom
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len().max(1) as f64
}

/// Sample standard deviation (n - 1 denominator). NaN below two samples.
fn sample_std(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}
