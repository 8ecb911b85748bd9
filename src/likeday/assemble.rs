//! Feature table assembly
//!
//! Joins per-market price tables into one hourly feature table, splits it
//! into the target day and the historical pool, and narrows the pool through
//! the filter pipeline. The output feeds directly into ranking.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::{DailyProfile, FeatureKey, HourlyRow, Market};
use crate::source::LmpRow;

use super::filters::{filter_date_range, filter_days_of_week, filter_months};
use super::LikeDayError;

/// Optional narrowing applied during assembly. `hours` trims both the target
/// day and the pool so feature vectors stay comparable; the remaining fields
/// apply to the historical pool only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LikeDayFilters {
    pub hist_start: Option<NaiveDate>,
    pub hist_end: Option<NaiveDate>,
    pub hours: Option<Vec<u32>>,
    pub days_of_week: Option<Vec<u32>>,
    pub months: Option<Vec<u32>>,
}

/// Build the target day's profile and the filtered historical pool from
/// per-market raw tables.
///
/// The join across markets is a strict inner join on (date, hour): a date
/// missing from any referenced market drops out of both the target and the
/// pool. The returned pool is date-ascending, which downstream ranking relies
/// on for stable tie ordering.
pub fn assemble(
    tables: &BTreeMap<Market, Vec<LmpRow>>,
    target_date: NaiveDate,
    keys: &BTreeSet<FeatureKey>,
    filters: &LikeDayFilters,
) -> Result<(DailyProfile, Vec<DailyProfile>), LikeDayError> {
    if keys.is_empty() {
        return Err(LikeDayError::EmptyFeatures);
    }

    let markets: BTreeSet<Market> = keys.iter().map(|k| k.market).collect();

    let mut joined: BTreeMap<(NaiveDate, u32), BTreeMap<FeatureKey, f64>> = BTreeMap::new();
    for (i, market) in markets.iter().enumerate() {
        let rows = tables
            .get(market)
            .ok_or(LikeDayError::MissingMarket(*market))?;
        let market_keys: Vec<FeatureKey> =
            keys.iter().filter(|k| k.market == *market).copied().collect();

        let mut table: BTreeMap<(NaiveDate, u32), BTreeMap<FeatureKey, f64>> = BTreeMap::new();
        for row in rows {
            let values = table.entry((row.date, row.hour_ending)).or_default();
            for key in &market_keys {
                values.insert(*key, row.component(key.component));
            }
        }

        if i == 0 {
            joined = table;
        } else {
            // Inner join: keep only (date, hour) pairs present in every market.
            joined.retain(|pair, _| table.contains_key(pair));
            for (pair, values) in joined.iter_mut() {
                if let Some(extra) = table.get(pair) {
                    values.extend(extra.iter().map(|(k, v)| (*k, *v)));
                }
            }
        }
    }

    // Hour filter comes before the split so target and pool keep identical
    // hour sets.
    if let Some(hours) = filters.hours.as_deref() {
        joined.retain(|&(_, hour), _| hours.contains(&hour));
    }

    let mut target_rows = Vec::new();
    let mut hist_by_date: BTreeMap<NaiveDate, Vec<HourlyRow>> = BTreeMap::new();
    for ((date, hour), values) in joined {
        let row = HourlyRow { date, hour, values };
        if date == target_date {
            target_rows.push(row);
        } else if date < target_date {
            hist_by_date.entry(date).or_default().push(row);
        }
        // Dates past the target never enter the pool.
    }

    let target = DailyProfile::from_rows(target_date, target_rows);
    if target.is_empty() {
        return Err(LikeDayError::EmptyTargetDay(target_date));
    }

    let pool: Vec<DailyProfile> = hist_by_date
        .into_iter()
        .map(|(date, rows)| DailyProfile::from_rows(date, rows))
        .collect();

    let pool = filter_date_range(pool, filters.hist_start, filters.hist_end);
    let pool = filter_days_of_week(pool, filters.days_of_week.as_deref());
    let pool = filter_months(pool, filters.months.as_deref());

    if pool.is_empty() {
        return Err(LikeDayError::EmptyHistoricalPool);
    }
    if !pool.iter().any(|p| p.hour_count() == target.hour_count()) {
        return Err(LikeDayError::NoMatchingHourCount(target.hour_count()));
    }

    Ok((target, pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceComponent;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lmp_row(date: NaiveDate, hour: u32, total: f64) -> LmpRow {
        LmpRow {
            date,
            hour_ending: hour,
            lmp_total: total,
            lmp_system_energy_price: total * 0.9,
            lmp_congestion_price: total * 0.07,
            lmp_marginal_loss_price: total * 0.03,
        }
    }

    fn full_day(date: NaiveDate, base: f64) -> Vec<LmpRow> {
        (1..=24).map(|h| lmp_row(date, h, base + h as f64)).collect()
    }

    fn da_total() -> BTreeSet<FeatureKey> {
        [FeatureKey::new(Market::Da, PriceComponent::LmpTotal)].into()
    }

    #[test]
    fn test_single_market_split_and_order() {
        let target = date(2026, 6, 10);
        let mut rows = full_day(date(2026, 6, 8), 20.0);
        rows.extend(full_day(date(2026, 6, 9), 30.0));
        rows.extend(full_day(target, 40.0));
        rows.extend(full_day(date(2026, 6, 11), 50.0)); // future, must vanish

        let tables = BTreeMap::from([(Market::Da, rows)]);
        let (target_profile, pool) =
            assemble(&tables, target, &da_total(), &LikeDayFilters::default()).unwrap();

        assert_eq!(target_profile.date, target);
        assert_eq!(target_profile.hour_count(), 24);

        let pool_dates: Vec<NaiveDate> = pool.iter().map(|p| p.date).collect();
        assert_eq!(pool_dates, vec![date(2026, 6, 8), date(2026, 6, 9)]);
    }

    #[test]
    fn test_inner_join_drops_unshared_dates() {
        let target = date(2026, 6, 10);

        // Both markets carry the target day, but their histories are disjoint.
        let mut da = full_day(target, 40.0);
        da.extend(full_day(date(2026, 6, 1), 20.0));
        let mut rt = full_day(target, 42.0);
        rt.extend(full_day(date(2026, 6, 2), 21.0));

        let tables = BTreeMap::from([(Market::Da, da), (Market::Rt, rt)]);
        let keys: BTreeSet<FeatureKey> = [
            FeatureKey::new(Market::Da, PriceComponent::LmpTotal),
            FeatureKey::new(Market::Rt, PriceComponent::LmpTotal),
        ]
        .into();

        let err = assemble(&tables, target, &keys, &LikeDayFilters::default()).unwrap_err();
        assert_eq!(err, LikeDayError::EmptyHistoricalPool);
    }

    #[test]
    fn test_cross_market_rows_carry_both_keys() {
        let target = date(2026, 6, 10);
        let hist = date(2026, 6, 9);

        let da = [full_day(hist, 20.0), full_day(target, 40.0)].concat();
        let rt = [full_day(hist, 25.0), full_day(target, 45.0)].concat();

        let tables = BTreeMap::from([(Market::Da, da), (Market::Rt, rt)]);
        let da_key = FeatureKey::new(Market::Da, PriceComponent::LmpTotal);
        let rt_key = FeatureKey::new(Market::Rt, PriceComponent::LmpTotal);
        let keys: BTreeSet<FeatureKey> = [da_key, rt_key].into();

        let (target_profile, pool) =
            assemble(&tables, target, &keys, &LikeDayFilters::default()).unwrap();

        for row in target_profile.rows().iter().chain(pool[0].rows()) {
            assert_eq!(row.values.len(), 2);
            assert!(row.values.contains_key(&da_key));
            assert!(row.values.contains_key(&rt_key));
        }
        assert_eq!(target_profile.rows()[0].values[&da_key], 41.0);
        assert_eq!(target_profile.rows()[0].values[&rt_key], 46.0);
    }

    #[test]
    fn test_hour_filter_trims_both_sides() {
        let target = date(2026, 6, 10);
        let rows = [full_day(date(2026, 6, 9), 20.0), full_day(target, 40.0)].concat();
        let tables = BTreeMap::from([(Market::Da, rows)]);

        let filters = LikeDayFilters {
            hours: Some(vec![7, 8, 9, 10]),
            ..Default::default()
        };
        let (target_profile, pool) = assemble(&tables, target, &da_total(), &filters).unwrap();

        assert_eq!(target_profile.hour_count(), 4);
        assert_eq!(pool[0].hour_count(), 4);
        let hours: Vec<u32> = target_profile.rows().iter().map(|r| r.hour).collect();
        assert_eq!(hours, vec![7, 8, 9, 10]);
    }

    #[test]
    fn test_pool_filters_leave_target_alone() {
        // Target in June; pool restricted to May days only.
        let target = date(2026, 6, 10);
        let rows = [
            full_day(date(2026, 5, 20), 20.0),
            full_day(date(2026, 6, 5), 30.0),
            full_day(target, 40.0),
        ]
        .concat();
        let tables = BTreeMap::from([(Market::Da, rows)]);

        let filters = LikeDayFilters {
            months: Some(vec![5]),
            ..Default::default()
        };
        let (target_profile, pool) = assemble(&tables, target, &da_total(), &filters).unwrap();

        assert_eq!(target_profile.date, target);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].date, date(2026, 5, 20));
    }

    #[test]
    fn test_empty_target_day_is_an_error() {
        let target = date(2026, 6, 10);
        let tables = BTreeMap::from([(Market::Da, full_day(date(2026, 6, 9), 20.0))]);

        let err = assemble(&tables, target, &da_total(), &LikeDayFilters::default()).unwrap_err();
        assert_eq!(err, LikeDayError::EmptyTargetDay(target));
    }

    #[test]
    fn test_missing_market_table_is_an_error() {
        let target = date(2026, 6, 10);
        let tables = BTreeMap::from([(Market::Da, full_day(target, 40.0))]);
        let keys: BTreeSet<FeatureKey> =
            [FeatureKey::new(Market::Rt, PriceComponent::LmpTotal)].into();

        let err = assemble(&tables, target, &keys, &LikeDayFilters::default()).unwrap_err();
        assert_eq!(err, LikeDayError::MissingMarket(Market::Rt));
    }

    #[test]
    fn test_no_pool_day_with_matching_hour_count() {
        let target = date(2026, 6, 10);
        // Historical day only has 23 hours (spring-forward shape).
        let short: Vec<LmpRow> = (1..=23).map(|h| lmp_row(date(2026, 3, 8), h, 20.0)).collect();
        let rows = [short, full_day(target, 40.0)].concat();
        let tables = BTreeMap::from([(Market::Da, rows)]);

        let err = assemble(&tables, target, &da_total(), &LikeDayFilters::default()).unwrap_err();
        assert_eq!(err, LikeDayError::NoMatchingHourCount(24));
    }

    #[test]
    fn test_empty_feature_set_is_an_error() {
        let target = date(2026, 6, 10);
        let tables = BTreeMap::from([(Market::Da, full_day(target, 40.0))]);

        let err =
            assemble(&tables, target, &BTreeSet::new(), &LikeDayFilters::default()).unwrap_err();
        assert_eq!(err, LikeDayError::EmptyFeatures);
    }
}
