//! Client-side aggregation over fetched rows.
//!
//! All functions are pure and take shared slices; nothing here talks to
//! the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;

use crate::models::{Dated, EggGrade, EggProduction, Feed, HealthRecord, Sale};
use crate::window::DateRange;

/// Total eggs recorded on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Total eggs of one grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCount {
    pub grade: EggGrade,
    pub count: i64,
}

/// Sum of one numeric field. Empty input sums to zero.
pub fn sum_by<'a, T, I, N, F>(rows: I, field: F) -> N
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    N: Sum<N>,
    F: Fn(&T) -> N,
{
    rows.into_iter().map(field).sum()
}

/// Rows dated inside `range`.
pub fn within<'a, T: Dated>(
    rows: &'a [T],
    range: &'a DateRange,
) -> impl Iterator<Item = &'a T> + 'a {
    rows.iter().filter(move |row| range.contains(row.date()))
}

/// Egg count over the given rows.
pub fn total_eggs<'a, I>(rows: I) -> i64
where
    I: IntoIterator<Item = &'a EggProduction>,
{
    sum_by(rows, |row: &EggProduction| i64::from(row.count))
}

/// Value of the completed sales among `rows`.
pub fn completed_sales<'a, I>(rows: I) -> f64
where
    I: IntoIterator<Item = &'a Sale>,
{
    sum_by(
        rows.into_iter().filter(|sale| sale.is_completed()),
        |sale: &Sale| sale.total,
    )
}

/// Group rows by calendar day and sum `count` per day.
///
/// Buckets come out in ascending date order with one bucket per day.
pub fn bucket_by_date<'a, T, I, F>(rows: I, count: F) -> Vec<DailyCount>
where
    T: Dated + 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> i64,
{
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for row in rows {
        *buckets.entry(row.date()).or_insert(0) += count(row);
    }
    buckets
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Daily egg totals.
pub fn daily_production<'a, I>(rows: I) -> Vec<DailyCount>
where
    I: IntoIterator<Item = &'a EggProduction>,
{
    bucket_by_date(rows, |row| i64::from(row.count))
}

/// Egg totals per grade, A to C. Grades with no eggs are reported as zero.
pub fn grade_breakdown<'a, I>(rows: I) -> Vec<GradeCount>
where
    I: IntoIterator<Item = &'a EggProduction>,
{
    let mut totals: BTreeMap<EggGrade, i64> =
        EggGrade::ALL.iter().map(|grade| (*grade, 0)).collect();
    for row in rows {
        *totals.entry(row.quality).or_insert(0) += i64::from(row.count);
    }
    totals
        .into_iter()
        .map(|(grade, count)| GradeCount { grade, count })
        .collect()
}

pub fn profit(total_sales: f64, total_feed_cost: f64, total_health_cost: f64) -> f64 {
    total_sales - total_feed_cost - total_health_cost
}

/// Completed sales minus feed and health costs, all restricted to `range`.
pub fn profit_within(
    range: &DateRange,
    sales: &[Sale],
    feed: &[Feed],
    health: &[HealthRecord],
) -> f64 {
    profit(
        completed_sales(within(sales, range)),
        sum_by(within(feed, range), |f: &Feed| f.cost),
        sum_by(within(health, range), |h: &HealthRecord| h.cost),
    )
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::SaleStatus;

    #[test]
    fn test_sum_by() {
        let rows = [feed("2024-03-01", 500.0), feed("2024-03-02", 250.5)];
        assert_eq!(sum_by(&rows, |f: &Feed| f.cost), 750.5);

        let empty: [Feed; 0] = [];
        assert_eq!(sum_by(&empty, |f: &Feed| f.cost), 0.0);
    }

    #[test]
    fn test_same_day_rows_share_a_bucket() {
        let rows = [
            production("2024-03-01", 850, EggGrade::A),
            production("2024-03-01", 150, EggGrade::B),
        ];
        assert_eq!(
            daily_production(&rows),
            vec![DailyCount {
                date: day("2024-03-01"),
                count: 1000
            }]
        );
    }

    #[test]
    fn test_buckets_ascend_and_preserve_total() {
        let rows = [
            production("2024-03-03", 10, EggGrade::A),
            production("2024-03-01", 20, EggGrade::A),
            production("2024-03-02", 30, EggGrade::C),
            production("2024-03-01", 40, EggGrade::B),
        ];
        let buckets = daily_production(&rows);

        let dates: Vec<_> = buckets.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![day("2024-03-01"), day("2024-03-02"), day("2024-03-03")]);
        assert!(buckets.windows(2).all(|w| w[0].date < w[1].date));

        let bucket_total: i64 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(bucket_total, total_eggs(&rows));
    }

    #[test]
    fn test_grade_breakdown_lists_every_grade() {
        let rows = [
            production("2024-03-01", 850, EggGrade::A),
            production("2024-03-02", 150, EggGrade::A),
            production("2024-03-02", 40, EggGrade::C),
        ];
        assert_eq!(
            grade_breakdown(&rows),
            vec![
                GradeCount { grade: EggGrade::A, count: 1000 },
                GradeCount { grade: EggGrade::B, count: 0 },
                GradeCount { grade: EggGrade::C, count: 40 },
            ]
        );
        assert_eq!(grade_breakdown(Vec::<EggProduction>::new().iter()).len(), 3);
    }

    #[test]
    fn test_profit() {
        let range = DateRange::new(day("2024-03-01"), day("2024-03-31"));
        let sales = [
            sale("2024-03-02", 1000.0, SaleStatus::Completed),
            sale("2024-03-05", 2000.0, SaleStatus::Completed),
            sale("2024-03-06", 9000.0, SaleStatus::Pending),
            sale("2024-02-20", 4000.0, SaleStatus::Completed),
        ];
        let feed = [feed("2024-03-03", 500.0)];
        let health = [health("2024-03-04", 200.0), health("2024-04-01", 75.0)];

        assert_eq!(profit_within(&range, &sales, &feed, &health), 2300.0);
        assert_eq!(profit(0.0, 100.0, 0.0), -100.0);
        assert_eq!(completed_sales(&sales), 7000.0);
    }
}
