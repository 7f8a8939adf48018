//! The ledger aggregator: groups transactions by period and by category and computes totals.
//!
//! Everything here is a pure function over already-fetched transactions. Nothing is cached and
//! the input is never modified; the buckets are rebuilt from scratch on every call.

use crate::model::{Amount, Direction, LedgerEntry};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How transactions are grouped in time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Calendar months, keyed `YYYY-MM`.
    #[default]
    #[serde(alias = "bulanan")]
    Month,
    /// Sunday-start weeks of the year, keyed `YYYY-Www`.
    #[serde(alias = "mingguan")]
    Week,
}

serde_plain::derive_display_from_serialize!(Granularity);
serde_plain::derive_fromstr_from_deserialize!(Granularity);

impl Granularity {
    /// The bucket key that `date` falls into.
    pub fn period_key(self, date: NaiveDate) -> String {
        match self {
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Week => format!("{:04}-W{:02}", date.year(), week_number(date)),
        }
    }
}

/// Week of the year where weeks start on Sunday and January 1st is always in week 1:
/// `ceil((days_since_jan1 + weekday_of_jan1 + 1) / 7)` with Sunday as weekday 0.
pub fn week_number(date: NaiveDate) -> u32 {
    let jan1_weekday = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|jan1| jan1.weekday().num_days_from_sunday())
        .unwrap_or_default();
    (date.ordinal0() + jan1_weekday + 1).div_ceil(7)
}

/// Income, expense and balance for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub period: String,
    pub income: Amount,
    pub expense: Amount,
    pub balance: Amount,
}

/// The summed amount of one category in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: String,
    pub total: Amount,
    pub direction: Direction,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Amount,
    pub expense: Amount,
    pub balance: Amount,
}

/// Groups transactions by period and returns the buckets in ascending key order.
pub fn bucket_by_period<T: LedgerEntry>(
    transactions: &[T],
    granularity: Granularity,
) -> Vec<PeriodBucket> {
    let mut periods: BTreeMap<String, (Amount, Amount)> = BTreeMap::new();
    for txn in transactions {
        let (income, expense) = periods
            .entry(granularity.period_key(txn.date()))
            .or_default();
        match txn.direction() {
            Direction::In => *income += txn.amount(),
            Direction::Out => *expense += txn.amount(),
        }
    }
    periods
        .into_iter()
        .map(|(period, (income, expense))| PeriodBucket {
            period,
            income,
            expense,
            balance: income - expense,
        })
        .collect()
}

/// Groups transactions by `(category, direction)` and sorts the buckets by descending total.
/// Equal totals keep the order in which their category was first seen.
pub fn bucket_by_category<T: LedgerEntry>(transactions: &[T]) -> Vec<CategoryBucket> {
    let mut index: HashMap<(&str, Direction), usize> = HashMap::new();
    let mut buckets: Vec<CategoryBucket> = Vec::new();
    for txn in transactions {
        let key = (txn.category(), txn.direction());
        match index.get(&key) {
            Some(&ix) => buckets[ix].total += txn.amount(),
            None => {
                index.insert(key, buckets.len());
                buckets.push(CategoryBucket {
                    category: txn.category().to_string(),
                    total: txn.amount(),
                    direction: txn.direction(),
                });
            }
        }
    }
    buckets.sort_by(|a, b| b.total.cmp(&a.total));
    buckets
}

/// Sums income and expense in one pass. The balance may be negative.
pub fn totals<T: LedgerEntry>(transactions: &[T]) -> Totals {
    let mut income = Amount::ZERO;
    let mut expense = Amount::ZERO;
    for txn in transactions {
        match txn.direction() {
            Direction::In => income += txn.amount(),
            Direction::Out => expense += txn.amount(),
        }
    }
    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

/// The category buckets that go in one direction, keeping their order.
pub fn in_direction(
    buckets: &[CategoryBucket],
    direction: Direction,
) -> impl Iterator<Item = &CategoryBucket> {
    buckets.iter().filter(move |b| b.direction == direction)
}

/// Everything the ledger report shows, computed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub granularity: Granularity,
    pub periods: Vec<PeriodBucket>,
    pub categories: Vec<CategoryBucket>,
    pub totals: Totals,
}

impl LedgerSummary {
    pub fn build<T: LedgerEntry>(transactions: &[T], granularity: Granularity) -> Self {
        Self {
            granularity,
            periods: bucket_by_period(transactions, granularity),
            categories: bucket_by_category(transactions),
            totals: totals(transactions),
        }
    }
}
