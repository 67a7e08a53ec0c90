//! crates/reading_journey_core/src/aggregate.rs
//!
//! Dense calendar bucketing for reporting.
//!
//! The aggregator pre-fills one zero bucket per calendar unit across its
//! span, so downstream charts get a gap-free series even for weeks in which
//! nothing was read. Buckets are keyed by the unit's canonical start date,
//! compared by value.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// Fixed calendar intervals for bucketing. Weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Day,
    Week,
    Month,
    Year,
}

impl Interval {
    /// Canonical start date of the unit containing `date`. The same
    /// convention is used when buckets are created and when they are looked
    /// up, so a date always lands in the bucket it was pre-filled into.
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Interval::Day => date,
            Interval::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Interval::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .expect("first of month is a valid date"),
            Interval::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
                .expect("january first is a valid date"),
        }
    }

    /// Start date of the unit following the one starting at `bucket_start`.
    fn advance(&self, bucket_start: NaiveDate) -> NaiveDate {
        match self {
            Interval::Day => bucket_start + Duration::days(1),
            Interval::Week => bucket_start + Duration::days(7),
            Interval::Month => {
                let (year, month) = if bucket_start.month() == 12 {
                    (bucket_start.year() + 1, 1)
                } else {
                    (bucket_start.year(), bucket_start.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
                    .expect("first of month is a valid date")
            }
            Interval::Year => NaiveDate::from_ymd_opt(bucket_start.year() + 1, 1, 1)
                .expect("january first is a valid date"),
        }
    }
}

/// Buckets values into fixed calendar intervals, producing an ordered,
/// zero-filled series.
pub struct TimeSeriesAggregator<V, C>
where
    C: Fn(&mut V, V),
{
    interval: Interval,
    zero: V,
    combine: C,
    buckets: BTreeMap<NaiveDate, V>,
}

impl<V, C> TimeSeriesAggregator<V, C>
where
    V: Clone,
    C: Fn(&mut V, V),
{
    /// Pre-fills one `zero` bucket per calendar unit from `start` to `end`
    /// inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate, interval: Interval, zero: V, combine: C) -> Self {
        let mut buckets = BTreeMap::new();
        let mut cursor = interval.start_of(start);
        let last = interval.start_of(end);
        while cursor <= last {
            buckets.insert(cursor, zero.clone());
            cursor = interval.advance(cursor);
        }
        Self {
            interval,
            zero,
            combine,
            buckets,
        }
    }

    /// Merges `value` into the bucket for `date`'s calendar unit. A date
    /// outside the pre-filled span gets a fresh zero bucket first.
    pub fn add(&mut self, date: NaiveDate, value: V) {
        let key = self.interval.start_of(date);
        let zero = self.zero.clone();
        let slot = self.buckets.entry(key).or_insert(zero);
        (self.combine)(slot, value);
    }

    /// Aggregated value for the unit containing `date`, if bucketed.
    pub fn get(&self, date: NaiveDate) -> Option<&V> {
        self.buckets.get(&self.interval.start_of(date))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The ordered bucket-start-date to value mapping.
    pub fn into_series(self) -> BTreeMap<NaiveDate, V> {
        self.buckets
    }
}
