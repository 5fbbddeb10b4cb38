//! Per-day bucketing of visible items for the timeline bar chart.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use crate::filter::DAY_MILLIS;
use crate::item::Item;

/// Items acquired on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub count: usize,
    pub per_collection: BTreeMap<String, usize>,
}

/// Day-granularity histogram, buckets in ascending day order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayHistogram {
    buckets: Vec<DayBucket>,
}

impl DayHistogram {
    pub fn from_items(items: &[Item]) -> Self {
        let mut by_day: BTreeMap<i64, DayBucket> = BTreeMap::new();

        for item in items {
            let day_index = item.timestamp_millis.div_euclid(DAY_MILLIS);
            let Some(day) = day_from_index(day_index) else {
                continue;
            };
            let bucket = by_day.entry(day_index).or_insert_with(|| DayBucket {
                day,
                count: 0,
                per_collection: BTreeMap::new(),
            });
            bucket.count += 1;
            *bucket
                .per_collection
                .entry(item.collection_id.clone())
                .or_insert(0) += 1;
        }

        Self {
            buckets: by_day.into_values().collect(),
        }
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    /// Tallest bar, used to scale the chart.
    pub fn max_count(&self) -> usize {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn day_from_index(day_index: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(day_index.checked_mul(DAY_MILLIS)?).map(|dt| dt.date_naive())
}
