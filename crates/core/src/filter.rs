//! Client-side filtering of accumulated items by cloud cover and time window.

use serde::Serialize;

use crate::item::Item;

/// One day in milliseconds.
pub const DAY_MILLIS: i64 = 86_400_000;

/// Inclusive `[start, end]` range of item timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start_millis: i64,
    pub end_millis: i64,
}

impl TimeWindow {
    /// Window covering every timestamp in `items`.
    ///
    /// A single distinct timestamp is widened by one day on each side so
    /// the range control keeps a usable extent. `None` for no items.
    pub fn spanning(items: &[Item]) -> Option<Self> {
        let min = items.iter().map(|i| i.timestamp_millis).min()?;
        let max = items.iter().map(|i| i.timestamp_millis).max()?;
        if min == max {
            Some(Self {
                start_millis: min.saturating_sub(DAY_MILLIS),
                end_millis: max.saturating_add(DAY_MILLIS),
            })
        } else {
            Some(Self {
                start_millis: min,
                end_millis: max,
            })
        }
    }

    pub fn contains(&self, millis: i64) -> bool {
        self.start_millis <= millis && millis <= self.end_millis
    }
}

/// User-controlled filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterState {
    pub max_cloud_cover_percent: f64,
    pub time_window_start_millis: i64,
    pub time_window_end_millis: i64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            max_cloud_cover_percent: 100.0,
            time_window_start_millis: i64::MIN,
            time_window_end_millis: i64::MAX,
        }
    }
}

impl FilterState {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start_millis: self.time_window_start_millis,
            end_millis: self.time_window_end_millis,
        }
    }

    pub fn set_window(&mut self, window: TimeWindow) {
        self.time_window_start_millis = window.start_millis;
        self.time_window_end_millis = window.end_millis;
    }

    /// Whether `item` passes both the cloud ceiling and the time window.
    ///
    /// Items without a cloud-cover value are never excluded by the ceiling.
    pub fn matches(&self, item: &Item) -> bool {
        let cloud_ok = item
            .cloud_cover_percent
            .map(|c| c <= self.max_cloud_cover_percent)
            .unwrap_or(true);
        cloud_ok && self.window().contains(item.timestamp_millis)
    }
}

/// Visible subset of `items` under `state`, in the original order.
pub fn apply(items: &[Item], state: &FilterState) -> Vec<Item> {
    items.iter().filter(|i| state.matches(i)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(id: &str, ts: i64, cloud: Option<f64>) -> Item {
        Item {
            id: id.to_string(),
            collection_id: "s2".into(),
            timestamp_millis: ts,
            cloud_cover_percent: cloud,
            platform: None,
            geometry: serde_json::Value::Null,
            assets: BTreeMap::new(),
            properties: serde_json::Map::new(),
        }
    }

    #[test]
    fn unknown_cloud_cover_is_kept() {
        let items = vec![
            item("a", 0, Some(5.0)),
            item("b", 0, None),
            item("c", 0, Some(40.0)),
        ];
        let state = FilterState {
            max_cloud_cover_percent: 10.0,
            ..FilterState::default()
        };
        let visible = apply(&items, &state);
        let ids: Vec<_> = visible.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let items = vec![item("a", 100, None), item("b", 200, None), item("c", 300, None)];
        let state = FilterState {
            time_window_start_millis: 200,
            time_window_end_millis: 300,
            ..FilterState::default()
        };
        let visible = apply(&items, &state);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|i| state.matches(i)));
    }

    #[test]
    fn visible_is_subset_of_input() {
        let items: Vec<Item> = (0..20)
            .map(|n| {
                let cloud = if n % 3 == 0 { None } else { Some(n as f64 * 5.0) };
                item(&format!("i{n}"), n * 1000, cloud)
            })
            .collect();
        for ceiling in [0.0, 25.0, 50.0, 100.0] {
            for (start, end) in [(0, 19_000), (5_000, 7_000), (30_000, 40_000)] {
                let state = FilterState {
                    max_cloud_cover_percent: ceiling,
                    time_window_start_millis: start,
                    time_window_end_millis: end,
                };
                for v in apply(&items, &state) {
                    assert!(items.contains(&v));
                    assert!(state.matches(&v));
                }
            }
        }
    }

    #[test]
    fn spanning_widens_single_timestamp() {
        let items = vec![item("a", 5 * DAY_MILLIS, None), item("b", 5 * DAY_MILLIS, None)];
        let w = TimeWindow::spanning(&items).unwrap();
        assert_eq!(w.start_millis, 4 * DAY_MILLIS);
        assert_eq!(w.end_millis, 6 * DAY_MILLIS);
    }

    #[test]
    fn spanning_uses_min_and_max() {
        let items = vec![item("a", 50, None), item("b", 10, None), item("c", 30, None)];
        assert_eq!(
            TimeWindow::spanning(&items),
            Some(TimeWindow {
                start_millis: 10,
                end_millis: 50
            })
        );
        assert_eq!(TimeWindow::spanning(&[]), None);
    }
}
