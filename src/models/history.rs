//! Metric History - fixed-capacity sample buffer backing every chart series.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use crate::constants::HISTORY_LIMIT;

/// Most-recent-last numeric history. Pushing into a full history evicts the
/// oldest sample, so the length never exceeds the capacity.
///
/// Whole-number series use `MetricHistory<i64>` so they go out as `60`,
/// not `60.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricHistory<T = f64> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> MetricHistory<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest one when full
    pub fn push(&mut self, value: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn latest(&self) -> Option<T> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.samples.iter().copied()
    }
}

impl<T: Copy> Default for MetricHistory<T> {
    fn default() -> Self {
        Self::with_capacity(HISTORY_LIMIT)
    }
}

// Charts only need the samples, so the wire form is a bare array.
impl<T: Copy + Serialize> Serialize for MetricHistory<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity() {
        let mut history = MetricHistory::default();
        assert_eq!(history.len(), 0);
        assert_eq!(history.latest(), None);

        for i in 0..5 {
            history.push(i as f64);
        }

        assert_eq!(history.len(), 5);
        assert_eq!(history.latest(), Some(4.0));
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = MetricHistory::default();
        for i in 0..(HISTORY_LIMIT + 7) {
            history.push(i as f64);
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        let expected: Vec<f64> = (7..HISTORY_LIMIT + 7).map(|i| i as f64).collect();
        assert_eq!(history.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut history = MetricHistory::with_capacity(2);
        history.push(1.0);
        history.push(2.5);
        history.push(3.0);

        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, "[2.5,3.0]");
    }

    #[test]
    fn test_integer_series_serialize_without_fraction() {
        let mut history: MetricHistory<i64> = MetricHistory::default();
        history.push(60);
        history.push(62);

        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, "[60,62]");
    }
}
