//! Live metrics shown on the four dashboard tabs

use serde::Serialize;

use super::history::MetricHistory;
use crate::constants::{STATUS_DATASET_LINE, STATUS_READY};

#[derive(Debug, Clone, Default, Serialize)]
pub struct LiveMetrics {
    pub home: HomeMetrics,
    pub performance: PerformanceMetrics,
    pub attack: AttackMetrics,
    pub defence: DefenceMetrics,
}

impl LiveMetrics {
    /// Lengths of all chart series, for invariant checks
    pub fn history_lens(&self) -> [usize; 7] {
        [
            self.performance.live_accuracy.len(),
            self.performance.live_loss.len(),
            self.performance.f1_score.len(),
            self.performance.precision_recall.len(),
            self.attack.gender_leakage.len(),
            self.attack.age_leakage.len(),
            self.defence.defence_strength.len(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeMetrics {
    pub progress: u32,
    pub timer: String,
    pub training_status: String,
    pub status_line2: String,
}

impl Default for HomeMetrics {
    fn default() -> Self {
        Self {
            progress: 0,
            timer: "00:00:00".to_string(),
            training_status: STATUS_READY.to_string(),
            status_line2: STATUS_DATASET_LINE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub live_accuracy: MetricHistory<i64>,
    pub live_loss: MetricHistory,
    pub f1_score: MetricHistory<i64>,
    pub precision_recall: MetricHistory,
    pub gender_fairness: GenderFairness,
    /// Age groups 0-25, 26-40, 41-55, 56-70, 71-99
    pub age_fairness: [u32; 5],
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            live_accuracy: MetricHistory::default(),
            live_loss: MetricHistory::default(),
            f1_score: MetricHistory::default(),
            precision_recall: MetricHistory::default(),
            gender_fairness: GenderFairness { female: 85, male: 78 },
            age_fairness: [75, 82, 79, 85, 73],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GenderFairness {
    pub female: u32,
    pub male: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttackMetrics {
    pub gender_leakage: MetricHistory<i64>,
    pub age_leakage: MetricHistory<i64>,
    pub connection_status: bool,
}

impl Default for AttackMetrics {
    fn default() -> Self {
        Self {
            gender_leakage: MetricHistory::default(),
            age_leakage: MetricHistory::default(),
            connection_status: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DefenceMetrics {
    pub protection_active: bool,
    pub age_protection: f64,
    pub gender_protection: f64,
    pub age_leakage: f64,
    pub gender_leakage_score: f64,
    pub defence_strength: MetricHistory<i64>,
}

impl Default for DefenceMetrics {
    fn default() -> Self {
        Self {
            protection_active: false,
            age_protection: 92.8,
            gender_protection: 92.8,
            age_leakage: 92.8,
            gender_leakage_score: 92.8,
            defence_strength: MetricHistory::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let json = serde_json::to_value(LiveMetrics::default()).unwrap();

        assert_eq!(json["home"]["timer"], "00:00:00");
        assert_eq!(json["home"]["training_status"], STATUS_READY);
        assert_eq!(json["performance"]["gender_fairness"]["female"], 85);
        assert_eq!(json["performance"]["age_fairness"][4], 73);
        assert_eq!(json["performance"]["live_accuracy"], serde_json::json!([]));
        assert_eq!(json["attack"]["connection_status"], true);
        assert_eq!(json["defence"]["protection_active"], false);
        assert_eq!(json["defence"]["gender_leakage_score"], 92.8);
    }
}
