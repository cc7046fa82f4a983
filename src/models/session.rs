//! Session model: training configuration, editable fields and run state

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::constants::{
    DEFAULT_DATASET, DEFAULT_DATA_PERCENTAGE, DEFAULT_EPOCHS_PER_ROUND, DEFAULT_FEDERATED_ROUNDS,
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub dataset: String,
    pub data_percentage: u32,
    pub federated_rounds: u32,
    pub epochs_per_round: u32,
    pub current_round: u32,
    pub current_epoch: u32,
    pub progress: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            data_percentage: DEFAULT_DATA_PERCENTAGE,
            federated_rounds: DEFAULT_FEDERATED_ROUNDS,
            epochs_per_round: DEFAULT_EPOCHS_PER_ROUND,
            current_round: 1,
            current_epoch: 1,
            progress: 0,
        }
    }
}

impl SessionConfig {
    /// Rewind round, epoch and progress to the beginning of a run
    pub fn reset_progress(&mut self) {
        self.progress = 0;
        self.current_round = 1;
        self.current_epoch = 1;
    }

    /// Write an allow-listed field. Round and epoch are pulled back inside
    /// the new bounds when the totals shrink.
    pub fn apply(&mut self, field: ConfigField, value: u32) {
        match field {
            ConfigField::DataPercentage => self.data_percentage = value,
            ConfigField::FederatedRounds => {
                self.federated_rounds = value;
                self.current_round = self.current_round.min(value);
            }
            ConfigField::EpochsPerRound => {
                self.epochs_per_round = value;
                self.current_epoch = self.current_epoch.min(value);
            }
        }
    }

    /// Move to the next epoch, rolling into the next round and wrapping the
    /// round counter after the last one.
    pub fn advance_epoch(&mut self) {
        self.current_epoch += 1;
        if self.current_epoch > self.epochs_per_round {
            self.current_epoch = 1;
            self.current_round += 1;
            if self.current_round > self.federated_rounds {
                self.current_round = 1;
            }
        }
    }
}

/// Config fields editable from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigField {
    DataPercentage,
    FederatedRounds,
    EpochsPerRound,
}

impl ConfigField {
    /// Allow-list lookup; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "data_percentage" => Some(Self::DataPercentage),
            "federated_rounds" => Some(Self::FederatedRounds),
            "epochs_per_round" => Some(Self::EpochsPerRound),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataPercentage => "data_percentage",
            Self::FederatedRounds => "federated_rounds",
            Self::EpochsPerRound => "epochs_per_round",
        }
    }

    pub fn bounds(&self) -> RangeInclusive<u32> {
        match self {
            Self::DataPercentage => 1..=100,
            Self::FederatedRounds | Self::EpochsPerRound => 1..=u32::MAX,
        }
    }

    /// Accepts JSON integers and numeric strings inside the field bounds
    pub fn coerce(&self, value: &serde_json::Value) -> Option<u32> {
        let raw = match value {
            serde_json::Value::Number(n) => n.as_u64()?,
            serde_json::Value::String(s) => s.trim().parse::<u64>().ok()?,
            _ => return None,
        };
        let value = u32::try_from(raw).ok()?;
        self.bounds().contains(&value).then_some(value)
    }
}

/// Training run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running { started_at: Instant },
}

#[derive(Debug, Clone)]
pub struct TrainingSession {
    pub phase: SessionPhase,
    pub elapsed_secs: u64,
    /// Bumped on every Idle -> Running transition
    pub generation: u64,
}

impl Default for TrainingSession {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            elapsed_secs: 0,
            generation: 0,
        }
    }
}

impl TrainingSession {
    pub fn is_running(&self) -> bool {
        matches!(self.phase, SessionPhase::Running { .. })
    }

    /// Running, and still the run identified by `generation`
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && self.generation == generation
    }

    pub fn started_at(&self) -> Option<Instant> {
        match self.phase {
            SessionPhase::Running { started_at } => Some(started_at),
            SessionPhase::Idle => None,
        }
    }
}

/// Render seconds as `HH:MM:SS`
pub fn format_elapsed(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(5), "00:00:05");
        assert_eq!(format_elapsed(3725), "01:02:05");
    }

    #[test]
    fn test_field_allow_list() {
        assert_eq!(ConfigField::parse("data_percentage"), Some(ConfigField::DataPercentage));
        assert_eq!(ConfigField::parse("epochs_per_round"), Some(ConfigField::EpochsPerRound));
        assert_eq!(ConfigField::parse("dataset"), None);
        assert_eq!(ConfigField::parse("bogus"), None);
    }

    #[test]
    fn test_coerce_values() {
        let field = ConfigField::DataPercentage;
        assert_eq!(field.coerce(&json!(10)), Some(10));
        assert_eq!(field.coerce(&json!("25")), Some(25));
        assert_eq!(field.coerce(&json!(0)), None);
        assert_eq!(field.coerce(&json!(101)), None);
        assert_eq!(field.coerce(&json!(-3)), None);
        assert_eq!(field.coerce(&json!(2.5)), None);
        assert_eq!(field.coerce(&json!(null)), None);
    }

    #[test]
    fn test_epoch_wraps_into_next_round() {
        let mut config = SessionConfig::default();
        config.advance_epoch();
        config.advance_epoch();
        assert_eq!((config.current_round, config.current_epoch), (1, 3));

        config.advance_epoch();
        assert_eq!((config.current_round, config.current_epoch), (2, 1));

        for _ in 0..3 {
            config.advance_epoch();
        }
        assert_eq!((config.current_round, config.current_epoch), (1, 1));
    }

    #[test]
    fn test_shrinking_totals_clamps_position() {
        let mut config = SessionConfig {
            current_round: 4,
            current_epoch: 5,
            federated_rounds: 6,
            epochs_per_round: 6,
            ..SessionConfig::default()
        };

        config.apply(ConfigField::FederatedRounds, 2);
        config.apply(ConfigField::EpochsPerRound, 3);

        assert_eq!(config.current_round, 2);
        assert_eq!(config.current_epoch, 3);
    }
}
