//! Wire events exchanged with dashboard observers.
//!
//! Every frame is `{"event": <name>, "data": <payload>}` in both directions.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::metrics::LiveMetrics;
use super::session::{ConfigField, SessionConfig};
use crate::constants::DEFAULT_TAB;

// ============================================================================
// CLIENT -> SERVER
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    SwitchTab(SwitchTabRequest),
    UpdateConfig(UpdateConfigRequest),
    TrainingControl { action: TrainingAction },
    DefenceControl { action: DefenceAction },
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SwitchTab(_) => "switch_tab",
            Self::UpdateConfig(_) => "update_config",
            Self::TrainingControl { .. } => "training_control",
            Self::DefenceControl { .. } => "defence_control",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SwitchTabRequest {
    #[serde(default = "default_tab")]
    #[validate(length(min = 1, max = 32))]
    pub tab: String,
}

fn default_tab() -> String {
    DEFAULT_TAB.to_string()
}

/// Field name stays a raw string so unknown keys are dropped by the
/// allow-list instead of failing the whole frame.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConfigRequest {
    #[serde(rename = "type")]
    pub field: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingAction {
    Play,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenceAction {
    RunProtection,
    StopProtection,
}

// ============================================================================
// SERVER -> CLIENT
// ============================================================================

/// Full dashboard snapshot, sent to an observer when it connects
#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    pub current_tab: String,
    pub config: SessionConfig,
    pub metrics: LiveMetrics,
    pub training_active: bool,
}

/// Per-tick snapshot
#[derive(Debug, Clone, Serialize)]
pub struct MetricsUpdate {
    pub config: SessionConfig,
    pub metrics: LiveMetrics,
    pub training_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    DashboardState(DashboardState),
    TabSwitched {
        tab: String,
    },
    ConfigUpdated {
        #[serde(rename = "type")]
        field: ConfigField,
        value: u32,
    },
    TrainingStarted {
        message: String,
    },
    TrainingStopped {
        message: String,
    },
    MetricsUpdate(MetricsUpdate),
    DefenceStatus {
        protection_active: bool,
        message: String,
    },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DashboardState(_) => "dashboard_state",
            Self::TabSwitched { .. } => "tab_switched",
            Self::ConfigUpdated { .. } => "config_updated",
            Self::TrainingStarted { .. } => "training_started",
            Self::TrainingStopped { .. } => "training_stopped",
            Self::MetricsUpdate(_) => "metrics_update",
            Self::DefenceStatus { .. } => "defence_status",
        }
    }
}
