//! Session Store - single owner of tab, config, metrics and run state.
//!
//! Command handlers and the simulator tick both mutate through the same
//! mutex, so a tick never observes half of a config edit and vice versa.
//! Critical sections never await.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;
use validator::Validate;

use crate::constants::DEFAULT_TAB;
use crate::models::{
    ConfigField, DashboardState, LiveMetrics, MetricsUpdate, SessionConfig, SessionPhase,
    SwitchTabRequest, TrainingSession,
};

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct SessionState {
    pub current_tab: String,
    pub config: SessionConfig,
    pub metrics: LiveMetrics,
    pub session: TrainingSession,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_tab: DEFAULT_TAB.to_string(),
            config: SessionConfig::default(),
            metrics: LiveMetrics::default(),
            session: TrainingSession::default(),
        }
    }
}

impl SessionState {
    pub fn training_active(&self) -> bool {
        self.session.is_running()
    }

    pub fn dashboard_state(&self) -> DashboardState {
        DashboardState {
            current_tab: self.current_tab.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            training_active: self.training_active(),
        }
    }

    pub fn metrics_update(&self) -> MetricsUpdate {
        MetricsUpdate {
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            training_active: self.training_active(),
        }
    }
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent copy of everything an observer needs
    pub fn snapshot(&self) -> DashboardState {
        self.inner.lock().dashboard_state()
    }

    pub fn is_training(&self) -> bool {
        self.inner.lock().training_active()
    }

    /// Select the active tab. Returns the stored name, or `None` when the
    /// name is blank or too long.
    pub fn set_tab(&self, request: SwitchTabRequest) -> Option<String> {
        let request = SwitchTabRequest {
            tab: request.tab.trim().to_string(),
        };
        if request.validate().is_err() {
            return None;
        }

        let mut state = self.inner.lock();
        state.current_tab = request.tab.clone();
        Some(request.tab)
    }

    /// Write an allow-listed config field. Unknown fields and out-of-range
    /// values leave the store untouched and return `None`.
    pub fn update_config_field(
        &self,
        field: &str,
        value: &serde_json::Value,
    ) -> Option<(ConfigField, u32)> {
        let field = ConfigField::parse(field)?;
        let value = field.coerce(value)?;

        self.inner.lock().config.apply(field, value);
        Some((field, value))
    }

    /// Idle -> Running. Resets the run counters and returns the new session
    /// generation; `None` if already running.
    pub fn begin_session(&self, now: Instant) -> Option<u64> {
        let mut state = self.inner.lock();
        if state.session.is_running() {
            return None;
        }

        state.session.generation += 1;
        state.session.phase = SessionPhase::Running { started_at: now };
        state.session.elapsed_secs = 0;
        state.config.reset_progress();
        state.metrics.home.progress = 0;
        Some(state.session.generation)
    }

    /// Running -> Idle; `false` if already idle.
    pub fn end_session(&self) -> bool {
        let mut state = self.inner.lock();
        if !state.session.is_running() {
            return false;
        }

        state.session.phase = SessionPhase::Idle;
        true
    }

    /// Set the protection flag. No transition guard: the caller always
    /// reports the new value.
    pub fn set_protection(&self, active: bool) -> bool {
        self.inner.lock().metrics.defence.protection_active = active;
        active
    }

    /// Run `f` with exclusive access to the state
    pub fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.inner.lock();
        f(&mut state)
    }
}
