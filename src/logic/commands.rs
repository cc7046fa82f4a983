//! Command handlers for observer intents.
//!
//! A handler mutates the store and publishes exactly one event when the
//! command is valid. Invalid input and invalid transitions are dropped
//! silently: nothing changes and nothing is published.

use std::time::Duration;

use super::broadcast::EventHub;
use super::simulator::TrainingSimulator;
use super::store::SessionStore;
use crate::constants::{
    MSG_PROTECTION_RUNNING, MSG_PROTECTION_STOPPED, MSG_TRAINING_STARTED, MSG_TRAINING_STOPPED,
};
use crate::models::{
    ClientCommand, DashboardState, DefenceAction, ServerEvent, SwitchTabRequest, TrainingAction,
    UpdateConfigRequest,
};

/// Store, hub and simulator wired together
pub struct Dashboard {
    store: SessionStore,
    hub: EventHub,
    simulator: TrainingSimulator,
}

impl Dashboard {
    pub fn new(tick_interval: Duration, rng_seed: Option<u64>) -> Self {
        let store = SessionStore::new();
        let hub = EventHub::new();
        let simulator = TrainingSimulator::new(store.clone(), hub.clone(), tick_interval, rng_seed);

        Self { store, hub, simulator }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub fn simulator(&self) -> &TrainingSimulator {
        &self.simulator
    }

    /// Register an observer. Subscribing before taking the snapshot means
    /// nothing published in between is lost.
    pub fn connect(&self) -> (DashboardState, tokio::sync::broadcast::Receiver<ServerEvent>) {
        let rx = self.hub.subscribe();
        (self.store.snapshot(), rx)
    }

    /// Decode a raw frame and apply it. Undecodable frames are dropped.
    pub fn handle_frame(&self, frame: &str) -> bool {
        match serde_json::from_str::<ClientCommand>(frame) {
            Ok(command) => self.handle(command),
            Err(e) => {
                tracing::debug!("Dropping undecodable frame: {}", e);
                false
            }
        }
    }

    /// Apply a command; `true` when it changed state and was broadcast
    pub fn handle(&self, command: ClientCommand) -> bool {
        let name = command.name();
        let applied = match command {
            ClientCommand::SwitchTab(req) => self.switch_tab(req),
            ClientCommand::UpdateConfig(req) => self.update_config(req),
            ClientCommand::TrainingControl { action } => self.training_control(action),
            ClientCommand::DefenceControl { action } => self.defence_control(action),
        };

        if !applied {
            tracing::debug!("Command '{}' ignored", name);
        }
        applied
    }

    pub fn switch_tab(&self, req: SwitchTabRequest) -> bool {
        let Some(tab) = self.store.set_tab(req) else {
            return false;
        };

        self.hub.publish(ServerEvent::TabSwitched { tab });
        true
    }

    pub fn update_config(&self, req: UpdateConfigRequest) -> bool {
        let Some((field, value)) = self.store.update_config_field(&req.field, &req.value) else {
            return false;
        };

        tracing::info!("Config updated: {} = {}", field.as_str(), value);
        self.hub.publish(ServerEvent::ConfigUpdated { field, value });
        true
    }

    pub fn training_control(&self, action: TrainingAction) -> bool {
        match action {
            TrainingAction::Play => {
                if !self.simulator.start() {
                    return false;
                }
                self.hub.publish(ServerEvent::TrainingStarted {
                    message: MSG_TRAINING_STARTED.to_string(),
                });
            }
            TrainingAction::Stop => {
                if !self.simulator.stop() {
                    return false;
                }
                self.hub.publish(ServerEvent::TrainingStopped {
                    message: MSG_TRAINING_STOPPED.to_string(),
                });
            }
        }
        true
    }

    /// Always broadcasts, even when the flag already had the requested value.
    pub fn defence_control(&self, action: DefenceAction) -> bool {
        let (active, message) = match action {
            DefenceAction::RunProtection => (true, MSG_PROTECTION_RUNNING),
            DefenceAction::StopProtection => (false, MSG_PROTECTION_STOPPED),
        };

        let protection_active = self.store.set_protection(active);
        tracing::info!("Protection {}", if protection_active { "enabled" } else { "disabled" });
        self.hub.publish(ServerEvent::DefenceStatus {
            protection_active,
            message: message.to_string(),
        });
        true
    }

    pub async fn shutdown(&self) {
        self.simulator.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    fn dashboard() -> Dashboard {
        Dashboard::new(Duration::from_secs(5), Some(5))
    }

    fn frame(event: &str, data: serde_json::Value) -> String {
        json!({ "event": event, "data": data }).to_string()
    }

    #[test]
    fn test_connect_sends_snapshot() {
        let dash = dashboard();
        let (state, _rx) = dash.connect();

        assert_eq!(state.current_tab, "home");
        assert!(!state.training_active);
        assert_eq!(dash.hub().observer_count(), 1);
    }

    #[test]
    fn test_switch_tab_broadcasts() {
        let dash = dashboard();
        let (_, mut rx) = dash.connect();

        assert!(dash.handle_frame(&frame("switch_tab", json!({ "tab": "performance" }))));

        match rx.try_recv().unwrap() {
            ServerEvent::TabSwitched { tab } => assert_eq!(tab, "performance"),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(dash.store().snapshot().current_tab, "performance");
    }

    #[test]
    fn test_update_config_valid_and_bogus() {
        let dash = dashboard();
        let (_, mut rx) = dash.connect();

        assert!(dash.handle_frame(&frame(
            "update_config",
            json!({ "type": "data_percentage", "value": 10 })
        )));
        let event = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert_eq!(
            event,
            json!({ "event": "config_updated", "data": { "type": "data_percentage", "value": 10 } })
        );
        assert_eq!(dash.store().snapshot().config.data_percentage, 10);

        let before = dash.store().snapshot().config;
        assert!(!dash.handle_frame(&frame("update_config", json!({ "type": "bogus", "value": 1 }))));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(dash.store().snapshot().config, before);
    }

    #[test]
    fn test_garbage_frames_are_dropped() {
        let dash = dashboard();
        let (_, mut rx) = dash.connect();

        assert!(!dash.handle_frame("not json"));
        assert!(!dash.handle_frame(&frame("reboot", json!({}))));
        assert!(!dash.handle_frame(&frame("training_control", json!({ "action": "pause" }))));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_defence_toggle_always_broadcasts() {
        let dash = dashboard();
        let (_, mut rx) = dash.connect();

        for _ in 0..2 {
            assert!(dash.defence_control(DefenceAction::RunProtection));
            match rx.try_recv().unwrap() {
                ServerEvent::DefenceStatus { protection_active, message } => {
                    assert!(protection_active);
                    assert_eq!(message, MSG_PROTECTION_RUNNING);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert!(dash.store().snapshot().metrics.defence.protection_active);

        assert!(dash.defence_control(DefenceAction::StopProtection));
        match rx.try_recv().unwrap() {
            ServerEvent::DefenceStatus { protection_active, message } => {
                assert!(!protection_active);
                assert_eq!(message, MSG_PROTECTION_STOPPED);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_training_transitions_emit_once() {
        let dash = dashboard();
        let (_, mut rx) = dash.connect();

        assert!(!dash.training_control(TrainingAction::Stop));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        assert!(dash.training_control(TrainingAction::Play));
        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::TrainingStarted { .. }));

        let before = dash.store().snapshot().config;
        assert!(!dash.training_control(TrainingAction::Play));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(dash.store().snapshot().config, before);

        assert!(dash.training_control(TrainingAction::Stop));
        match rx.try_recv().unwrap() {
            ServerEvent::TrainingStopped { message } => assert_eq!(message, MSG_TRAINING_STOPPED),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!dash.store().is_training());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_to_completion() {
        let dash = dashboard();
        let (_, mut rx) = dash.connect();
        dash.training_control(TrainingAction::Play);

        let mut completed_at = None;
        for _ in 0..60 {
            let ServerEvent::MetricsUpdate(update) = rx.recv().await.unwrap() else {
                continue;
            };
            let position = (update.config.current_round, update.config.current_epoch);

            if let Some(frozen) = completed_at {
                assert_eq!(position, frozen);
                assert_eq!(update.metrics.home.training_status, "Training Completed Successfully");
            } else if update.config.progress == 100 {
                completed_at = Some(position);
            }
        }

        assert!(completed_at.is_some());
        let snapshot = dash.store().snapshot();
        assert_eq!(snapshot.metrics.history_lens(), [crate::constants::HISTORY_LIMIT; 7]);
        dash.shutdown().await;
    }
}
