//! Training Simulator - periodic ticker that drives the synthetic run.
//!
//! One ticker task per running session. `start` spawns it, `stop` only
//! flips the session to Idle; the ticker sees that on its next wake and
//! exits without touching the store or publishing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::broadcast::EventHub;
use super::store::{SessionState, SessionStore};
use crate::constants::{
    EPOCH_ADVANCE_PROBABILITY, HISTORY_LIMIT, STATUS_COMPLETED, STATUS_COMPLETED_LINE,
    TOTAL_SAMPLES,
};
use crate::models::{format_elapsed, ServerEvent};

// ============================================================================
// TICK
// ============================================================================

/// Advance a running session by one tick. Returns `false` without touching
/// anything when the session is idle.
pub fn advance(state: &mut SessionState, now: Instant, rng: &mut impl Rng) -> bool {
    let Some(started_at) = state.session.started_at() else {
        return false;
    };

    // 1. Timer
    state.session.elapsed_secs = now.saturating_duration_since(started_at).as_secs();
    state.metrics.home.timer = format_elapsed(state.session.elapsed_secs);

    // 2. Progress
    let config = &mut state.config;
    config.progress = (config.progress + rng.gen_range(2..=8)).min(100);
    state.metrics.home.progress = config.progress;

    // 3. Status, round and epoch
    let home = &mut state.metrics.home;
    if config.progress < 100 {
        home.training_status = format!(
            "Training Round {} - Epoch {}",
            config.current_round, config.current_epoch
        );
        home.status_line2 = format!(
            "Total Samples: {}  Current Round: {}  Current Epoch: {}",
            TOTAL_SAMPLES, config.current_round, config.current_epoch
        );

        if rng.gen_bool(EPOCH_ADVANCE_PROBABILITY) {
            config.advance_epoch();
        }
    } else {
        home.training_status = STATUS_COMPLETED.to_string();
        home.status_line2 = STATUS_COMPLETED_LINE.to_string();
    }

    // 4. Chart samples; histories cap themselves
    let perf = &mut state.metrics.performance;
    perf.live_accuracy.push(accuracy_sample(perf.live_accuracy.len(), rng));
    perf.live_loss.push(loss_sample(perf.live_loss.len(), rng));
    perf.f1_score.push(f1_sample(perf.f1_score.len(), rng));
    perf.precision_recall.push(precision_recall_sample(perf.precision_recall.len(), rng));

    let attack = &mut state.metrics.attack;
    attack.gender_leakage.push(gender_leakage_sample(rng));
    attack.age_leakage.push(age_leakage_sample(rng));

    let defence = &mut state.metrics.defence;
    defence.defence_strength.push(defence_strength_sample(rng));

    debug_assert!(state.metrics.history_lens().iter().all(|&len| len <= HISTORY_LIMIT));
    true
}

// Sample formulas. `n` is the history length before the push, so the
// trending series climb (or fall) as the chart fills up.

fn accuracy_sample(n: usize, rng: &mut impl Rng) -> i64 {
    (60 + rng.gen_range(-5..=15) + 2 * n as i64).clamp(50, 100)
}

fn loss_sample(n: usize, rng: &mut impl Rng) -> f64 {
    (2.0 - 0.1 * n as f64 + rng.gen_range(-0.2..0.1)).max(0.5)
}

fn f1_sample(n: usize, rng: &mut impl Rng) -> i64 {
    (50 + rng.gen_range(-5..=20) + 3 * n as i64).clamp(40, 100)
}

fn precision_recall_sample(n: usize, rng: &mut impl Rng) -> f64 {
    (55.0 + rng.gen_range(-10..=25) as f64 + 2.5 * n as f64).clamp(45.0, 100.0)
}

fn gender_leakage_sample(rng: &mut impl Rng) -> i64 {
    (50 + rng.gen_range(-20..=30)).clamp(0, 100)
}

fn age_leakage_sample(rng: &mut impl Rng) -> i64 {
    (20 + rng.gen_range(-10..=40)).clamp(0, 100)
}

fn defence_strength_sample(rng: &mut impl Rng) -> i64 {
    (5 + rng.gen_range(-2..=3)).clamp(1, 10)
}

// ============================================================================
// SIMULATOR
// ============================================================================

pub struct TrainingSimulator {
    store: SessionStore,
    hub: EventHub,
    interval: Duration,
    rng: Arc<Mutex<StdRng>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl TrainingSimulator {
    pub fn new(store: SessionStore, hub: EventHub, interval: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            hub,
            interval,
            rng: Arc::new(Mutex::new(rng)),
            ticker: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Idle -> Running and spawn the ticker. `false` when already running
    /// or after shutdown. Must be called inside a tokio runtime.
    pub fn start(&self) -> bool {
        // Held across begin + spawn so two racing starts cannot both spawn,
        // and so shutdown cannot slip in between the closed check and spawn.
        let mut ticker = self.ticker.lock();
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }

        let started_at = Instant::now();
        let Some(generation) = self.store.begin_session(started_at) else {
            return false;
        };

        // A ticker from the previous run may still be parked in its sleep.
        if let Some(stale) = ticker.take() {
            stale.abort();
        }

        *ticker = Some(tokio::spawn(run_ticker(
            self.store.clone(),
            self.hub.clone(),
            Arc::clone(&self.rng),
            self.interval,
            started_at,
            generation,
        )));

        tracing::info!("Training session #{} started (tick every {:?})", generation, self.interval);
        true
    }

    /// Running -> Idle. `false` when already idle.
    pub fn stop(&self) -> bool {
        if !self.store.end_session() {
            return false;
        }

        tracing::info!("Training session stopped");
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stop for good: force Idle, refuse new starts, release the ticker.
    pub async fn shutdown(&self) {
        let handle = {
            let mut ticker = self.ticker.lock();
            self.closed.store(true, Ordering::SeqCst);
            self.store.end_session();
            ticker.take()
        };
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }

        tracing::info!("Training simulator shut down");
    }
}

async fn run_ticker(
    store: SessionStore,
    hub: EventHub,
    rng: Arc<Mutex<StdRng>>,
    period: Duration,
    started_at: Instant,
    generation: u64,
) {
    let mut interval = tokio::time::interval_at(started_at + period, period);
    // After a stall, resume the cadence from now instead of catching up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!("Ticker for session #{} started", generation);

    loop {
        interval.tick().await;

        let update = {
            let mut rng = rng.lock();
            store.with_state(|state| {
                if !state.session.is_current(generation) {
                    return None;
                }
                advance(state, Instant::now(), &mut *rng);
                Some(state.metrics_update())
            })
        };

        let Some(update) = update else {
            break;
        };

        tracing::debug!(
            "Tick: progress {}%, timer {}, accuracy {:?}",
            update.config.progress,
            update.metrics.home.timer,
            update.metrics.performance.live_accuracy.latest()
        );
        hub.publish(ServerEvent::MetricsUpdate(update));
    }

    tracing::debug!("Ticker for session #{} exited", generation);
}
