//! Central Configuration Constants
//!
//! Single source of truth for session defaults and fixed dashboard texts.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "HYBRIDVFL Dashboard";

// ============================================
// Server defaults
// ============================================

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5050;

/// Default simulator tick interval (seconds)
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 5;

/// Broadcast channel capacity per observer before it starts lagging
pub const BROADCAST_CAPACITY: usize = 256;

// ============================================
// Session defaults
// ============================================

pub const DEFAULT_DATASET: &str = "HAM10K";
pub const DEFAULT_DATA_PERCENTAGE: u32 = 5;
pub const DEFAULT_FEDERATED_ROUNDS: u32 = 2;
pub const DEFAULT_EPOCHS_PER_ROUND: u32 = 3;
pub const DEFAULT_TAB: &str = "home";

/// Every metric history keeps at most this many samples
pub const HISTORY_LIMIT: usize = 20;

/// Chance that a tick moves the session to the next epoch
pub const EPOCH_ADVANCE_PROBABILITY: f64 = 0.3;

/// Sample count shown on the home status line
pub const TOTAL_SAMPLES: u32 = 1002;

// ============================================
// Dashboard texts
// ============================================

pub const STATUS_READY: &str = "Ready to start training";
pub const STATUS_DATASET_LINE: &str = "HAM10K - Skin Cancer Classification";
pub const STATUS_COMPLETED: &str = "Training Completed Successfully";
pub const STATUS_COMPLETED_LINE: &str = "Model ready for evaluation";

pub const MSG_TRAINING_STARTED: &str = "Training started";
pub const MSG_TRAINING_STOPPED: &str = "Training stopped";
pub const MSG_PROTECTION_RUNNING: &str = "Protection running - Confusing data inference";
pub const MSG_PROTECTION_STOPPED: &str = "Protection stopped - Data inference without protection";
