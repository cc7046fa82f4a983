//! Data models

pub mod history;
pub mod session;
pub mod metrics;
pub mod events;

pub use session::*;
pub use metrics::*;
pub use events::*;
