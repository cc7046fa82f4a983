//! Dashboard core: session store, simulator, command handling and fan-out

pub mod broadcast;
pub mod store;
pub mod simulator;
pub mod commands;

pub use commands::Dashboard;
