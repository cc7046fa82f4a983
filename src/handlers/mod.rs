//! HTTP handlers

pub mod health;
pub mod state;
pub mod ws;
