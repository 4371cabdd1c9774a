// src/session/mod.rs

pub mod handler;
pub mod manager;
pub mod snapshot;

pub use handler::ws_handler;
pub use manager::{JoinError, SessionError, SessionManager, SessionSummary};
