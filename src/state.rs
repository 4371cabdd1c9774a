// src/state.rs

use crate::config::Config;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub manager: SessionManager,
}
