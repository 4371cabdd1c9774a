// src/lib.rs

pub mod config;
pub mod error;
pub mod game;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
