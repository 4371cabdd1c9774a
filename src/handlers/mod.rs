// src/handlers/mod.rs

pub mod session_handler;
