// src/lib.rs
pub mod config;
pub mod error;
pub mod health;
pub mod query;
pub mod server;
