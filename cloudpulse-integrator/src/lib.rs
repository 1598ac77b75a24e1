//! `cloudpulse-integrator` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod cooldown;
pub mod evaluate;
pub mod integrator;
pub mod models;
pub mod sink;
pub mod source;
