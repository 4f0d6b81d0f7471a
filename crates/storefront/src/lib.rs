//! Shopfront storefront library.
//!
//! Read-model API for the store's blog, catalog and banner, plus the
//! function endpoints for admin provisioning and product asset updates.
//! The binary in `main.rs` wires this library to `PostgreSQL` and the hosted
//! identity and storage services; tests wire it to [`testing`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod functions;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use routes::app;
pub use state::{AppState, Backends};
