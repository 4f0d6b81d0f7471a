//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `storefront` - Read-model API and function endpoints
//! - `cli` - Command-line tools for migrations and admin jobs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Anything that talks to the remote store lives in the
//! storefront crate behind a trait, so these types can be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, entities, content blocks and listing order

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
