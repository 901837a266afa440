//! Recipe Box Core - Shared types library.
//!
//! This crate provides the types used across all Recipe Box components:
//! - `web` - The recipe web application
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and their pure state transitions - no I/O,
//! no database access, no HTTP. Everything that talks to a collaborator lives in
//! `recipe-box-web`.
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, ingredient rows, drafts, recipes and session gate states

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
