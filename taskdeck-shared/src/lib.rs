//! # TaskDeck Shared Library
//!
//! This crate contains the types shared by everything that talks to the
//! TaskDeck backend.
//!
//! ## Module Organization
//!
//! - `models`: Organization, user, project, task and comment types
//! - `graphql`: Typed request/response contracts for every operation
//! - `validation`: Form inputs and per-field validation

pub mod graphql;
pub mod models;
pub mod validation;

/// Current version of the TaskDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
