//! # TaskDeck Client Library
//!
//! Headless client for the TaskDeck project/task backend. It talks GraphQL
//! over HTTP, keeps a normalized cache with optimistic writes, mirrors the
//! server session and renders its views as text.
//!
//! ## Modules
//!
//! - `cache`: normalized cache, transactions and rollback
//! - `client`: typed operations against the backend
//! - `config`: configuration management
//! - `error`: error handling and user-facing messages
//! - `forms`: form controllers with local validation
//! - `routes`: routes and the authentication guard
//! - `session`: current user and session transitions
//! - `shell`: interactive command shell
//! - `transport`: HTTP and mock transports
//! - `views`: project list, dashboard and task board

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod routes;
pub mod session;
pub mod shell;
pub mod transport;
pub mod views;
