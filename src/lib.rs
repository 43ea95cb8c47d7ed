//! Sociora Backend Library
//!
//! Append-only transaction ledger plus the investment and revenue services
//! and REST API built on it. Exposed for the server binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod ledger;
pub mod middleware;
pub mod services;
