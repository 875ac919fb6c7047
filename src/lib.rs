//! Perks Core - Loyalty Platform Backend
//!
//! This crate provides the core backend of the Perks loyalty platform:
//! the enrollment response workflow, loyalty card issuance, notification
//! fan-out and sync event emission, served over a REST API.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod migration;
pub mod openapi;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod sync;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
