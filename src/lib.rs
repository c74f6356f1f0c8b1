// src/lib.rs
//! Loads legislative bulk-data CSV exports into per-region PostgreSQL
//! databases.

pub mod batch;
pub mod config;
pub mod error;
pub mod process;
pub mod schema;
pub mod store;

pub use config::Settings;
pub use error::LoadError;
