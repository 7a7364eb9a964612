//! Core library for the kitflow uniform-ordering service.
//!
//! The [`ordering`] module holds the domain model, the eligibility ledger,
//! bulk batch processing, and the order lifecycle. Binaries wire in their
//! own repository implementations behind the traits in
//! [`ordering::repository`].

pub mod config;
pub mod error;
pub mod ordering;
pub mod telemetry;

pub use config::{AppConfig, AppEnvironment, ConfigError, ServerConfig, TelemetryConfig};
pub use error::AppError;
