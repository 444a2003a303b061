//! Vitrine Telemetry - logging setup.
//!
//! This crate provides:
//! - Configurable logging setup with several formats and output streams
//! - Optional span events, timing the `present` and `expose` spans opened by
//!   `vitrine-core`
//! - With the `config` feature, conversion from `vitrine_config::Config`
//!
//! # Example
//!
//! ```rust,no_run
//! use vitrine_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), vitrine_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_span_events()
//!     .with_directive("vitrine_core=debug");
//! setup_logging(&config)?;
//! tracing::info!("rendering");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

/// Bridge from `vitrine_config::Config` to [`LogConfig`].
#[cfg(feature = "config")]
pub mod config_bridge;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
