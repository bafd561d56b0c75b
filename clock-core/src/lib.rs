//! Core library for the `climate-clock` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - The clock data provider (one HTTP fetch of the Climate Clock API)
//! - Domain models for the consumed modules
//! - Countdown and renewables computations plus the text report
//!
//! It is used by `climate-clock-cli`, but can also be reused by other binaries.

pub mod config;
pub mod countdown;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;

pub use config::Config;
pub use countdown::Countdown;
pub use error::{DataShapeError, RetrievalError};
pub use model::ClockSnapshot;
pub use provider::{ClockProvider, provider_from_config};
pub use report::{ClockReport, render};
