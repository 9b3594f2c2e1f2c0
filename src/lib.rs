//! Solar + battery storage dispatch simulator.
//!
//! Runs a price-threshold battery dispatch over a year of hourly prices and
//! values the co-located solar plant and the project's cash flows.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod finance;
pub mod io;
pub mod market;
pub mod runner;
pub mod sensitivity;
pub mod series;
/// Threshold policy, dispatch state machine and summaries.
pub mod sim;
pub mod synthetic;

pub use error::{Error, Result};
