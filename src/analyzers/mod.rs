//! Ridership aggregation and peak-hour hypothesis testing.
//!
//! This module ranks stations, summarizes metrics per line and per hour,
//! and compares peak against non-peak ridership with Welch's t-test.

pub mod aggregate;
pub mod analyzer;
pub mod distribution;
pub mod effect;
pub mod hypothesis;
pub mod types;
pub mod utility;
