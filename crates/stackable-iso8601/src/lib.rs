//! This crate provides an ISO 8601 [`Duration`] which can be parsed from and formatted to
//! strings like `P3Y6M4DT12H30M5.5S`, and converted from and to a signed nanosecond count.
//!
//! ## Crate Features
//!
//! - `default` enables no optional integrations.
//! - `full` enables all available features.
//! - `chrono` enables interoperability between [`Duration`] and `chrono::TimeDelta`.
//! - `jiff` enables interoperability between [`Duration`] and `jiff::SignedDuration`.
//! - `time` enables interoperability between [`Duration`] and `time::Duration`.

pub mod duration;

pub use duration::{Duration, DurationParseError};
