//! # Skycast Core
//!
//! Core types, errors, and traits shared by every Skycast crate.
//!
//! - **Types**: Units, normalized weather reports and forecasts, cache keys
//! - **Errors**: `SkycastError` and the crate-wide `Result` alias
//! - **Constants**: Defaults for TTLs, timeouts, and validation limits
//! - **Traits**: `WeatherProvider`, implemented by the live and mock clients
//!
//! ## Example
//!
//! ```rust
//! use skycast_core::{cache_key, Units};
//!
//! assert_eq!(cache_key("  London ", Units::Metric), "london_metric");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, SkycastError};
pub use traits::*;
pub use types::*;
