//! Domain types for Skycast.
//!
//! - [`Units`]: Measurement system requested by the client
//! - [`WeatherReport`]: Normalized current conditions for one city
//! - [`Forecast`]: Normalized multi-day forecast
//! - [`cache_key`]: Deterministic key for a (city, units) pair

mod forecast;
mod key;
mod units;
mod weather;

pub use forecast::*;
pub use key::*;
pub use units::*;
pub use weather::*;
