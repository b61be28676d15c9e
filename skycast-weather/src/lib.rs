//! Weather providers for Skycast.
//!
//! - [`OpenWeatherClient`]: live data from the OpenWeatherMap REST API
//! - [`MockWeatherProvider`]: fixed city table with random jitter, no network
//!
//! Both implement [`skycast_core::WeatherProvider`] and return the same
//! normalized [`skycast_core::WeatherReport`].

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod format;
mod mock;
mod openweather;

pub use mock::MockWeatherProvider;
pub use openweather::{OpenWeatherClient, WeatherClientConfig};
