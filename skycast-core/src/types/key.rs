//! City validation and cache key construction.

use crate::constants::{FORECAST_KEY_PREFIX, MIN_CITY_NAME_LEN};
use crate::error::{Result, SkycastError};
use crate::types::Units;

/// Trims a city name and rejects ones shorter than two characters.
pub fn validate_city(city: &str) -> Result<&str> {
    let trimmed = city.trim();
    if trimmed.chars().count() < MIN_CITY_NAME_LEN {
        return Err(SkycastError::InvalidCity(format!(
            "\"{}\" must be at least {} characters",
            trimmed, MIN_CITY_NAME_LEN
        )));
    }
    Ok(trimmed)
}

/// Builds the cache key for current conditions: `<lowercase city>_<units>`.
///
/// The same city under different unit systems maps to distinct keys.
pub fn cache_key(city: &str, units: Units) -> String {
    format!("{}_{}", city.trim().to_lowercase(), units.as_str())
}

/// Builds the cache key for a forecast of `days` days.
pub fn forecast_cache_key(city: &str, units: Units, days: u32) -> String {
    format!("{}{}_{}d", FORECAST_KEY_PREFIX, cache_key(city, units), days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cache_key_normalizes_city() {
        assert_eq!(cache_key("London", Units::Metric), "london_metric");
        assert_eq!(cache_key("  NEW York ", Units::Imperial), "new york_imperial");
    }

    #[test]
    fn test_forecast_key_is_distinct() {
        let current = cache_key("Paris", Units::Metric);
        let forecast = forecast_cache_key("Paris", Units::Metric, 5);
        assert_ne!(current, forecast);
        assert_eq!(forecast, "forecast:paris_metric_5d");
    }

    #[test]
    fn test_validate_city() {
        assert_eq!(validate_city("  Tokyo ").unwrap(), "Tokyo");
        assert!(validate_city("").is_err());
        assert!(validate_city(" A ").is_err());
        assert!(validate_city("Ōe").is_ok());
    }

    proptest! {
        #[test]
        fn prop_units_never_share_a_key(city in "[a-zA-Z ]{2,24}") {
            let metric = cache_key(&city, Units::Metric);
            let imperial = cache_key(&city, Units::Imperial);
            let standard = cache_key(&city, Units::Standard);
            prop_assert_ne!(&metric, &imperial);
            prop_assert_ne!(&metric, &standard);
            prop_assert_ne!(&imperial, &standard);
        }

        #[test]
        fn prop_key_ignores_case(city in "[a-zA-Z]{2,24}") {
            prop_assert_eq!(
                cache_key(&city.to_uppercase(), Units::Metric),
                cache_key(&city.to_lowercase(), Units::Metric)
            );
        }
    }
}
