use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// A validated, trimmed city name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    city: String,
}

impl WeatherQuery {
    pub fn new(city: &str) -> Result<Self, LookupError> {
        let trimmed = city.trim();
        if trimmed.is_empty() {
            return Err(LookupError::EmptyInput);
        }

        Ok(Self { city: trimmed.to_string() })
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

/// First geocoding match for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoResult {
    pub latitude: f64,
    pub longitude: f64,
    /// Provider's canonical name, which may differ from what was typed.
    pub resolved_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    /// Degrees Celsius, rounded.
    pub temperature: i32,
    pub description: String,
}

impl WeatherRecord {
    pub fn new(city: String, raw_temperature_c: f64, description: String) -> Self {
        Self {
            city,
            temperature: round_temperature(raw_temperature_c),
            description,
        }
    }
}

/// Nearest integer, halves away from zero. Values outside `i32` saturate.
pub fn round_temperature(raw: f64) -> i32 {
    raw.round() as i32
}
