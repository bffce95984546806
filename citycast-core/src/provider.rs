use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::LookupError, model::WeatherRecord};

pub mod openmeteo;

pub use openmeteo::OpenMeteoClient;

/// Resolves a free-text city name to its current weather.
#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    async fn lookup(&self, city_name: &str) -> Result<WeatherRecord, LookupError>;
}
