use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    codes,
    config::Config,
    error::LookupError,
    model::{GeoResult, WeatherQuery, WeatherRecord},
};

use super::WeatherLookup;

const USER_AGENT: &str = concat!("citycast/", env!("CARGO_PKG_VERSION"));

/// Open-Meteo geocoding + current conditions. No API key needed.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    geocoding_url: String,
    weather_url: String,
}

impl OpenMeteoClient {
    pub fn new(
        geocoding_url: impl Into<String>,
        weather_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            http: http_client(None)?,
            geocoding_url: geocoding_url.into(),
            weather_url: weather_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            http: http_client(config.timeout())?,
            geocoding_url: config.geocoding_url.clone(),
            weather_url: config.weather_url.clone(),
        })
    }

    /// First (highest ranked) geocoding match for `query`.
    pub async fn geocode(&self, query: &WeatherQuery) -> Result<GeoResult, LookupError> {
        tracing::debug!(city = query.city(), "geocoding");

        let req = self.http.get(&self.geocoding_url).query(&[
            ("name", query.city()),
            ("count", "1"),
            ("language", "en"),
            ("format", "json"),
        ]);
        let body = send(req, "geocoding").await?;

        let parsed: GeoResponse = serde_json::from_str(&body).map_err(|e| {
            LookupError::MalformedResponse(format!("geocoding response: {e}"))
        })?;

        let first = parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::CityNotFound(query.city().to_string()))?;

        tracing::debug!(
            resolved = %first.name,
            latitude = first.latitude,
            longitude = first.longitude,
            "geocoded"
        );

        Ok(GeoResult {
            latitude: first.latitude,
            longitude: first.longitude,
            resolved_name: first.name,
        })
    }

    /// Current conditions at `geo`, reported under its resolved name.
    pub async fn current_conditions(&self, geo: &GeoResult) -> Result<WeatherRecord, LookupError> {
        let req = self.http.get(&self.weather_url).query(&[
            ("latitude", geo.latitude.to_string()),
            ("longitude", geo.longitude.to_string()),
            ("current", "temperature_2m,weather_code".to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", "1".to_string()),
        ]);
        let body = send(req, "weather").await?;

        let parsed: ForecastResponse = serde_json::from_str(&body).map_err(|e| {
            LookupError::MalformedResponse(format!("weather response: {e}"))
        })?;

        let current = parsed.current.ok_or_else(|| {
            LookupError::MalformedResponse("weather response has no current conditions".into())
        })?;
        let temperature = current.temperature_2m.ok_or_else(|| {
            LookupError::MalformedResponse("current conditions missing temperature_2m".into())
        })?;
        let code = current.weather_code.ok_or_else(|| {
            LookupError::MalformedResponse("current conditions missing weather_code".into())
        })?;

        Ok(WeatherRecord::new(
            geo.resolved_name.clone(),
            temperature,
            codes::describe(code).to_string(),
        ))
    }
}

#[async_trait]
impl WeatherLookup for OpenMeteoClient {
    async fn lookup(&self, city_name: &str) -> Result<WeatherRecord, LookupError> {
        let query = WeatherQuery::new(city_name)?;
        let geo = self.geocode(&query).await?;
        let record = self.current_conditions(&geo).await?;

        tracing::info!(
            city = %record.city,
            temperature = record.temperature,
            description = %record.description,
            "weather lookup complete"
        );

        Ok(record)
    }
}

fn http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Send `req` and return the body of a successful response.
async fn send(req: reqwest::RequestBuilder, what: &str) -> Result<String, LookupError> {
    let res = req
        .send()
        .await
        .map_err(|e| LookupError::NetworkError(format!("{what} request failed: {e}")))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| LookupError::NetworkError(format!("failed to read {what} response: {e}")))?;

    if !status.is_success() {
        tracing::warn!(%status, "{what} request rejected");
        return Err(LookupError::NetworkError(format!(
            "{what} request failed with status {status}: {}",
            truncate_body(&body)
        )));
    }

    Ok(body)
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    results: Option<Vec<GeoEntry>>,
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    latitude: f64,
    longitude: f64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentEntry>,
}

#[derive(Debug, Deserialize)]
struct CurrentEntry {
    temperature_2m: Option<f64>,
    weather_code: Option<i32>,
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
