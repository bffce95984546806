//! WMO weather interpretation codes as reported by Open-Meteo.
//! See: https://open-meteo.com/en/docs#weathervariables

pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// Sorted by code.
pub const WEATHER_CODES: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (71, "Slight snow"),
    (73, "Moderate snow"),
    (75, "Heavy snow"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with hail"),
    (99, "Thunderstorm with heavy hail"),
];

/// Description for a weather code, or [`UNKNOWN_DESCRIPTION`].
pub fn describe(code: i32) -> &'static str {
    WEATHER_CODES
        .binary_search_by_key(&code, |(c, _)| *c)
        .map(|idx| WEATHER_CODES[idx].1)
        .unwrap_or(UNKNOWN_DESCRIPTION)
}
