//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - The two-step city weather lookup (geocoding, then current conditions)
//! - The WMO weather code table
//! - Theme classification for presenting a weather record
//! - Configuration handling
//!
//! It is used by `citycast-cli`, but can also be reused by other front ends.

pub mod codes;
pub mod config;
pub mod error;
pub mod latest;
pub mod model;
pub mod provider;
pub mod theme;

pub use config::Config;
pub use error::LookupError;
pub use latest::{LatestOnly, Ticket};
pub use model::{GeoResult, WeatherQuery, WeatherRecord};
pub use provider::{OpenMeteoClient, WeatherLookup};
pub use theme::{Color, ThemeKind, ThemeSpec, classify};
