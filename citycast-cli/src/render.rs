//! Human and JSON output for a looked-up record.

use citycast_core::{ThemeSpec, WeatherRecord, classify};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub record: &'a WeatherRecord,
    pub theme: ThemeSpec,
}

impl<'a> Report<'a> {
    pub fn new(record: &'a WeatherRecord) -> Self {
        Self { record, theme: classify(record.temperature, &record.description) }
    }

    pub fn to_text(&self) -> String {
        let t = &self.theme;
        format!(
            "{city}\n  {temp}°C, {desc}\n  theme: {kind} ({icon}), {start} -> {end}, text {text}",
            city = self.record.city,
            temp = self.record.temperature,
            desc = self.record.description,
            kind = t.kind,
            icon = t.icon_id,
            start = t.gradient_start,
            end = t.gradient_end,
            text = t.text_color(),
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
