//! Record-to-marker encoding.
//!
//! Everything here is pure: the same record and colour scale always give the
//! same [`MarkerStyle`].

use formats::EarthquakeRecord;
use serde::Serialize;

use crate::symbology::{ColorScaleConfig, Rgb};

/// Pixels of radius per unit of magnitude.
pub const DEFAULT_SIZE_FACTOR: f64 = 5.0;

/// Field names follow Leaflet's path options, so the serialized style can be
/// handed to `L.circleMarker` as is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_color: Rgb,
    #[serde(rename = "color")]
    pub stroke_color: Rgb,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub popup: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct MarkerEncoder {
    pub size_factor: f64,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl Default for MarkerEncoder {
    fn default() -> Self {
        Self {
            size_factor: DEFAULT_SIZE_FACTOR,
            weight: 1.0,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

impl MarkerEncoder {
    pub fn with_size_factor(size_factor: f64) -> Self {
        Self {
            size_factor,
            ..Self::default()
        }
    }

    /// Not clamped: magnitudes at or below zero give a non-positive radius.
    pub fn radius(&self, magnitude: f64) -> f64 {
        magnitude * self.size_factor
    }

    pub fn encode(&self, record: &EarthquakeRecord, scale: &ColorScaleConfig) -> MarkerStyle {
        let color = scale.color_at(record.depth);
        MarkerStyle {
            radius: self.radius(record.magnitude),
            fill_color: color,
            stroke_color: color,
            weight: self.weight,
            opacity: self.opacity,
            fill_opacity: self.fill_opacity,
            popup: popup_html(record),
        }
    }
}

/// Encodes with the default size factor.
pub fn encode(record: &EarthquakeRecord, scale: &ColorScaleConfig) -> MarkerStyle {
    MarkerEncoder::default().encode(record, scale)
}

pub fn popup_html(record: &EarthquakeRecord) -> String {
    format!(
        "<div class=\"popup-content\">\
         <b>Location:</b> {}<br>\
         <b>Magnitude:</b> {}<br>\
         <b>Depth:</b> {} km<br>\
         <b>Time:</b> {}\
         </div>",
        escape_html(&record.place),
        record.magnitude,
        record.depth,
        record.timestamp.to_utc_string(),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
