use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use foundation::LatLon;
use layers::marker::{MarkerEncoder, DEFAULT_SIZE_FACTOR};
use layers::symbology::{BoundaryStyle, ColorScaleConfig, Rgb};
use scene::{SessionConfig, Variant};
use thiserror::Error;

pub const DEFAULT_EARTHQUAKES_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";
pub const DEFAULT_PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// The weekly USGS feed runs to a few megabytes; leave generous headroom.
pub const DEFAULT_MAX_FEED_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("min zoom {min} is above max zoom {max}")]
    ZoomRange { min: u8, max: u8 },
    #[error("depth domain [{min}, {max}] is empty")]
    EmptyDomain { min: f64, max: f64 },
    #[error("invalid boundary colour: {0} (expected #rrggbb)")]
    BoundaryColor(String),
    #[error("fetch timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Earthquake and tectonic plate map server")]
pub struct Args {
    /// Listen address
    #[arg(long, env = "QUAKEMAP_ADDR", default_value = "127.0.0.1:9200")]
    pub addr: SocketAddr,

    /// Page variant: basic (earthquakes only) or tectonic
    #[arg(long, env = "QUAKEMAP_VARIANT", default_value = "tectonic")]
    pub variant: Variant,

    /// GeoJSON earthquake feed
    #[arg(long, env = "QUAKEMAP_EARTHQUAKES_URL", default_value = DEFAULT_EARTHQUAKES_URL)]
    pub earthquakes_url: String,

    /// GeoJSON plate boundary feed (tectonic variant only)
    #[arg(long, env = "QUAKEMAP_PLATES_URL", default_value = DEFAULT_PLATES_URL)]
    pub plates_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "QUAKEMAP_FETCH_TIMEOUT_S", default_value_t = 30)]
    pub fetch_timeout_s: u64,

    /// Largest feed body accepted, in bytes
    #[arg(long, env = "QUAKEMAP_MAX_FEED_BYTES", default_value_t = DEFAULT_MAX_FEED_BYTES)]
    pub max_feed_bytes: usize,

    #[arg(long, default_value_t = 37.7749, allow_hyphen_values = true)]
    pub center_lat: f64,

    #[arg(long, default_value_t = -122.4194, allow_hyphen_values = true)]
    pub center_lon: f64,

    #[arg(long, default_value_t = 5)]
    pub zoom: u8,

    #[arg(long, default_value_t = 0)]
    pub min_zoom: u8,

    #[arg(long, default_value_t = 18)]
    pub max_zoom: u8,

    /// Marker radius in pixels per unit of magnitude
    #[arg(long, default_value_t = DEFAULT_SIZE_FACTOR)]
    pub size_factor: f64,

    /// Depth (km) mapped to the low end of the colour scale
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub depth_min: f64,

    /// Depth (km) mapped to the high end of the colour scale
    #[arg(long, default_value_t = 500.0)]
    pub depth_max: f64,

    /// Plate boundary line colour
    #[arg(long, env = "QUAKEMAP_BOUNDARY_COLOR", default_value = "#ff7800")]
    pub boundary_color: String,
}

/// Process-level settings that live outside the map session.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub earthquakes_url: String,
    /// `None` when the variant has no plate overlay.
    pub plates_url: Option<String>,
    pub fetch_timeout: Duration,
    pub max_feed_bytes: usize,
}

impl Args {
    pub fn into_configs(self) -> Result<(AppConfig, SessionConfig), ConfigError> {
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::ZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !(self.depth_max > self.depth_min) {
            return Err(ConfigError::EmptyDomain {
                min: self.depth_min,
                max: self.depth_max,
            });
        }
        if self.fetch_timeout_s == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let color = Rgb::from_hex(&self.boundary_color)
            .ok_or_else(|| ConfigError::BoundaryColor(self.boundary_color.clone()))?;

        let session = SessionConfig {
            center: LatLon::new(self.center_lat, self.center_lon),
            zoom: self.zoom.clamp(self.min_zoom, self.max_zoom),
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            encoder: MarkerEncoder::with_size_factor(self.size_factor),
            color_scale: ColorScaleConfig::new(self.depth_min, self.depth_max),
            boundary_style: BoundaryStyle {
                color,
                ..BoundaryStyle::default()
            },
            ..SessionConfig::for_variant(self.variant)
        };

        let app = AppConfig {
            addr: self.addr,
            earthquakes_url: self.earthquakes_url,
            plates_url: (self.variant == Variant::Tectonic).then_some(self.plates_url),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_s),
            max_feed_bytes: self.max_feed_bytes,
        };
        Ok((app, session))
    }
}
