use serde::{Deserialize, Serialize};

/// Edge length of a web-mercator tile in pixels.
pub const TILE_SIZE_PX: f64 = 256.0;
/// Latitude limit of the spherical web-mercator projection.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Position in global web-mercator pixel space at a given zoom.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Projects a position into global pixel space at `zoom`.
///
/// Latitudes beyond the mercator limit are clamped, matching what slippy-map
/// renderers do for points near the poles.
pub fn project_to_pixels(position: LatLon, zoom: u8) -> PixelPoint {
    let world = TILE_SIZE_PX * 2f64.powi(i32::from(zoom));
    let lat = position.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let sin_lat = lat.to_radians().sin();

    let x = world * (position.lon + 180.0) / 360.0;
    let y = world * (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI));
    PixelPoint { x, y }
}

/// Lat/lon bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: LatLon,
    pub north_east: LatLon,
}

impl GeoBounds {
    pub fn from_point(p: LatLon) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    pub fn extend(&mut self, p: LatLon) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lon = self.south_west.lon.min(p.lon);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lon = self.north_east.lon.max(p.lon);
    }

    pub fn of_points(points: impl IntoIterator<Item = LatLon>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn contains(&self, p: LatLon) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lon >= self.south_west.lon
            && p.lon <= self.north_east.lon
    }
}
