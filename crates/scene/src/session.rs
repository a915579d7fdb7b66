//! Map session: the single owner of every layer on the page.
//!
//! Handlers are named methods on [`MapSession`]; the [`EventHandler`] impl
//! only routes [`MapEvent`]s to them.

use std::str::FromStr;
use std::sync::Arc;

use formats::{BoundaryFeature, EarthquakeFeed};
use foundation::LatLon;
use layers::boundary::{BoundaryLayer, BoundaryView};
use layers::cluster::{ClusterItem, ClusterLayer, ClusterOptions, ZoomScaling};
use layers::legend::{DEFAULT_BREAKPOINTS, Legend};
use layers::marker::MarkerEncoder;
use layers::symbology::{BoundaryStyle, ColorScaleConfig};
use layers::{Layer, OverlayState};
use runtime::{EventHandler, EventKind};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::composer::{
    BaseLayer, ComposeError, EARTHQUAKES_OVERLAY, MapComposer, OPENSTREETMAP, OverlayEntry,
    STAMEN_TERRAIN, STAMEN_TONER, TECTONIC_PLATES_OVERLAY,
};

const EARTHQUAKE_LAYER_ID: u64 = 1;
const BOUNDARY_LAYER_ID: u64 = 2;

/// Page variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Earthquakes on a single base map.
    Basic,
    /// Adds plate boundaries, extra base maps and a layer control.
    Tectonic,
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "part1" => Ok(Variant::Basic),
            "tectonic" | "part2" => Ok(Variant::Tectonic),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub variant: Variant,
    pub center: LatLon,
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub encoder: MarkerEncoder,
    pub color_scale: ColorScaleConfig,
    pub cluster: ClusterOptions,
    pub zoom_scaling: ZoomScaling,
    pub legend_breakpoints: Vec<f64>,
    pub boundary_style: BoundaryStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Tectonic,
            center: LatLon::new(37.7749, -122.4194),
            zoom: 5,
            min_zoom: 0,
            max_zoom: 18,
            encoder: MarkerEncoder::default(),
            color_scale: ColorScaleConfig::default(),
            cluster: ClusterOptions::default(),
            zoom_scaling: ZoomScaling::Fixed,
            legend_breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
            boundary_style: BoundaryStyle::default(),
        }
    }
}

impl SessionConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    ZoomEnd { zoom: u8 },
    BaseLayerChange { name: String },
    OverlayToggle { name: String, active: bool },
    EarthquakesLoaded(EarthquakeFeed),
    EarthquakesFailed { reason: String },
    BoundariesLoaded(Vec<BoundaryFeature>),
    BoundariesFailed { reason: String },
}

impl EventKind for MapEvent {
    fn kind(&self) -> &'static str {
        match self {
            MapEvent::ZoomEnd { .. } => "zoomend",
            MapEvent::BaseLayerChange { .. } => "baselayerchange",
            MapEvent::OverlayToggle { .. } => "overlaytoggle",
            MapEvent::EarthquakesLoaded(_) => "earthquakes_loaded",
            MapEvent::EarthquakesFailed { .. } => "earthquakes_failed",
            MapEvent::BoundariesLoaded(_) => "boundaries_loaded",
            MapEvent::BoundariesFailed { .. } => "boundaries_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub name: String,
    pub active: bool,
    pub state: OverlayState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarthquakeLayerView {
    pub state: OverlayState,
    pub count: usize,
    pub items: Vec<ClusterItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryLayerView {
    pub state: OverlayState,
    pub style: BoundaryStyle,
    pub features: Vec<BoundaryView>,
}

/// Everything the page needs to draw the current map state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub variant: Variant,
    pub center: LatLon,
    pub zoom: u8,
    pub base_layers: Vec<BaseLayer>,
    pub active_base: String,
    pub overlays: Vec<OverlayView>,
    pub show_layer_control: bool,
    /// `None` while the overlay is toggled off.
    pub earthquakes: Option<EarthquakeLayerView>,
    /// `None` while the overlay is toggled off or the variant has none.
    pub boundaries: Option<BoundaryLayerView>,
    pub legend: Legend,
}

#[derive(Debug, Clone)]
pub struct MapSession {
    config: SessionConfig,
    composer: MapComposer,
    earthquakes: ClusterLayer,
    boundaries: Option<BoundaryLayer>,
    legend: Legend,
    center: LatLon,
    zoom: u8,
}

impl MapSession {
    pub fn new(config: SessionConfig) -> Result<Self, ComposeError> {
        let color_scale = Arc::new(config.color_scale);

        let mut earthquakes =
            ClusterLayer::new(EARTHQUAKE_LAYER_ID, config.encoder, Arc::clone(&color_scale))
                .with_options(config.cluster)
                .with_zoom_scaling(config.zoom_scaling);
        let zoom = config.zoom.clamp(config.min_zoom, config.max_zoom);
        earthquakes.resize_for_zoom(zoom);

        let (mut composer, boundaries) = match config.variant {
            Variant::Basic => (
                MapComposer::new(vec![BaseLayer::openstreetmap()], OPENSTREETMAP)?,
                None,
            ),
            Variant::Tectonic => (
                MapComposer::new(
                    vec![
                        BaseLayer::openstreetmap(),
                        BaseLayer::stamen(STAMEN_TONER, "toner"),
                        BaseLayer::stamen(STAMEN_TERRAIN, "terrain"),
                    ],
                    OPENSTREETMAP,
                )?,
                Some(BoundaryLayer::new(BOUNDARY_LAYER_ID, config.boundary_style)),
            ),
        };
        composer.add_overlay(EARTHQUAKES_OVERLAY, earthquakes.id(), true)?;
        if let Some(layer) = &boundaries {
            composer.add_overlay(TECTONIC_PLATES_OVERLAY, layer.id(), false)?;
        }

        let legend = Legend::build(&color_scale, &config.legend_breakpoints);

        Ok(Self {
            center: config.center,
            zoom,
            config,
            composer,
            earthquakes,
            boundaries,
            legend,
        })
    }

    pub fn composer(&self) -> &MapComposer {
        &self.composer
    }

    pub fn earthquakes(&self) -> &ClusterLayer {
        &self.earthquakes
    }

    pub fn boundaries(&self) -> Option<&BoundaryLayer> {
        self.boundaries.as_ref()
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    pub fn on_zoom_end(&mut self, zoom: u8) {
        self.zoom = self.clamp_zoom(zoom);
        self.earthquakes.resize_for_zoom(self.zoom);
        debug!(zoom = self.zoom, markers = self.earthquakes.len(), "resized markers");
    }

    pub fn on_base_layer_change(&mut self, name: &str) -> Result<(), ComposeError> {
        if self.composer.select_base(name)? {
            info!(base = name, "base layer changed");
        }
        Ok(())
    }

    pub fn on_overlay_toggle(&mut self, name: &str, active: bool) -> Result<(), ComposeError> {
        if self.composer.set_overlay(name, active)? {
            info!(overlay = name, active, "overlay toggled");
        }
        Ok(())
    }

    pub fn on_earthquakes_loaded(&mut self, feed: EarthquakeFeed) {
        if !feed.skipped.is_empty() {
            warn!(
                skipped = feed.skipped.len(),
                "earthquake features without point geometry were skipped"
            );
        }
        let added = self.earthquakes.add_records(feed.records);
        info!(markers = added, "earthquake layer populated");
    }

    pub fn on_earthquakes_failed(&mut self, reason: &str) {
        error!(%reason, "error fetching earthquake data");
        self.earthquakes.mark_failed();
    }

    pub fn on_boundaries_loaded(&mut self, features: Vec<BoundaryFeature>) {
        let Some(layer) = self.boundaries.as_mut() else {
            debug!("variant has no boundary overlay; ignoring data");
            return;
        };
        let count = features.len();
        if layer.add_data(features) {
            // Render on arrival.
            self.composer.activate_layer(layer.id());
            info!(features = count, "tectonic plate layer populated");
        }
    }

    pub fn on_boundaries_failed(&mut self, reason: &str) {
        error!(%reason, "error fetching tectonic plates data");
        if let Some(layer) = self.boundaries.as_mut() {
            layer.mark_failed();
        }
    }

    pub fn popup(&self, marker_index: usize) -> Option<&str> {
        self.earthquakes.popup(marker_index)
    }

    /// Snapshot at the session zoom, or at `zoom` when given.
    pub fn snapshot(&self, zoom: Option<u8>) -> MapView {
        let zoom = zoom.map_or(self.zoom, |z| self.clamp_zoom(z));

        let overlays = self
            .composer
            .overlays()
            .iter()
            .map(|o| OverlayView {
                name: o.name.clone(),
                active: o.active,
                state: self.overlay_state(o),
            })
            .collect();

        let earthquakes = self
            .composer
            .is_layer_active(self.earthquakes.id())
            .then(|| EarthquakeLayerView {
                state: self.earthquakes.state(),
                count: self.earthquakes.len(),
                items: self.earthquakes.clusters_at(zoom),
            });

        let boundaries = self
            .boundaries
            .as_ref()
            .filter(|layer| self.composer.is_layer_active(layer.id()))
            .map(|layer| BoundaryLayerView {
                state: layer.state(),
                style: *layer.style(),
                features: layer.views(),
            });

        MapView {
            variant: self.config.variant,
            center: self.center,
            zoom,
            base_layers: self.composer.base_layers().to_vec(),
            active_base: self.composer.active_base().name.clone(),
            overlays,
            show_layer_control: self.config.variant == Variant::Tectonic,
            earthquakes,
            boundaries,
            legend: self.legend.clone(),
        }
    }

    fn overlay_state(&self, overlay: &OverlayEntry) -> OverlayState {
        if overlay.layer == self.earthquakes.id() {
            return self.earthquakes.state();
        }
        self.boundaries
            .as_ref()
            .filter(|b| b.id() == overlay.layer)
            .map_or(OverlayState::Empty, |b| b.state())
    }
}

impl EventHandler<MapEvent> for MapSession {
    fn handle(&mut self, event: MapEvent) {
        let result = match event {
            MapEvent::ZoomEnd { zoom } => {
                self.on_zoom_end(zoom);
                Ok(())
            }
            MapEvent::BaseLayerChange { name } => self.on_base_layer_change(&name),
            MapEvent::OverlayToggle { name, active } => self.on_overlay_toggle(&name, active),
            MapEvent::EarthquakesLoaded(feed) => {
                self.on_earthquakes_loaded(feed);
                Ok(())
            }
            MapEvent::EarthquakesFailed { reason } => {
                self.on_earthquakes_failed(&reason);
                Ok(())
            }
            MapEvent::BoundariesLoaded(features) => {
                self.on_boundaries_loaded(features);
                Ok(())
            }
            MapEvent::BoundariesFailed { reason } => {
                self.on_boundaries_failed(&reason);
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!("map event rejected: {err}");
        }
    }
}
