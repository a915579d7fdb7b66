use std::collections::HashMap;
use std::sync::Arc;

use formats::EarthquakeRecord;
use foundation::{GeoBounds, LatLon, project_to_pixels};
use serde::Serialize;

use crate::layer::{Layer, LayerId, OverlayState};
use crate::marker::{MarkerEncoder, MarkerStyle};
use crate::symbology::ColorScaleConfig;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOptions {
    /// Grid cell edge, in screen pixels, inside which markers merge.
    pub max_cluster_radius_px: f64,
    /// From this zoom on, every marker is drawn individually.
    pub disable_clustering_at_zoom: u8,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_cluster_radius_px: 80.0,
            disable_clustering_at_zoom: 18,
        }
    }
}

/// How marker radii respond to zoom changes.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ZoomScaling {
    /// Radius stays `magnitude * size_factor` at every zoom.
    #[default]
    Fixed,
    /// Radius is multiplied by `factor_per_level ^ (zoom - reference_zoom)`.
    Exponential {
        reference_zoom: u8,
        factor_per_level: f64,
    },
}

impl ZoomScaling {
    pub fn scale(&self, zoom: u8) -> f64 {
        match *self {
            ZoomScaling::Fixed => 1.0,
            ZoomScaling::Exponential {
                reference_zoom,
                factor_per_level,
            } => factor_per_level.powi(i32::from(zoom) - i32::from(reference_zoom)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub record: EarthquakeRecord,
    pub style: MarkerStyle,
    /// Canonical size input; the rendered radius is always derived from it.
    pub base_magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub center: LatLon,
    pub count: usize,
    pub bounds: GeoBounds,
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClusterItem {
    Marker {
        index: usize,
        position: LatLon,
        style: MarkerStyle,
    },
    Cluster(Cluster),
}

/// Clustered point layer for earthquake markers.
#[derive(Debug, Clone)]
pub struct ClusterLayer {
    id: LayerId,
    state: OverlayState,
    encoder: MarkerEncoder,
    scale: Arc<ColorScaleConfig>,
    options: ClusterOptions,
    zoom_scaling: ZoomScaling,
    zoom: u8,
    markers: Vec<Marker>,
}

impl ClusterLayer {
    pub fn new(id: u64, encoder: MarkerEncoder, scale: Arc<ColorScaleConfig>) -> Self {
        Self {
            id: LayerId(id),
            state: OverlayState::Empty,
            encoder,
            scale,
            options: ClusterOptions::default(),
            zoom_scaling: ZoomScaling::Fixed,
            zoom: 0,
            markers: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ClusterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_zoom_scaling(mut self, zoom_scaling: ZoomScaling) -> Self {
        self.zoom_scaling = zoom_scaling;
        self
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Encodes and appends records. Returns how many were added; a layer
    /// whose load already failed accepts nothing.
    pub fn add_records(&mut self, records: impl IntoIterator<Item = EarthquakeRecord>) -> usize {
        if !self.state.populate() {
            return 0;
        }
        let before = self.markers.len();
        for record in records {
            let mut style = self.encoder.encode(&record, &self.scale);
            style.radius = self.radius_at(record.magnitude, self.zoom);
            self.markers.push(Marker {
                base_magnitude: record.magnitude,
                record,
                style,
            });
        }
        self.markers.len() - before
    }

    pub fn mark_failed(&mut self) -> bool {
        self.state.fail()
    }

    /// Recomputes every radius from its base magnitude. Idempotent for a
    /// given zoom.
    pub fn resize_for_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
        let scale = self.zoom_scaling.scale(zoom);
        for marker in &mut self.markers {
            marker.style.radius = self.encoder.radius(marker.base_magnitude) * scale;
        }
    }

    fn radius_at(&self, base_magnitude: f64, zoom: u8) -> f64 {
        self.encoder.radius(base_magnitude) * self.zoom_scaling.scale(zoom)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn popup(&self, index: usize) -> Option<&str> {
        self.markers.get(index).map(|m| m.style.popup.as_str())
    }

    /// Groups markers by screen-space grid cell at `zoom`. Output is ordered
    /// by the first marker of each group. Marker radii are those for `zoom`,
    /// whatever zoom the layer was last resized to.
    pub fn clusters_at(&self, zoom: u8) -> Vec<ClusterItem> {
        if zoom >= self.options.disable_clustering_at_zoom
            || self.options.max_cluster_radius_px <= 0.0
        {
            return (0..self.markers.len()).map(|i| self.marker_item(i, zoom)).collect();
        }

        let cell = self.options.max_cluster_radius_px;
        let mut slots: HashMap<(i64, i64), usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (i, marker) in self.markers.iter().enumerate() {
            let px = project_to_pixels(marker.record.position(), zoom);
            let key = ((px.x / cell).floor() as i64, (px.y / cell).floor() as i64);
            let slot = *slots.entry(key).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(i);
        }

        groups
            .into_iter()
            .map(|members| {
                if members.len() == 1 {
                    self.marker_item(members[0], zoom)
                } else {
                    ClusterItem::Cluster(self.cluster_of(members))
                }
            })
            .collect()
    }

    fn marker_item(&self, index: usize, zoom: u8) -> ClusterItem {
        let marker = &self.markers[index];
        let mut style = marker.style.clone();
        style.radius = self.radius_at(marker.base_magnitude, zoom);
        ClusterItem::Marker {
            index,
            position: marker.record.position(),
            style,
        }
    }

    fn cluster_of(&self, members: Vec<usize>) -> Cluster {
        let positions: Vec<LatLon> = members
            .iter()
            .map(|&i| self.markers[i].record.position())
            .collect();
        let n = positions.len() as f64;
        let center = LatLon::new(
            positions.iter().map(|p| p.lat).sum::<f64>() / n,
            positions.iter().map(|p| p.lon).sum::<f64>() / n,
        );
        let bounds = GeoBounds::of_points(positions.iter().copied())
            .unwrap_or_else(|| GeoBounds::from_point(center));
        Cluster {
            center,
            count: members.len(),
            bounds,
            members,
        }
    }
}

impl Layer for ClusterLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn state(&self) -> OverlayState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ClusterItem, ClusterLayer, ClusterOptions, ZoomScaling};
    use crate::layer::{Layer, OverlayState};
    use crate::marker::MarkerEncoder;
    use crate::symbology::ColorScaleConfig;
    use formats::EarthquakeRecord;
    use foundation::Timestamp;

    fn quake(lat: f64, lon: f64, magnitude: f64) -> EarthquakeRecord {
        EarthquakeRecord {
            id: None,
            latitude: lat,
            longitude: lon,
            depth: 12.0,
            magnitude,
            place: "test".to_string(),
            timestamp: Timestamp(0),
        }
    }

    fn layer() -> ClusterLayer {
        ClusterLayer::new(
            1,
            MarkerEncoder::default(),
            Arc::new(ColorScaleConfig::default()),
        )
    }

    fn radii(layer: &ClusterLayer) -> Vec<f64> {
        layer.markers().iter().map(|m| m.style.radius).collect()
    }

    #[test]
    fn starts_empty_and_populates() {
        let mut l = layer();
        assert_eq!(l.state(), OverlayState::Empty);
        assert_eq!(l.add_records(vec![quake(0.0, 0.0, 2.0)]), 1);
        assert_eq!(l.state(), OverlayState::Populated);
        assert_eq!(l.markers()[0].style.radius, 10.0);
    }

    #[test]
    fn empty_feed_still_populates() {
        let mut l = layer();
        assert_eq!(l.add_records(Vec::new()), 0);
        assert_eq!(l.state(), OverlayState::Populated);
        assert!(l.clusters_at(5).is_empty());
    }

    #[test]
    fn failed_layer_accepts_no_records() {
        let mut l = layer();
        assert!(l.mark_failed());
        assert_eq!(l.add_records(vec![quake(0.0, 0.0, 2.0)]), 0);
        assert!(l.is_empty());
        assert_eq!(l.state(), OverlayState::FailedSilently);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut l = layer().with_zoom_scaling(ZoomScaling::Exponential {
            reference_zoom: 5,
            factor_per_level: 1.25,
        });
        l.add_records(vec![quake(0.0, 0.0, 4.5), quake(1.0, 1.0, -0.5)]);
        l.resize_for_zoom(8);
        let once = radii(&l);
        l.resize_for_zoom(8);
        assert_eq!(radii(&l), once);
    }

    #[test]
    fn resize_derives_from_base_magnitude_without_drift() {
        let mut l = layer().with_zoom_scaling(ZoomScaling::Exponential {
            reference_zoom: 5,
            factor_per_level: 2.0,
        });
        l.resize_for_zoom(5);
        l.add_records(vec![quake(0.0, 0.0, 3.0)]);
        l.resize_for_zoom(7);
        assert_eq!(radii(&l), vec![60.0]);
        l.resize_for_zoom(3);
        l.resize_for_zoom(5);
        assert_eq!(radii(&l), vec![15.0]);
    }

    #[test]
    fn fixed_scaling_keeps_linear_radius() {
        let mut l = layer();
        l.add_records(vec![quake(0.0, 0.0, 4.5)]);
        for z in [0, 5, 12, 18] {
            l.resize_for_zoom(z);
            assert_eq!(radii(&l), vec![22.5]);
        }
    }

    #[test]
    fn nearby_points_cluster_at_low_zoom_and_split_at_high_zoom() {
        let mut l = layer();
        l.add_records(vec![
            quake(37.80, -122.40, 2.0),
            quake(37.81, -122.41, 3.0),
            quake(-33.9, 151.2, 5.0),
        ]);

        let low = l.clusters_at(3);
        assert_eq!(low.len(), 2);
        match &low[0] {
            ClusterItem::Cluster(c) => {
                assert_eq!(c.count, 2);
                assert_eq!(c.members, vec![0, 1]);
                assert!(c.bounds.contains(c.center));
            }
            other => panic!("expected cluster, got {other:?}"),
        }
        assert!(matches!(low[1], ClusterItem::Marker { index: 2, .. }));

        let high = l.clusters_at(ClusterOptions::default().disable_clustering_at_zoom);
        assert_eq!(high.len(), 3);
        assert!(high.iter().all(|i| matches!(i, ClusterItem::Marker { .. })));
    }

    #[test]
    fn clusters_at_reports_radii_for_the_requested_zoom() {
        let mut l = layer().with_zoom_scaling(ZoomScaling::Exponential {
            reference_zoom: 5,
            factor_per_level: 2.0,
        });
        l.resize_for_zoom(5);
        l.add_records(vec![quake(0.0, 0.0, 3.0)]);

        let radius_at = |zoom| match &l.clusters_at(zoom)[0] {
            ClusterItem::Marker { style, .. } => style.radius,
            other => panic!("expected marker, got {other:?}"),
        };
        assert_eq!(radius_at(7), 60.0);
        assert_eq!(radius_at(4), 7.5);
        // The stored layer zoom is untouched.
        assert_eq!(l.zoom(), 5);
        assert_eq!(radii(&l), vec![15.0]);
    }

    #[test]
    fn popup_lookup_by_index() {
        let mut l = layer();
        l.add_records(vec![quake(0.0, 0.0, 1.0)]);
        assert!(l.popup(0).unwrap().contains("<b>Location:</b> test"));
        assert!(l.popup(1).is_none());
    }
}
