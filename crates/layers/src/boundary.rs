use formats::BoundaryFeature;
use serde::Serialize;
use serde_json::Value;

use crate::layer::{Layer, LayerId, OverlayState};
use crate::marker::escape_html;
use crate::symbology::BoundaryStyle;

/// Serializable form of one boundary with its popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryView {
    pub name: Option<String>,
    pub popup: String,
    pub geometry: Value,
}

/// Plate boundary overlay. Exists from start-up and fills once its data
/// arrives; independent of the colour scale and the earthquake data.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    id: LayerId,
    state: OverlayState,
    style: BoundaryStyle,
    features: Vec<BoundaryFeature>,
}

impl BoundaryLayer {
    pub fn new(id: u64, style: BoundaryStyle) -> Self {
        Self {
            id: LayerId(id),
            state: OverlayState::Empty,
            style,
            features: Vec::new(),
        }
    }

    pub fn style(&self) -> &BoundaryStyle {
        &self.style
    }

    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    pub fn add_data(&mut self, features: Vec<BoundaryFeature>) -> bool {
        if !self.state.populate() {
            return false;
        }
        self.features.extend(features);
        true
    }

    pub fn mark_failed(&mut self) -> bool {
        self.state.fail()
    }

    pub fn views(&self) -> Vec<BoundaryView> {
        self.features
            .iter()
            .map(|f| BoundaryView {
                name: f.name.clone(),
                popup: boundary_popup(f),
                geometry: f.geometry.to_geojson_value(),
            })
            .collect()
    }
}

pub fn boundary_popup(feature: &BoundaryFeature) -> String {
    let name = feature.name.as_deref().unwrap_or("Unknown");
    format!("<b>Tectonic Plate:</b> {}", escape_html(name))
}

impl Layer for BoundaryLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn state(&self) -> OverlayState {
        self.state
    }
}
