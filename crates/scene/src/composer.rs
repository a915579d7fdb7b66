use layers::LayerId;
use serde::Serialize;
use thiserror::Error;

pub const OPENSTREETMAP: &str = "OpenStreetMap";
pub const STAMEN_TONER: &str = "Stamen Toner";
pub const STAMEN_TERRAIN: &str = "Stamen Terrain";

pub const EARTHQUAKES_OVERLAY: &str = "Earthquakes";
pub const TECTONIC_PLATES_OVERLAY: &str = "Tectonic Plates";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("unknown base layer: {0}")]
    UnknownBaseLayer(String),
    #[error("unknown overlay: {0}")]
    UnknownOverlay(String),
    #[error("duplicate layer name: {0}")]
    DuplicateName(String),
    #[error("at least one base layer is required")]
    NoBaseLayers,
}

/// Tile source the mapping library draws underneath everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLayer {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
}

impl BaseLayer {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        attribution: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            attribution: attribution.into(),
        }
    }

    pub fn openstreetmap() -> Self {
        Self::new(
            OPENSTREETMAP,
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors",
        )
    }

    pub fn stamen(name: &str, style: &str) -> Self {
        Self::new(
            name,
            format!("http://tile.stamen.com/{style}/{{z}}/{{x}}/{{y}}.png"),
            "&copy; <a href=\"http://maps.stamen.com\">Stamen Design</a>",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayEntry {
    pub name: String,
    pub layer: LayerId,
    pub active: bool,
}

/// Base layers are mutually exclusive; overlays toggle independently.
/// Both lists keep insertion order, which is the order the layer control
/// shows them in.
#[derive(Debug, Clone, PartialEq)]
pub struct MapComposer {
    base_layers: Vec<BaseLayer>,
    active_base: usize,
    overlays: Vec<OverlayEntry>,
}

impl MapComposer {
    pub fn new(base_layers: Vec<BaseLayer>, default_base: &str) -> Result<Self, ComposeError> {
        if base_layers.is_empty() {
            return Err(ComposeError::NoBaseLayers);
        }
        for (i, layer) in base_layers.iter().enumerate() {
            if base_layers[..i].iter().any(|l| l.name == layer.name) {
                return Err(ComposeError::DuplicateName(layer.name.clone()));
            }
        }
        let active_base = base_layers
            .iter()
            .position(|l| l.name == default_base)
            .ok_or_else(|| ComposeError::UnknownBaseLayer(default_base.to_string()))?;
        Ok(Self {
            base_layers,
            active_base,
            overlays: Vec::new(),
        })
    }

    pub fn add_overlay(
        &mut self,
        name: impl Into<String>,
        layer: LayerId,
        active: bool,
    ) -> Result<(), ComposeError> {
        let name = name.into();
        if self.overlays.iter().any(|o| o.name == name) {
            return Err(ComposeError::DuplicateName(name));
        }
        self.overlays.push(OverlayEntry {
            name,
            layer,
            active,
        });
        Ok(())
    }

    pub fn base_layers(&self) -> &[BaseLayer] {
        &self.base_layers
    }

    pub fn overlays(&self) -> &[OverlayEntry] {
        &self.overlays
    }

    pub fn active_base(&self) -> &BaseLayer {
        &self.base_layers[self.active_base]
    }

    pub fn has_base(&self, name: &str) -> bool {
        self.base_layers.iter().any(|l| l.name == name)
    }

    pub fn has_overlay(&self, name: &str) -> bool {
        self.overlays.iter().any(|o| o.name == name)
    }

    /// Activates `name`, deactivating the previous base. Returns whether the
    /// active base changed.
    pub fn select_base(&mut self, name: &str) -> Result<bool, ComposeError> {
        let index = self
            .base_layers
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| ComposeError::UnknownBaseLayer(name.to_string()))?;
        let changed = index != self.active_base;
        self.active_base = index;
        Ok(changed)
    }

    /// Returns whether the overlay's state changed.
    pub fn set_overlay(&mut self, name: &str, active: bool) -> Result<bool, ComposeError> {
        let entry = self
            .overlays
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| ComposeError::UnknownOverlay(name.to_string()))?;
        let changed = entry.active != active;
        entry.active = active;
        Ok(changed)
    }

    pub fn activate_layer(&mut self, layer: LayerId) -> bool {
        match self.overlays.iter_mut().find(|o| o.layer == layer) {
            Some(entry) if !entry.active => {
                entry.active = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_layer_active(&self, layer: LayerId) -> bool {
        self.overlays
            .iter()
            .any(|o| o.layer == layer && o.active)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BaseLayer, ComposeError, MapComposer, OPENSTREETMAP, STAMEN_TERRAIN, STAMEN_TONER,
    };
    use layers::LayerId;

    fn composer() -> MapComposer {
        let mut c = MapComposer::new(
            vec![
                BaseLayer::openstreetmap(),
                BaseLayer::stamen(STAMEN_TONER, "toner"),
                BaseLayer::stamen(STAMEN_TERRAIN, "terrain"),
            ],
            OPENSTREETMAP,
        )
        .unwrap();
        c.add_overlay("Earthquakes", LayerId(1), true).unwrap();
        c.add_overlay("Tectonic Plates", LayerId(2), false).unwrap();
        c
    }

    #[test]
    fn exactly_one_base_is_active() {
        let mut c = composer();
        assert_eq!(c.active_base().name, OPENSTREETMAP);
        assert!(c.select_base(STAMEN_TONER).unwrap());
        assert_eq!(c.active_base().name, STAMEN_TONER);
        assert!(!c.select_base(STAMEN_TONER).unwrap());
        assert_eq!(
            c.select_base("Nope"),
            Err(ComposeError::UnknownBaseLayer("Nope".to_string()))
        );
        assert_eq!(c.active_base().name, STAMEN_TONER);
    }

    #[test]
    fn stamen_templates_keep_placeholders() {
        assert_eq!(
            BaseLayer::stamen(STAMEN_TERRAIN, "terrain").url_template,
            "http://tile.stamen.com/terrain/{z}/{x}/{y}.png"
        );
    }

    #[test]
    fn overlays_toggle_independently() {
        let mut c = composer();
        assert!(c.is_layer_active(LayerId(1)));
        assert!(!c.is_layer_active(LayerId(2)));
        assert!(c.set_overlay("Tectonic Plates", true).unwrap());
        assert!(c.is_layer_active(LayerId(1)) && c.is_layer_active(LayerId(2)));
        assert!(c.set_overlay("Earthquakes", false).unwrap());
        assert!(!c.is_layer_active(LayerId(1)));
        assert!(c.is_layer_active(LayerId(2)));
        assert!(c.set_overlay("Volcanoes", true).is_err());
    }

    #[test]
    fn activate_layer_only_reports_real_changes() {
        let mut c = composer();
        assert!(c.activate_layer(LayerId(2)));
        assert!(!c.activate_layer(LayerId(2)));
        assert!(!c.activate_layer(LayerId(9)));
    }

    #[test]
    fn rejects_bad_construction() {
        assert_eq!(
            MapComposer::new(Vec::new(), OPENSTREETMAP),
            Err(ComposeError::NoBaseLayers)
        );
        assert_eq!(
            MapComposer::new(vec![BaseLayer::openstreetmap()], "Stamen Toner"),
            Err(ComposeError::UnknownBaseLayer("Stamen Toner".to_string()))
        );
        assert_eq!(
            MapComposer::new(
                vec![BaseLayer::openstreetmap(), BaseLayer::openstreetmap()],
                OPENSTREETMAP
            ),
            Err(ComposeError::DuplicateName(OPENSTREETMAP.to_string()))
        );
        let mut c = composer();
        assert!(c.add_overlay("Earthquakes", LayerId(3), false).is_err());
    }
}
