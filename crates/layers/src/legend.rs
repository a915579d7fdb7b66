use serde::Serialize;

use crate::symbology::{ColorScaleConfig, Rgb};

/// Depth breakpoints shown in the legend, in kilometres.
pub const DEFAULT_BREAKPOINTS: [f64; 6] = [0.0, 100.0, 200.0, 300.0, 400.0, 500.0];

pub const LEGEND_TITLE: &str = "Earthquake Depth";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub lower: f64,
    /// `None` for the open-ended last entry.
    pub upper: Option<f64>,
    pub swatch: Rgb,
}

impl LegendEntry {
    pub fn label(&self) -> String {
        match self.upper {
            Some(upper) => format!("{}\u{2013}{}", self.lower, upper),
            None => format!("{}+", self.lower),
        }
    }
}

/// Static legend control. Built from the colour scale only, so it renders
/// even when no feed data ever arrives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub position: ControlPosition,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn build(scale: &ColorScaleConfig, breakpoints: &[f64]) -> Self {
        let entries = breakpoints
            .iter()
            .enumerate()
            .map(|(i, &lower)| LegendEntry {
                lower,
                upper: breakpoints.get(i + 1).copied(),
                swatch: scale.color_at(lower),
            })
            .collect();
        Self {
            title: LEGEND_TITLE.to_string(),
            position: ControlPosition::BottomRight,
            entries,
        }
    }

    /// Inner HTML of the `info legend` control.
    pub fn to_html(&self) -> String {
        let rows: Vec<String> = self
            .entries
            .iter()
            .map(|e| {
                let range = match e.upper {
                    Some(upper) => format!("{}&ndash;{}", e.lower, upper),
                    None => format!("{}+", e.lower),
                };
                format!("<i style=\"background:{}\"></i> {}", e.swatch, range)
            })
            .collect();
        format!("<h4>{}</h4>{}", self.title, rows.join("<br>"))
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::build(&ColorScaleConfig::default(), &DEFAULT_BREAKPOINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlPosition, DEFAULT_BREAKPOINTS, Legend};
    use crate::marker::encode;
    use crate::symbology::ColorScaleConfig;
    use formats::EarthquakeRecord;
    use foundation::Timestamp;
    use pretty_assertions::assert_eq;

    #[test]
    fn six_entries_anchored_bottom_right() {
        let legend = Legend::default();
        assert_eq!(legend.entries.len(), 6);
        assert_eq!(legend.position, ControlPosition::BottomRight);
        let labels: Vec<String> = legend.entries.iter().map(|e| e.label()).collect();
        assert_eq!(
            labels,
            vec!["0–100", "100–200", "200–300", "300–400", "400–500", "500+"]
        );
    }

    #[test]
    fn swatches_match_marker_colours() {
        let cfg = ColorScaleConfig::default();
        let legend = Legend::build(&cfg, &DEFAULT_BREAKPOINTS);
        for entry in &legend.entries {
            let record = EarthquakeRecord {
                id: None,
                latitude: 0.0,
                longitude: 0.0,
                depth: entry.lower,
                magnitude: 3.0,
                place: "synthetic".to_string(),
                timestamp: Timestamp(0),
            };
            assert_eq!(encode(&record, &cfg).fill_color, entry.swatch);
        }
    }

    #[test]
    fn html_matches_control_markup() {
        let legend = Legend::build(&ColorScaleConfig::default(), &[0.0, 500.0]);
        assert_eq!(
            legend.to_html(),
            "<h4>Earthquake Depth</h4>\
             <i style=\"background:#440154\"></i> 0&ndash;500<br>\
             <i style=\"background:#fde725\"></i> 500+"
        );
    }

    #[test]
    fn no_breakpoints_no_entries() {
        assert!(Legend::build(&ColorScaleConfig::default(), &[]).entries.is_empty());
    }
}
