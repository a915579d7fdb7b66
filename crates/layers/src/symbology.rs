use serde::{Serialize, Serializer};

/// 8-bit RGB colour. Serializes as `#rrggbb`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Entries in a sampled palette table.
pub const PALETTE_LEN: usize = 256;

/// Viridis sampled at 256 evenly spaced points, the table d3 ships as
/// `interpolateViridis`.
pub const VIRIDIS: [Rgb; PALETTE_LEN] = [
    Rgb::new(0x44, 0x01, 0x54), Rgb::new(0x44, 0x02, 0x56), Rgb::new(0x45, 0x04, 0x57),
    Rgb::new(0x45, 0x05, 0x59), Rgb::new(0x46, 0x07, 0x5a), Rgb::new(0x46, 0x08, 0x5c),
    Rgb::new(0x46, 0x0a, 0x5d), Rgb::new(0x46, 0x0b, 0x5e), Rgb::new(0x47, 0x0d, 0x60),
    Rgb::new(0x47, 0x0e, 0x61), Rgb::new(0x47, 0x10, 0x63), Rgb::new(0x47, 0x11, 0x64),
    Rgb::new(0x47, 0x13, 0x65), Rgb::new(0x48, 0x14, 0x67), Rgb::new(0x48, 0x16, 0x68),
    Rgb::new(0x48, 0x17, 0x69), Rgb::new(0x48, 0x18, 0x6a), Rgb::new(0x48, 0x1a, 0x6c),
    Rgb::new(0x48, 0x1b, 0x6d), Rgb::new(0x48, 0x1c, 0x6e), Rgb::new(0x48, 0x1d, 0x6f),
    Rgb::new(0x48, 0x1f, 0x70), Rgb::new(0x48, 0x20, 0x71), Rgb::new(0x48, 0x21, 0x73),
    Rgb::new(0x48, 0x23, 0x74), Rgb::new(0x48, 0x24, 0x75), Rgb::new(0x48, 0x25, 0x76),
    Rgb::new(0x48, 0x26, 0x77), Rgb::new(0x48, 0x28, 0x78), Rgb::new(0x48, 0x29, 0x79),
    Rgb::new(0x47, 0x2a, 0x7a), Rgb::new(0x47, 0x2c, 0x7a), Rgb::new(0x47, 0x2d, 0x7b),
    Rgb::new(0x47, 0x2e, 0x7c), Rgb::new(0x47, 0x2f, 0x7d), Rgb::new(0x46, 0x30, 0x7e),
    Rgb::new(0x46, 0x32, 0x7e), Rgb::new(0x46, 0x33, 0x7f), Rgb::new(0x46, 0x34, 0x80),
    Rgb::new(0x45, 0x35, 0x81), Rgb::new(0x45, 0x37, 0x81), Rgb::new(0x45, 0x38, 0x82),
    Rgb::new(0x44, 0x39, 0x83), Rgb::new(0x44, 0x3a, 0x83), Rgb::new(0x44, 0x3b, 0x84),
    Rgb::new(0x43, 0x3d, 0x84), Rgb::new(0x43, 0x3e, 0x85), Rgb::new(0x42, 0x3f, 0x85),
    Rgb::new(0x42, 0x40, 0x86), Rgb::new(0x42, 0x41, 0x86), Rgb::new(0x41, 0x42, 0x87),
    Rgb::new(0x41, 0x44, 0x87), Rgb::new(0x40, 0x45, 0x88), Rgb::new(0x40, 0x46, 0x88),
    Rgb::new(0x3f, 0x47, 0x88), Rgb::new(0x3f, 0x48, 0x89), Rgb::new(0x3e, 0x49, 0x89),
    Rgb::new(0x3e, 0x4a, 0x89), Rgb::new(0x3e, 0x4c, 0x8a), Rgb::new(0x3d, 0x4d, 0x8a),
    Rgb::new(0x3d, 0x4e, 0x8a), Rgb::new(0x3c, 0x4f, 0x8a), Rgb::new(0x3c, 0x50, 0x8b),
    Rgb::new(0x3b, 0x51, 0x8b), Rgb::new(0x3b, 0x52, 0x8b), Rgb::new(0x3a, 0x53, 0x8b),
    Rgb::new(0x3a, 0x54, 0x8c), Rgb::new(0x39, 0x55, 0x8c), Rgb::new(0x39, 0x56, 0x8c),
    Rgb::new(0x38, 0x58, 0x8c), Rgb::new(0x38, 0x59, 0x8c), Rgb::new(0x37, 0x5a, 0x8c),
    Rgb::new(0x37, 0x5b, 0x8d), Rgb::new(0x36, 0x5c, 0x8d), Rgb::new(0x36, 0x5d, 0x8d),
    Rgb::new(0x35, 0x5e, 0x8d), Rgb::new(0x35, 0x5f, 0x8d), Rgb::new(0x34, 0x60, 0x8d),
    Rgb::new(0x34, 0x61, 0x8d), Rgb::new(0x33, 0x62, 0x8d), Rgb::new(0x33, 0x63, 0x8d),
    Rgb::new(0x32, 0x64, 0x8e), Rgb::new(0x32, 0x65, 0x8e), Rgb::new(0x31, 0x66, 0x8e),
    Rgb::new(0x31, 0x67, 0x8e), Rgb::new(0x31, 0x68, 0x8e), Rgb::new(0x30, 0x69, 0x8e),
    Rgb::new(0x30, 0x6a, 0x8e), Rgb::new(0x2f, 0x6b, 0x8e), Rgb::new(0x2f, 0x6c, 0x8e),
    Rgb::new(0x2e, 0x6d, 0x8e), Rgb::new(0x2e, 0x6e, 0x8e), Rgb::new(0x2e, 0x6f, 0x8e),
    Rgb::new(0x2d, 0x70, 0x8e), Rgb::new(0x2d, 0x71, 0x8e), Rgb::new(0x2c, 0x71, 0x8e),
    Rgb::new(0x2c, 0x72, 0x8e), Rgb::new(0x2c, 0x73, 0x8e), Rgb::new(0x2b, 0x74, 0x8e),
    Rgb::new(0x2b, 0x75, 0x8e), Rgb::new(0x2a, 0x76, 0x8e), Rgb::new(0x2a, 0x77, 0x8e),
    Rgb::new(0x2a, 0x78, 0x8e), Rgb::new(0x29, 0x79, 0x8e), Rgb::new(0x29, 0x7a, 0x8e),
    Rgb::new(0x29, 0x7b, 0x8e), Rgb::new(0x28, 0x7c, 0x8e), Rgb::new(0x28, 0x7d, 0x8e),
    Rgb::new(0x27, 0x7e, 0x8e), Rgb::new(0x27, 0x7f, 0x8e), Rgb::new(0x27, 0x80, 0x8e),
    Rgb::new(0x26, 0x81, 0x8e), Rgb::new(0x26, 0x82, 0x8e), Rgb::new(0x26, 0x82, 0x8e),
    Rgb::new(0x25, 0x83, 0x8e), Rgb::new(0x25, 0x84, 0x8e), Rgb::new(0x25, 0x85, 0x8e),
    Rgb::new(0x24, 0x86, 0x8e), Rgb::new(0x24, 0x87, 0x8e), Rgb::new(0x23, 0x88, 0x8e),
    Rgb::new(0x23, 0x89, 0x8e), Rgb::new(0x23, 0x8a, 0x8d), Rgb::new(0x22, 0x8b, 0x8d),
    Rgb::new(0x22, 0x8c, 0x8d), Rgb::new(0x22, 0x8d, 0x8d), Rgb::new(0x21, 0x8e, 0x8d),
    Rgb::new(0x21, 0x8f, 0x8d), Rgb::new(0x21, 0x90, 0x8d), Rgb::new(0x21, 0x91, 0x8c),
    Rgb::new(0x20, 0x92, 0x8c), Rgb::new(0x20, 0x92, 0x8c), Rgb::new(0x20, 0x93, 0x8c),
    Rgb::new(0x1f, 0x94, 0x8c), Rgb::new(0x1f, 0x95, 0x8b), Rgb::new(0x1f, 0x96, 0x8b),
    Rgb::new(0x1f, 0x97, 0x8b), Rgb::new(0x1f, 0x98, 0x8b), Rgb::new(0x1f, 0x99, 0x8a),
    Rgb::new(0x1f, 0x9a, 0x8a), Rgb::new(0x1e, 0x9b, 0x8a), Rgb::new(0x1e, 0x9c, 0x89),
    Rgb::new(0x1e, 0x9d, 0x89), Rgb::new(0x1f, 0x9e, 0x89), Rgb::new(0x1f, 0x9f, 0x88),
    Rgb::new(0x1f, 0xa0, 0x88), Rgb::new(0x1f, 0xa1, 0x88), Rgb::new(0x1f, 0xa1, 0x87),
    Rgb::new(0x1f, 0xa2, 0x87), Rgb::new(0x20, 0xa3, 0x86), Rgb::new(0x20, 0xa4, 0x86),
    Rgb::new(0x21, 0xa5, 0x85), Rgb::new(0x21, 0xa6, 0x85), Rgb::new(0x22, 0xa7, 0x85),
    Rgb::new(0x22, 0xa8, 0x84), Rgb::new(0x23, 0xa9, 0x83), Rgb::new(0x24, 0xaa, 0x83),
    Rgb::new(0x25, 0xab, 0x82), Rgb::new(0x25, 0xac, 0x82), Rgb::new(0x26, 0xad, 0x81),
    Rgb::new(0x27, 0xad, 0x81), Rgb::new(0x28, 0xae, 0x80), Rgb::new(0x29, 0xaf, 0x7f),
    Rgb::new(0x2a, 0xb0, 0x7f), Rgb::new(0x2c, 0xb1, 0x7e), Rgb::new(0x2d, 0xb2, 0x7d),
    Rgb::new(0x2e, 0xb3, 0x7c), Rgb::new(0x2f, 0xb4, 0x7c), Rgb::new(0x31, 0xb5, 0x7b),
    Rgb::new(0x32, 0xb6, 0x7a), Rgb::new(0x34, 0xb6, 0x79), Rgb::new(0x35, 0xb7, 0x79),
    Rgb::new(0x37, 0xb8, 0x78), Rgb::new(0x38, 0xb9, 0x77), Rgb::new(0x3a, 0xba, 0x76),
    Rgb::new(0x3b, 0xbb, 0x75), Rgb::new(0x3d, 0xbc, 0x74), Rgb::new(0x3f, 0xbc, 0x73),
    Rgb::new(0x40, 0xbd, 0x72), Rgb::new(0x42, 0xbe, 0x71), Rgb::new(0x44, 0xbf, 0x70),
    Rgb::new(0x46, 0xc0, 0x6f), Rgb::new(0x48, 0xc1, 0x6e), Rgb::new(0x4a, 0xc1, 0x6d),
    Rgb::new(0x4c, 0xc2, 0x6c), Rgb::new(0x4e, 0xc3, 0x6b), Rgb::new(0x50, 0xc4, 0x6a),
    Rgb::new(0x52, 0xc5, 0x69), Rgb::new(0x54, 0xc5, 0x68), Rgb::new(0x56, 0xc6, 0x67),
    Rgb::new(0x58, 0xc7, 0x65), Rgb::new(0x5a, 0xc8, 0x64), Rgb::new(0x5c, 0xc8, 0x63),
    Rgb::new(0x5e, 0xc9, 0x62), Rgb::new(0x60, 0xca, 0x60), Rgb::new(0x63, 0xcb, 0x5f),
    Rgb::new(0x65, 0xcb, 0x5e), Rgb::new(0x67, 0xcc, 0x5c), Rgb::new(0x69, 0xcd, 0x5b),
    Rgb::new(0x6c, 0xcd, 0x5a), Rgb::new(0x6e, 0xce, 0x58), Rgb::new(0x70, 0xcf, 0x57),
    Rgb::new(0x73, 0xd0, 0x56), Rgb::new(0x75, 0xd0, 0x54), Rgb::new(0x77, 0xd1, 0x53),
    Rgb::new(0x7a, 0xd1, 0x51), Rgb::new(0x7c, 0xd2, 0x50), Rgb::new(0x7f, 0xd3, 0x4e),
    Rgb::new(0x81, 0xd3, 0x4d), Rgb::new(0x84, 0xd4, 0x4b), Rgb::new(0x86, 0xd5, 0x49),
    Rgb::new(0x89, 0xd5, 0x48), Rgb::new(0x8b, 0xd6, 0x46), Rgb::new(0x8e, 0xd6, 0x45),
    Rgb::new(0x90, 0xd7, 0x43), Rgb::new(0x93, 0xd7, 0x41), Rgb::new(0x95, 0xd8, 0x40),
    Rgb::new(0x98, 0xd8, 0x3e), Rgb::new(0x9b, 0xd9, 0x3c), Rgb::new(0x9d, 0xd9, 0x3b),
    Rgb::new(0xa0, 0xda, 0x39), Rgb::new(0xa2, 0xda, 0x37), Rgb::new(0xa5, 0xdb, 0x36),
    Rgb::new(0xa8, 0xdb, 0x34), Rgb::new(0xaa, 0xdc, 0x32), Rgb::new(0xad, 0xdc, 0x30),
    Rgb::new(0xb0, 0xdd, 0x2f), Rgb::new(0xb2, 0xdd, 0x2d), Rgb::new(0xb5, 0xde, 0x2b),
    Rgb::new(0xb8, 0xde, 0x29), Rgb::new(0xba, 0xde, 0x28), Rgb::new(0xbd, 0xdf, 0x26),
    Rgb::new(0xc0, 0xdf, 0x25), Rgb::new(0xc2, 0xdf, 0x23), Rgb::new(0xc5, 0xe0, 0x21),
    Rgb::new(0xc8, 0xe0, 0x20), Rgb::new(0xca, 0xe1, 0x1f), Rgb::new(0xcd, 0xe1, 0x1d),
    Rgb::new(0xd0, 0xe1, 0x1c), Rgb::new(0xd2, 0xe2, 0x1b), Rgb::new(0xd5, 0xe2, 0x1a),
    Rgb::new(0xd8, 0xe2, 0x19), Rgb::new(0xda, 0xe3, 0x19), Rgb::new(0xdd, 0xe3, 0x18),
    Rgb::new(0xdf, 0xe3, 0x18), Rgb::new(0xe2, 0xe4, 0x18), Rgb::new(0xe5, 0xe4, 0x19),
    Rgb::new(0xe7, 0xe4, 0x19), Rgb::new(0xea, 0xe5, 0x1a), Rgb::new(0xec, 0xe5, 0x1b),
    Rgb::new(0xef, 0xe5, 0x1c), Rgb::new(0xf1, 0xe5, 0x1d), Rgb::new(0xf4, 0xe6, 0x1e),
    Rgb::new(0xf6, 0xe6, 0x20), Rgb::new(0xf8, 0xe6, 0x21), Rgb::new(0xfb, 0xe7, 0x23),
    Rgb::new(0xfd, 0xe7, 0x25),
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    #[default]
    Viridis,
}

impl Palette {
    pub fn table(self) -> &'static [Rgb; PALETTE_LEN] {
        match self {
            Palette::Viridis => &VIRIDIS,
        }
    }

    /// Looks `t` up in the palette table: entry `floor(t * 256)`, clamped to
    /// the table. Non-finite input samples the low end.
    pub fn sample(self, t: f64) -> Rgb {
        let t = if t.is_finite() { t } else { 0.0 };
        let index = (t * PALETTE_LEN as f64).floor().clamp(0.0, (PALETTE_LEN - 1) as f64);
        self.table()[index as usize]
    }
}

/// Continuous colour scale shared by marker encoding and the legend.
///
/// Values outside `[domain_min, domain_max]` clamp to the end colours.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ColorScaleConfig {
    pub domain_min: f64,
    pub domain_max: f64,
    pub palette: Palette,
}

impl Default for ColorScaleConfig {
    fn default() -> Self {
        Self {
            domain_min: 0.0,
            domain_max: 500.0,
            palette: Palette::Viridis,
        }
    }
}

impl ColorScaleConfig {
    pub fn new(domain_min: f64, domain_max: f64) -> Self {
        Self {
            domain_min,
            domain_max,
            ..Self::default()
        }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.domain_max - self.domain_min;
        if span == 0.0 {
            return 0.0;
        }
        ((value - self.domain_min) / span).clamp(0.0, 1.0)
    }

    pub fn color_at(&self, value: f64) -> Rgb {
        self.palette.sample(self.normalize(value))
    }
}

/// Fixed style for the plate boundary overlay.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct BoundaryStyle {
    pub color: Rgb,
    pub weight: f64,
}

impl Default for BoundaryStyle {
    fn default() -> Self {
        Self {
            color: Rgb::new(0xff, 0x78, 0x00),
            weight: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundaryStyle, ColorScaleConfig, Palette, Rgb, VIRIDIS};
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_round_trip_and_rejects_garbage() {
        assert_eq!(Rgb::new(68, 1, 84).to_hex(), "#440154");
        assert_eq!(Rgb::from_hex("#fde725"), Some(Rgb::new(253, 231, 37)));
        assert_eq!(Rgb::from_hex("fde72"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(BoundaryStyle::default().color.to_hex(), "#ff7800");
    }

    #[test]
    fn sampling_uses_floor_index_into_table() {
        assert_eq!(Palette::Viridis.sample(0.0), VIRIDIS[0]);
        assert_eq!(Palette::Viridis.sample(1.0), VIRIDIS[255]);
        assert_eq!(Palette::Viridis.sample(0.5), VIRIDIS[128]);
        assert_eq!(Palette::Viridis.sample(1.0 / 256.0 - 1e-9), VIRIDIS[0]);
        assert_eq!(Palette::Viridis.sample(1.0 / 256.0), VIRIDIS[1]);
        assert_eq!(Palette::Viridis.sample(-0.5), VIRIDIS[0]);
        assert_eq!(Palette::Viridis.sample(f64::INFINITY), VIRIDIS[0]);
    }

    #[test]
    fn shallow_and_mid_depths_match_d3_viridis() {
        let cfg = ColorScaleConfig::default();
        assert_eq!(cfg.color_at(10.0).to_hex(), "#46085c");
        assert_eq!(cfg.color_at(100.0).to_hex(), "#414487");
        assert_eq!(cfg.color_at(250.0).to_hex(), "#21918c");
        assert_eq!(cfg.color_at(400.0).to_hex(), "#7ad151");
    }

    #[test]
    fn depth_domain_endpoints_and_clamping() {
        let cfg = ColorScaleConfig::default();
        assert_eq!(cfg.color_at(0.0).to_hex(), "#440154");
        assert_eq!(cfg.color_at(500.0).to_hex(), "#fde725");
        assert_eq!(cfg.color_at(-3.0), cfg.color_at(0.0));
        assert_eq!(cfg.color_at(650.0), cfg.color_at(500.0));
        assert_eq!(cfg.color_at(f64::NAN), cfg.color_at(0.0));
    }

    #[test]
    fn degenerate_domain_samples_low_end() {
        let cfg = ColorScaleConfig::new(10.0, 10.0);
        assert_eq!(cfg.color_at(10.0), VIRIDIS[0]);
    }
}
