use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::stats::UNKNOWN_CATEGORY;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

/// Sequential ramp for magnitudes, dark violet (`t = 0`) to yellow (`t = 1`).
pub fn ramp(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let hue = 270.0 - 210.0 * t;
    hsl_to_color32(Hsl::new(hue, 0.7, 0.3 + 0.35 * t))
}

// ---------------------------------------------------------------------------
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Stable colours for label categories. `Yes` / `No` / `Unknown` are fixed so
/// every chart agrees; any extra category gets a palette colour.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for ColorMap {
    fn default() -> Self {
        let mut mapping = BTreeMap::new();
        mapping.insert("Yes".to_string(), Color32::from_rgb(0xff, 0x6b, 0x6b));
        mapping.insert("No".to_string(), Color32::from_rgb(0x4d, 0x96, 0xff));
        mapping.insert(UNKNOWN_CATEGORY.to_string(), Color32::GRAY);
        ColorMap {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }
}

impl ColorMap {
    /// Build a colour map covering `categories` on top of the fixed colours.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = ColorMap::default();
        let extra: Vec<&str> = categories
            .into_iter()
            .filter(|c| !map.mapping.contains_key(*c))
            .collect();
        let palette = generate_palette(extra.len());
        for (category, color) in extra.into_iter().zip(palette) {
            map.mapping.insert(category.to_string(), color);
        }
        map
    }

    /// Look up the colour for a given category.
    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}
