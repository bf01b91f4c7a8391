use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

use crate::data::model::AlertLevel;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn to_color32(rgb: Srgb) -> Color32 {
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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            to_color32(hsl.into_color())
        })
        .collect()
}

/// Heatmap cell colour for `t` in `[0, 1]`: pale yellow through to deep red.
pub fn heat_color(t: f32) -> Color32 {
    let cold = Hsl::new(55.0, 0.9, 0.9);
    let hot = Hsl::new(0.0, 0.85, 0.35);
    to_color32(cold.mix(hot, t.clamp(0.0, 1.0)).into_color())
}

/// Fixed colours for the alert tiers; missing alerts are grey.
pub fn alert_color(alert: Option<AlertLevel>) -> Color32 {
    match alert {
        Some(AlertLevel::Green) => Color32::from_rgb(46, 160, 67),
        Some(AlertLevel::Yellow) => Color32::from_rgb(230, 190, 30),
        Some(AlertLevel::Orange) => Color32::from_rgb(240, 120, 20),
        Some(AlertLevel::Red) => Color32::from_rgb(210, 40, 40),
        None => Color32::GRAY,
    }
}

// ---------------------------------------------------------------------------
// Color mapping: continent → Color32
// ---------------------------------------------------------------------------

/// Maps each continent of the catalog to a distinct colour.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the catalog's continents.
    pub fn new(continents: &BTreeSet<String>) -> Self {
        let palette = generate_palette(continents.len());
        let mapping = continents.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a continent.
    pub fn color_for(&self, continent: &str) -> Color32 {
        self.mapping
            .get(continent)
            .copied()
            .unwrap_or(self.default_color)
    }
}
