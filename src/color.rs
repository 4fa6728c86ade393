use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Country → colour
// ---------------------------------------------------------------------------

/// Stable colour per country, assigned over every country in the table so a
/// country keeps its colour whatever else is selected.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(countries: &[String]) -> Self {
        let mapping = countries
            .iter()
            .cloned()
            .zip(generate_palette(countries.len()))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping
            .get(country)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for correlations
// ---------------------------------------------------------------------------

fn linear(r: u8, g: u8, b: u8) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

/// Blue → light grey → red over `[-1, 1]`. Values outside are clamped.
pub fn diverging(value: f64) -> Color32 {
    let cold = linear(59, 76, 192);
    let neutral = linear(221, 221, 221);
    let warm = linear(180, 4, 38);

    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
    let mixed = if t < 0.5 {
        cold.mix(neutral, t * 2.0)
    } else {
        neutral.mix(warm, (t - 0.5) * 2.0)
    };
    let rgb: Srgb = mixed.into_color();
    to_color32(rgb)
}

/// Readable label colour on top of a [`diverging`] cell.
pub fn label_on(value: f64) -> Color32 {
    if value.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}
