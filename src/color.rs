use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::chart::{ColorMapping, ColorScale};

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
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

pub fn fixed(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

const VIRIDIS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

const MAGMA: [[u8; 3]; 5] = [
    [0, 0, 4],
    [81, 18, 124],
    [183, 55, 121],
    [252, 137, 97],
    [252, 253, 191],
];

/// Colour at `t` in `[0, 1]` along a scale, mixed in linear RGB between
/// anchor colours.
pub fn sample_scale(scale: ColorScale, t: f32) -> Color32 {
    let anchors = match scale {
        ColorScale::Viridis => &VIRIDIS,
        ColorScale::Magma => &MAGMA,
    };
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (anchors.len() - 1) as f32;
    let lo = (pos.floor() as usize).min(anchors.len() - 2);
    let frac = pos - lo as f32;

    let linear = |c: [u8; 3]| -> LinSrgb {
        Srgb::new(c[0], c[1], c[2]).into_format::<f32>().into_linear()
    };
    let mixed = linear(anchors[lo]).mix(linear(anchors[lo + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

/// Colours for a series of values, normalised to the series' own range.
pub fn scale_colors(scale: ColorScale, values: &[f64]) -> Vec<Color32> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| {
            let t = if span > 0.0 { (v - min) / span } else { 1.0 };
            sample_scale(scale, t as f32)
        })
        .collect()
}

/// Resolve a chart's colour mapping for a series of values.
pub fn series_colors(mapping: &ColorMapping, values: &[f64]) -> Vec<Color32> {
    match mapping {
        ColorMapping::Fixed(rgb) => vec![fixed(*rgb); values.len()],
        ColorMapping::Continuous { scale, .. } => scale_colors(*scale, values),
        ColorMapping::Categorical { .. } => generate_palette(values.len()),
    }
}

/// Resolve a chart's colour mapping for a series of category labels.
///
/// A categorical mapping over the field `color_map` was built for takes its
/// colours from the map, so a sport keeps one colour across the sidebar and
/// every chart. Any other mapping falls back to [`series_colors`] over the
/// label positions.
pub fn category_colors(
    mapping: &ColorMapping,
    color_map: Option<&ColorMap>,
    categories: &[String],
) -> Vec<Color32> {
    match (mapping, color_map) {
        (ColorMapping::Categorical { field }, Some(cm)) if cm.field == *field => {
            categories.iter().map(|c| cm.color_for(c)).collect()
        }
        _ => {
            let positions: Vec<f64> = (0..categories.len()).map(|i| i as f64).collect();
            series_colors(mapping, &positions)
        }
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Maps category labels (sports) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub field: String,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given field from its categories, in the
    /// order given.
    pub fn new(field: &str, categories: &[String]) -> Self {
        let palette = generate_palette(categories.len());
        let mapping: BTreeMap<String, Color32> = categories
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            field: field.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}
