use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Dashboard colours
// ---------------------------------------------------------------------------

pub const GREEN: Color32 = Color32::from_rgb(0x00, 0x80, 0x40);
pub const ORANGE: Color32 = Color32::from_rgb(0xFF, 0x45, 0x00);
pub const SKY: Color32 = Color32::from_rgb(0x00, 0xBF, 0xFF);
pub const GOLD: Color32 = Color32::from_rgb(0xFF, 0xD7, 0x00);
pub const TOMATO: Color32 = Color32::from_rgb(0xFF, 0x63, 0x47);

/// Window background.
pub const BACKGROUND: Color32 = Color32::from_rgb(0x0E, 0x11, 0x17);
/// Date tiles.
pub const TILE: Color32 = Color32::from_rgb(0x26, 0x27, 0x30);

/// Fixed colours used first for categorical charts.
pub const CATEGORY_COLORS: [Color32; 5] = [GREEN, ORANGE, SKY, GOLD, TOMATO];

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// `n` colours: the fixed category colours, then generated hues.
pub fn category_palette(n: usize) -> Vec<Color32> {
    let extra = n.saturating_sub(CATEGORY_COLORS.len());
    CATEGORY_COLORS
        .iter()
        .copied()
        .chain(generate_palette(extra))
        .take(n)
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of a categorical column to stable, distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Assign colours to `labels` in iteration order.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a String>) -> Self {
        let labels: Vec<&String> = labels.into_iter().collect();
        let mapping = labels
            .iter()
            .zip(category_palette(labels.len()))
            .map(|(label, color)| ((*label).clone(), color))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}
