use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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

/// `#rrggbb` notation, as used in exported chart specs.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Parse `#rrggbb`; anything else is `None`.
pub fn from_hex(hex: &str) -> Option<Color32> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of a categorical field to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub field: String,
    /// Labels in domain order.
    domain: Vec<String>,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for `field` from its labels, in the given order.
    pub fn new<I, S>(field: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain: Vec<String> = labels.into_iter().map(Into::into).collect();
        let palette = generate_palette(domain.len());
        let mapping = domain.iter().cloned().zip(palette).collect();

        ColorMap {
            field: field.to_string(),
            domain,
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Rebuild a colour map from an explicit domain/range pair.
    pub fn from_scale(field: &str, domain: &[String], range: &[String]) -> Self {
        let mapping = domain
            .iter()
            .zip(range)
            .filter_map(|(label, hex)| Some((label.clone(), from_hex(hex)?)))
            .collect();

        ColorMap {
            field: field.to_string(),
            domain: domain.to_vec(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Colours in domain order as hex strings.
    pub fn hex_range(&self) -> Vec<String> {
        self.domain
            .iter()
            .map(|label| to_hex(self.color_for(label)))
            .collect()
    }
}
