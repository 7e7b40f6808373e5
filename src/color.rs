use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Default series colours
// ---------------------------------------------------------------------------

/// The "tab10" cycle matplotlib uses when no colour is given.
const TAB10: [(&str, [u8; 3]); 10] = [
    ("blue", [0x1f, 0x77, 0xb4]),
    ("orange", [0xff, 0x7f, 0x0e]),
    ("green", [0x2c, 0xa0, 0x2c]),
    ("red", [0xd6, 0x27, 0x28]),
    ("purple", [0x94, 0x67, 0xbd]),
    ("brown", [0x8c, 0x56, 0x4b]),
    ("pink", [0xe3, 0x77, 0xc2]),
    ("gray", [0x7f, 0x7f, 0x7f]),
    ("olive", [0xbc, 0xbd, 0x22]),
    ("cyan", [0x17, 0xbe, 0xcf]),
];

/// Colour of the `k`-th series when no custom colour is set.
pub fn default_cycle(k: usize) -> Color32 {
    let [r, g, b] = TAB10[k % TAB10.len()].1;
    Color32::from_rgb(r, g, b)
}

// ---------------------------------------------------------------------------
// Colour strings
// ---------------------------------------------------------------------------

/// Parse a matplotlib-style colour string.
///
/// Accepted forms, tried in order:
/// * single-letter codes `b g r c m y k w`
/// * `tab:<name>` entries of the default cycle
/// * CSS / SVG colour names (`navy`, `darkorange`, ...)
/// * hex `#rrggbb` or `#rgb`
pub fn parse_color(spec: &str) -> Option<Color32> {
    let s = spec.trim().to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }

    let short = match s.as_str() {
        "b" => Some([0, 0, 255]),
        "g" => Some([0, 128, 0]),
        "r" => Some([255, 0, 0]),
        "c" => Some([0, 191, 191]),
        "m" => Some([191, 0, 191]),
        "y" => Some([191, 191, 0]),
        "k" => Some([0, 0, 0]),
        "w" => Some([255, 255, 255]),
        _ => None,
    };
    if let Some([r, g, b]) = short {
        return Some(Color32::from_rgb(r, g, b));
    }

    if let Some(name) = s.strip_prefix("tab:") {
        return TAB10
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, [r, g, b])| Color32::from_rgb(*r, *g, *b));
    }

    let rgb: Srgb<u8> = match palette::named::from_str(&s) {
        Some(named) => named,
        None if s.starts_with('#') => Srgb::from_str(&s).ok()?,
        None => return None,
    };
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}
