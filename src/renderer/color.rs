use serde::Deserialize;

/// Selects which color palette to use for density rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMap {
    /// Plain intensity: black -> white.
    #[default]
    Grayscale,
    /// Tokyo Night: navy -> blue -> purple -> pink -> orange.
    TokyoNight,
}

pub(crate) const GRAYSCALE_STOPS: [(f64, f64, f64); 5] = [
    (0.0, 0.0, 0.0),
    (64.0, 64.0, 64.0),
    (128.0, 128.0, 128.0),
    (191.0, 191.0, 191.0),
    (255.0, 255.0, 255.0),
];

/// Dark-to-warm palette for dye on a dark background.
pub(crate) const TOKYO_NIGHT_STOPS: [(f64, f64, f64); 5] = [
    (26.0, 27.0, 38.0),
    (122.0, 162.0, 247.0),
    (187.0, 154.0, 247.0),
    (247.0, 118.0, 142.0),
    (255.0, 158.0, 100.0),
];

/// Convert a [0.0, 1.0] value to a 0RGB pixel using the specified color map.
pub fn map_to_rgb(t: f64, colormap: ColorMap) -> u32 {
    let stops = match colormap {
        ColorMap::Grayscale => &GRAYSCALE_STOPS,
        ColorMap::TokyoNight => &TOKYO_NIGHT_STOPS,
    };

    // NaN maps to the bottom stop
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let seg = t * 4.0;
    let i = (seg as usize).min(3);
    let s = seg - i as f64;

    let (r0, g0, b0) = stops[i];
    let (r1, g1, b1) = stops[i + 1];

    let r = (r0 + s * (r1 - r0)) as u32;
    let g = (g0 + s * (g1 - g0)) as u32;
    let b = (b0 + s * (b1 - b0)) as u32;
    r << 16 | g << 8 | b
}
