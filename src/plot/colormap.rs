use plotters::style::RGBColor;

// Diverging blue-white-red map (Moreland), sampled at nine evenly spaced stops.
const COOLWARM: [(u8, u8, u8); 9] = [
    (59, 76, 192),
    (98, 130, 234),
    (141, 176, 254),
    (184, 208, 249),
    (221, 221, 221),
    (245, 196, 173),
    (244, 154, 123),
    (222, 96, 77),
    (180, 4, 38),
];

/// Color at `t` in [0, 1]; values outside are clamped, NaN maps to the midpoint.
pub fn coolwarm(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };

    let segments = (COOLWARM.len() - 1) as f64;
    let position = t * segments;
    let lower = (position.floor() as usize).min(COOLWARM.len() - 2);
    let frac = position - lower as f64;

    let (r0, g0, b0) = COOLWARM[lower];
    let (r1, g1, b1) = COOLWARM[lower + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Maps `value` from `[vmin, vmax]` onto the colormap.
pub fn coolwarm_scaled(value: f64, vmin: f64, vmax: f64) -> RGBColor {
    if vmax <= vmin {
        return coolwarm(0.5);
    }
    coolwarm((value - vmin) / (vmax - vmin))
}
