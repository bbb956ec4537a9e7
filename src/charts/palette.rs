use plotters::style::{RGBColor, BLACK, WHITE};

/// Fill of the age-bracket bars.
pub const BAR_FILL: RGBColor = RGBColor(135, 206, 235);
pub const BAR_EDGE: RGBColor = BLACK;
pub const PIE_COLORS: [RGBColor; 4] = [
    RGBColor(0xff, 0x99, 0x99),
    RGBColor(0x66, 0xb3, 0xff),
    RGBColor(0x99, 0xff, 0x99),
    RGBColor(0xff, 0xcc, 0x99),
];
pub const COUNT_LINE: RGBColor = RGBColor(31, 119, 180);
pub const MEAN_LINE: RGBColor = RGBColor(214, 39, 40);

const YLORRD: [(u8, u8, u8); 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];

/// Yellow-orange-red ramp; `t` is clamped to [0, 1].
pub fn ylorrd(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (YLORRD.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(YLORRD.len() - 2);
    let frac = scaled - lower as f64;
    let (a, b) = (YLORRD[lower], YLORRD[lower + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Position of `value` within `[lo, hi]`, 0 when the range is empty.
pub fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        (value - lo) / (hi - lo)
    } else {
        0.0
    }
}

/// Heat map annotation colour: dark text on light cells.
pub fn annotation_color(value: f64, max: f64) -> RGBColor {
    if value < max / 2.0 {
        BLACK
    } else {
        WHITE
    }
}
