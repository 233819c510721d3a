use clap::ValueEnum;
use serde::Deserialize;

/// Named color palettes. Only affect rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Plasma,
    Viridis,
    Rainbow,
    Inferno,
    Cividis,
}

const PLASMA: &[[u8; 3]] = &[
    [13, 8, 135],
    [106, 0, 168],
    [177, 42, 144],
    [225, 100, 98],
    [252, 166, 54],
    [240, 249, 33],
];

const VIRIDIS: &[[u8; 3]] = &[
    [68, 1, 84],
    [65, 68, 135],
    [42, 120, 142],
    [34, 168, 132],
    [122, 209, 81],
    [253, 231, 37],
];

const RAINBOW: &[[u8; 3]] = &[
    [128, 0, 255],
    [40, 120, 245],
    [44, 220, 200],
    [128, 255, 128],
    [255, 180, 70],
    [255, 0, 0],
];

const INFERNO: &[[u8; 3]] = &[
    [0, 0, 4],
    [66, 10, 104],
    [147, 38, 103],
    [221, 81, 58],
    [252, 165, 10],
    [252, 255, 164],
];

const CIVIDIS: &[[u8; 3]] = &[
    [0, 34, 78],
    [53, 69, 108],
    [102, 105, 112],
    [148, 142, 119],
    [200, 184, 102],
    [254, 232, 56],
];

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Plasma => "plasma",
            Theme::Viridis => "viridis",
            Theme::Rainbow => "rainbow",
            Theme::Inferno => "inferno",
            Theme::Cividis => "cividis",
        }
    }

    fn stops(self) -> &'static [[u8; 3]] {
        match self {
            Theme::Plasma => PLASMA,
            Theme::Viridis => VIRIDIS,
            Theme::Rainbow => RAINBOW,
            Theme::Inferno => INFERNO,
            Theme::Cividis => CIVIDIS,
        }
    }

    /// Map `t` in `[0, 1]` to RGB by linear interpolation between stops.
    pub fn color(self, t: f32) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f32;
        let lo = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - lo as f32;
        let (a, b) = (stops[lo], stops[lo + 1]);
        let mut out = [0u8; 3];
        for c in 0..3 {
            out[c] = (a[c] as f32 + (b[c] as f32 - a[c] as f32) * frac).round() as u8;
        }
        out
    }
}
