//! Tone mapping from linear radiance to displayable 8-bit color.

use gt_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

/// Rec. 709 luminance weights.
const LUMINANCE_WEIGHTS: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Operator applied to normalized radiance before gamma encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToneMap {
    /// Values above 1 are clipped
    Clamp,
    /// Per-channel `c / (1 + c)`
    Reinhard,
    /// Luminance-based Reinhard where `max_white` maps to 1
    ReinhardExtended { max_white: f32 },
}

impl Default for ToneMap {
    fn default() -> Self {
        ToneMap::ReinhardExtended { max_white: 4.0 }
    }
}

impl ToneMap {
    pub fn apply(&self, color: Color) -> Color {
        match *self {
            ToneMap::Clamp => color,
            ToneMap::Reinhard => reinhard(color),
            ToneMap::ReinhardExtended { max_white } => reinhard_extended_luminance(color, max_white),
        }
    }
}

#[inline]
pub fn luminance(c: Color) -> f32 {
    c.dot(LUMINANCE_WEIGHTS)
}

/// Rescale `c` so its luminance becomes `l_out`. Black stays black.
pub fn change_luminance(c: Color, l_out: f32) -> Color {
    let l_in = luminance(c);
    if l_in <= 0.0 {
        return Color::ZERO;
    }
    c * (l_out / l_in)
}

pub fn reinhard(c: Color) -> Color {
    c / (Color::ONE + c)
}

pub fn reinhard_extended_luminance(c: Color, max_white: f32) -> Color {
    let l_old = luminance(c);
    let max_white = max_white.max(f32::EPSILON);
    let numerator = l_old * (1.0 + l_old / (max_white * max_white));
    change_luminance(c, numerator / (1.0 + l_old))
}

/// Gamma-encode one linear channel.
#[inline]
pub fn linear_to_gamma(linear: f32, gamma: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / gamma)
    } else {
        0.0
    }
}

/// Tone map, gamma encode and quantize a normalized linear color.
pub fn color_to_rgb8(color: Color, tone_map: ToneMap, gamma: f32) -> [u8; 3] {
    let mapped = tone_map.apply(color);
    let quantize = |c: f32| (255.0 * linear_to_gamma(c, gamma).clamp(0.0, 1.0) + 0.5) as u8;
    [quantize(mapped.x), quantize(mapped.y), quantize(mapped.z)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_of_white_is_one() {
        assert!((luminance(Color::ONE) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_change_luminance_handles_black() {
        assert_eq!(change_luminance(Color::ZERO, 1.0), Color::ZERO);
        let c = change_luminance(Color::splat(2.0), 0.5);
        assert!((luminance(c) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reinhard_compresses() {
        let c = reinhard(Color::new(0.0, 1.0, 3.0));
        assert_eq!(c, Color::new(0.0, 0.5, 0.75));
    }

    #[test]
    fn test_reinhard_extended_maps_max_white_to_one() {
        let c = reinhard_extended_luminance(Color::splat(4.0), 4.0);
        assert!((luminance(c) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO, ToneMap::Clamp, 2.2), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::splat(5.0), ToneMap::Clamp, 2.2), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(0.25), ToneMap::Clamp, 2.0), [128, 128, 128]);
        assert_eq!(color_to_rgb8(Color::splat(-1.0), ToneMap::Reinhard, 2.2), [0, 0, 0]);
    }

    #[test]
    fn test_tone_map_config_format() {
        let tm: ToneMap = serde_json::from_str(r#"{"kind":"reinhard_extended","max_white":2.0}"#).unwrap();
        assert_eq!(tm, ToneMap::ReinhardExtended { max_white: 2.0 });
        let tm: ToneMap = serde_json::from_str(r#"{"kind":"clamp"}"#).unwrap();
        assert_eq!(tm, ToneMap::Clamp);
    }
}
