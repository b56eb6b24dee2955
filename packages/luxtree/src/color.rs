//! Color helpers.
//!
//! Particle colors are stored as linear RGB (`Vec3`). Authoring inputs (hex
//! codes and HSL triples) are sRGB and converted on the way in; HSL offsets
//! round-trip through sRGB so lightness shifts look perceptually even.

use glam::Vec3;

/// Convert one sRGB channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

/// Convert one linear channel to sRGB.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(0.416_666_66) - 0.055
    }
}

/// Linear color from a packed `0xRRGGBB` sRGB value.
pub fn from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
    let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
    let b = (hex & 0xFF) as f32 / 255.0;
    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

/// Linear color from sRGB hue/saturation/lightness, each in `[0, 1]`.
pub fn from_hsl(h: f32, s: f32, l: f32) -> Vec3 {
    let srgb = hsl_to_srgb(h, s, l);
    Vec3::new(
        srgb_to_linear(srgb.x),
        srgb_to_linear(srgb.y),
        srgb_to_linear(srgb.z),
    )
}

/// Hue/saturation/lightness of a linear color.
pub fn to_hsl(color: Vec3) -> (f32, f32, f32) {
    let r = linear_to_srgb(color.x);
    let g = linear_to_srgb(color.y);
    let b = linear_to_srgb(color.z);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (min + max) / 2.0;

    if min == max {
        return (0.0, 0.0, lightness);
    }

    let delta = max - min;
    let saturation = if lightness <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let hue = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    (hue / 6.0, saturation, lightness)
}

/// Shift a linear color in HSL space.
pub fn offset_hsl(color: Vec3, dh: f32, ds: f32, dl: f32) -> Vec3 {
    let (h, s, l) = to_hsl(color);
    from_hsl(h + dh, s + ds, l + dl)
}

fn hsl_to_srgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Vec3::splat(l);
    }

    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;

    Vec3::new(
        hue_to_channel(q, p, h + 1.0 / 3.0),
        hue_to_channel(q, p, h),
        hue_to_channel(q, p, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_hex_primaries() {
        assert!(close(from_hex(0xFF0000), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(from_hex(0xFFFFFF), Vec3::ONE));
        assert!(close(from_hex(0x000000), Vec3::ZERO));
    }

    #[test]
    fn test_mid_gray_is_darker_in_linear() {
        let gray = from_hex(0x808080);
        assert!(gray.x > 0.2 && gray.x < 0.23);
    }

    #[test]
    fn test_hsl_matches_hex() {
        // Pure red: hue 0, full saturation, half lightness.
        assert!(close(from_hsl(0.0, 1.0, 0.5), from_hex(0xFF0000)));
        // Hue wraps around.
        assert!(close(from_hsl(1.0, 1.0, 0.5), from_hex(0xFF0000)));
    }

    #[test]
    fn test_to_hsl_recovers_components() {
        let color = from_hsl(0.4, 0.8, 0.3);
        let (h, s, l) = to_hsl(color);
        assert!((h - 0.4).abs() < 1e-3);
        assert!((s - 0.8).abs() < 1e-3);
        assert!((l - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_offset_lightness() {
        let color = from_hsl(0.38, 0.8, 0.2);
        let brighter = offset_hsl(color, 0.0, 0.0, 0.05);
        let (_, _, l) = to_hsl(brighter);
        assert!((l - 0.25).abs() < 1e-3);
        assert!(brighter.length() > color.length());
    }

    #[test]
    fn test_offset_lightness_clamps() {
        let white = offset_hsl(Vec3::ONE, 0.0, 0.0, 0.5);
        assert!(close(white, Vec3::ONE));
        let black = offset_hsl(Vec3::ZERO, 0.0, 0.0, -0.5);
        assert!(close(black, Vec3::ZERO));
    }
}
