//! Hex color → CIE xy chromaticity conversion.
//!
//! Pure functions, no I/O. The Hue API addresses color as a chromaticity
//! coordinate rather than RGB, so every configured hex string passes
//! through here exactly once per command.

/// A CIE 1931 chromaticity coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CieXy {
    pub x: f64,
    pub y: f64,
}

/// Near-black guard: below this tristimulus sum the chromaticity
/// normalization would divide by (almost) zero.
const MIN_TRISTIMULUS_SUM: f64 = 1e-10;

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let h = hex.strip_prefix('#').unwrap_or(hex);
    match h.len() {
        3 => {
            let mut digits = h.chars().map(|c| c.to_digit(16));
            let r = digits.next()??;
            let g = digits.next()??;
            let b = digits.next()??;
            // Expand shorthand: 0xA -> 0xAA
            Some(((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
        }
        6 => {
            let r = u8::from_str_radix(&h[0..2], 16).ok()?;
            let g = u8::from_str_radix(&h[2..4], 16).ok()?;
            let b = u8::from_str_radix(&h[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// sRGB transfer function: gamma-encoded 8-bit channel to linear [0,1].
fn srgb_to_linear(c: u8) -> f64 {
    let v = f64::from(c) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a 3- or 6-digit hex color (optional `#`, case-insensitive) to
/// CIE xy chromaticity.
///
/// Returns `None` for malformed input and for near-black colors whose
/// tristimulus sum is too small to normalize — a black light has no
/// chromaticity; "off" is a separate command.
pub fn hex_to_xy(hex: &str) -> Option<CieXy> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let r = srgb_to_linear(r);
    let g = srgb_to_linear(g);
    let b = srgb_to_linear(b);
    // Linear sRGB -> CIE XYZ (D65)
    let x = 0.4124 * r + 0.3576 * g + 0.1805 * b;
    let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    let z = 0.0193 * r + 0.1192 * g + 0.9505 * b;
    let sum = x + y + z;
    if sum < MIN_TRISTIMULUS_SUM {
        return None;
    }
    Some(CieXy {
        x: x / sum,
        y: y / sum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_six_digit_hex() {
        let xy = hex_to_xy("#DA7756").unwrap();
        assert!(xy.x > 0.0 && xy.x < 1.0);
        assert!(xy.y > 0.0 && xy.y < 1.0);
    }

    #[test]
    fn test_deterministic() {
        let a = hex_to_xy("#DA7756").unwrap();
        let b = hex_to_xy("#DA7756").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prefix_and_case_insensitive() {
        assert_eq!(hex_to_xy("#DA7756"), hex_to_xy("da7756"));
        assert_eq!(hex_to_xy("#ABC"), hex_to_xy("abc"));
    }

    #[test]
    fn test_shorthand_expands() {
        // #fff == #ffffff exactly
        assert_eq!(hex_to_xy("#fff"), hex_to_xy("#ffffff"));
        assert_eq!(hex_to_xy("#e73"), hex_to_xy("#ee7733"));
    }

    #[test]
    fn test_chromaticity_is_normalized() {
        for hex in ["#ffffff", "#ff0000", "#00ff00", "#0000ff", "#DA7756", "#123456"] {
            let xy = hex_to_xy(hex).unwrap();
            assert!((0.0..=1.0).contains(&xy.x), "{hex}: x out of range");
            assert!((0.0..=1.0).contains(&xy.y), "{hex}: y out of range");
            assert!(xy.x + xy.y <= 1.0, "{hex}: x+y > 1");
        }
    }

    #[test]
    fn test_malformed_rejected() {
        for bad in ["", "#", "#12", "#12345", "#1234567", "gggggg", "#xyzxyz", "not a color"] {
            assert!(hex_to_xy(bad).is_none(), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn test_near_black_rejected() {
        assert!(hex_to_xy("#000000").is_none());
        assert!(hex_to_xy("#000").is_none());
    }

    #[test]
    fn test_primaries_land_on_srgb_chromaticities() {
        // Pure red should sit near the sRGB red primary (0.64, 0.33).
        let red = hex_to_xy("#ff0000").unwrap();
        assert!((red.x - 0.64).abs() < 0.01);
        assert!((red.y - 0.33).abs() < 0.01);
    }
}
