//! Hex color parsing.

use palette::Srgba;

use crate::error::{FaviconError, Result};

/// Parses a `#`-prefixed or bare hex color into 8-bit RGBA channels.
///
/// Accepts 3, 4, 6 or 8 hex digits. Short forms are expanded by doubling each
/// digit (`"c"` becomes `"cc"`). When no alpha digits are given the color is
/// fully opaque.
///
/// ```
/// use favicon_badge::parse_hex_color;
/// use palette::Srgba;
///
/// assert_eq!(parse_hex_color("#cf3").unwrap(), Srgba::<u8>::new(204, 255, 51, 255));
/// assert!(parse_hex_color("#ccff3").is_err());
/// ```
pub fn parse_hex_color(input: &str) -> Result<Srgba<u8>> {
    let hex = input.strip_prefix('#').unwrap_or(input);
    let invalid = || FaviconError::InvalidColor(input.to_string());

    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let digits: Vec<u8> = match hex.len() {
        3 | 4 => hex.bytes().flat_map(|b| [b, b]).collect(),
        6 | 8 => hex.bytes().collect(),
        _ => return Err(invalid()),
    };

    let channel = |i: usize| -> Result<u8> {
        let pair = std::str::from_utf8(&digits[i * 2..i * 2 + 2]).map_err(|_| invalid())?;
        u8::from_str_radix(pair, 16).map_err(|_| invalid())
    };

    let alpha = if digits.len() == 8 { channel(3)? } else { 255 };
    Ok(Srgba::new(channel(0)?, channel(1)?, channel(2)?, alpha))
}

/// Replaces the color channels of every visible pixel, keeping its alpha.
///
/// Fully transparent pixels are left untouched.
pub fn recolor(image: &mut image::RgbaImage, color: Srgba<u8>) {
    for pixel in image.pixels_mut() {
        if pixel[3] != 0 {
            pixel[0] = color.red;
            pixel[1] = color.green;
            pixel[2] = color.blue;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn ccff33() -> Srgba<u8> {
        Srgba::new(204, 255, 51, 255)
    }

    #[test]
    fn parses_long_form() {
        assert_eq!(parse_hex_color("#ccff33").unwrap(), ccff33());
        assert_eq!(parse_hex_color("ccff33").unwrap(), ccff33());
    }

    #[test]
    fn explicit_opaque_alpha_matches_default() {
        assert_eq!(parse_hex_color("#ccff33ff").unwrap(), ccff33());
    }

    #[test]
    fn short_forms_expand() {
        assert_eq!(parse_hex_color("#cf3").unwrap(), ccff33());
        assert_eq!(parse_hex_color("#cf3f").unwrap(), ccff33());
        assert_eq!(parse_hex_color("#CF3").unwrap(), ccff33());
    }

    #[test]
    fn short_and_long_forms_agree() {
        for short in ["000", "fff", "a1b", "09f", "7e2c", "f00a"] {
            let long: String = short.chars().flat_map(|c| [c, c]).collect();
            assert_eq!(
                parse_hex_color(short).unwrap(),
                parse_hex_color(&long).unwrap(),
                "{short} vs {long}"
            );
        }
    }

    #[test]
    fn reads_alpha_channel() {
        let color = parse_hex_color("#ff000080").unwrap();
        assert_eq!(color, Srgba::<u8>::new(255, 0, 0, 128));
        assert_eq!(parse_hex_color("#f008").unwrap().alpha, 0x88);
    }

    #[test]
    fn rejects_bad_lengths() {
        for input in ["", "#", "#f", "#ff", "#fffff", "#fffffff", "#fffffffff"] {
            assert!(
                matches!(parse_hex_color(input), Err(FaviconError::InvalidColor(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_hex_digits() {
        for input in ["#ggg", "#12345z", "#+12", "# 12", "#ccff3é"] {
            assert!(
                matches!(parse_hex_color(input), Err(FaviconError::InvalidColor(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn recolor_keeps_alpha_and_skips_transparent() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 100]));
        img.put_pixel(2, 0, Rgba([10, 20, 30, 0]));

        recolor(&mut img, Srgba::new(1, 2, 3, 255));

        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [1, 2, 3, 100]);
        assert_eq!(img.get_pixel(2, 0).0, [10, 20, 30, 0]);
    }
}
