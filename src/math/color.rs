use glam::Vec3;

use crate::errors::{Result, StrataError};

/// Relative luminance of a linear RGB color.
#[inline]
#[must_use]
pub fn luminance(rgb: Vec3) -> f32 {
    rgb.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

/// Parses a color written as `[r,g,b]`, e.g. `[0.3, 0.5, 1]`.
pub fn parse_rgb(text: &str) -> Result<Vec3> {
    let invalid = || StrataError::InvalidColor(text.to_string());

    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;

    let mut channels = [0.0f32; 3];
    let mut count = 0;
    for part in inner.split(',') {
        if count == channels.len() {
            return Err(invalid());
        }
        channels[count] = part.trim().parse().map_err(|_| invalid())?;
        count += 1;
    }
    if count != channels.len() {
        return Err(invalid());
    }

    Ok(Vec3::from_array(channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_triplets() {
        assert_eq!(parse_rgb("[1,0.5,0]").ok(), Some(Vec3::new(1.0, 0.5, 0.0)));
        assert_eq!(parse_rgb(" [ 0.1 , 0.2 , 0.3 ] ").ok(), Some(Vec3::new(0.1, 0.2, 0.3)));
    }

    #[test]
    fn rejects_malformed_colors() {
        for text in ["", "1,2,3", "[1,2]", "[1,2,3,4]", "[a,b,c]", "[1,2,3"] {
            assert!(parse_rgb(text).is_err(), "{text}");
        }
    }

    #[test]
    fn white_has_unit_luminance() {
        assert!((luminance(Vec3::ONE) - 1.0).abs() < 1e-6);
    }
}
