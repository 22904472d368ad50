use crate::util::hex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("expected `#rrggbb`, got `{0}`")]
    BadFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees [0, 360), saturation and brightness in [0, 1]. The shape
/// the lighting-bridge actions send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsb {
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl Rgb {
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::BadFormat(s.to_string()))?;
        let bytes = hex::from_hex(digits).map_err(|_| ColorError::BadFormat(s.to_string()))?;
        let [r, g, b] = bytes[..] else {
            return Err(ColorError::BadFormat(s.to_string()));
        };
        Ok(Self { r, g, b })
    }

    pub fn to_hex(self) -> String {
        format!("#{}", hex::to_hex(&[self.r, self.g, self.b]))
    }

    pub fn to_hsb(self) -> Hsb {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (((g - b) / delta).rem_euclid(6.0))
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        Hsb {
            hue,
            saturation: if max == 0.0 { 0.0 } else { delta / max },
            brightness: max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_hex() {
        let red = Rgb::parse_hex("#ff0000").unwrap();
        assert_eq!(red, Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(red.to_hex(), "#ff0000");
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(Rgb::parse_hex("ff0000").is_err());
        assert!(Rgb::parse_hex("#ff00").is_err());
        assert!(Rgb::parse_hex("#gg0000").is_err());
    }

    #[test]
    fn hsb_conversion_hits_known_anchors() {
        let red = Rgb { r: 255, g: 0, b: 0 }.to_hsb();
        assert!((red.hue - 0.0).abs() < 0.01);
        assert!((red.saturation - 1.0).abs() < 0.01);
        assert!((red.brightness - 1.0).abs() < 0.01);

        let teal = Rgb { r: 0, g: 255, b: 255 }.to_hsb();
        assert!((teal.hue - 180.0).abs() < 0.01);

        let grey = Rgb { r: 128, g: 128, b: 128 }.to_hsb();
        assert_eq!(grey.hue, 0.0);
        assert_eq!(grey.saturation, 0.0);
    }
}
