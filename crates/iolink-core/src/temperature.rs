//! Temperature decoding for process data reported by IO-Link sensors
//!
//! The AL1350 reports process data as a hexadecimal string (e.g. `0x0157`).
//! For the TV7105 the measurement value is transmitted in tenths of a degree,
//! so `0x0157` (343) is 34.3°C.

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// Lowest temperature a TV7105 reports
pub const TV7105_MIN_CELSIUS: f64 = -53.7;

/// Highest temperature a TV7105 reports
pub const TV7105_MAX_CELSIUS: f64 = 157.5;

/// Convert a hexadecimal measurement value in tenths of a degree to Celsius
///
/// An optional `0x` prefix is stripped and the remainder is read as an
/// unsigned base-16 integer of any length, which is then divided by 10.
///
/// ```
/// use iolink_core::hex_to_temperature_celsius;
///
/// assert_eq!(hex_to_temperature_celsius("0x0157"), Ok(34.3));
/// assert!(hex_to_temperature_celsius("zzzz").is_err());
/// ```
pub fn hex_to_temperature_celsius(hex: &str) -> Result<f64, ConversionError> {
    let digits = hex_digits(hex)?;
    let value = digits
        .chars()
        .filter_map(|c| c.to_digit(16))
        .fold(0.0_f64, |acc, d| acc * 16.0 + f64::from(d));
    if !value.is_finite() {
        return Err(ConversionError::Overflow(hex.to_string()));
    }
    Ok(value / 10.0)
}

/// Strip whitespace and an optional `0x` prefix, rejecting anything that is
/// not a non-empty run of hex digits.
fn hex_digits(hex: &str) -> Result<&str, ConversionError> {
    let trimmed = hex.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::Empty);
    }

    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    // from_str_radix would accept a leading '+'
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConversionError::InvalidHex(hex.to_string()));
    }

    Ok(digits)
}

/// How process data is turned into a temperature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureDecoder {
    /// Whole value as an unsigned integer in tenths of a degree
    #[default]
    Scaled,
    /// TV7105 layout: first 16 bits, signed big-endian, range checked
    Tv7105,
}

impl TemperatureDecoder {
    /// Decode raw process data into Celsius
    pub fn decode(&self, raw: &str) -> Result<f64, ConversionError> {
        match self {
            Self::Scaled => hex_to_temperature_celsius(raw),
            Self::Tv7105 => decode_tv7105(raw),
        }
    }
}

fn decode_tv7105(raw: &str) -> Result<f64, ConversionError> {
    let digits = hex_digits(raw)?;
    let word = digits
        .get(..4)
        .ok_or_else(|| ConversionError::InvalidHex(raw.to_string()))?;
    let bits =
        u16::from_str_radix(word, 16).map_err(|_| ConversionError::InvalidHex(raw.to_string()))?;

    let celsius = f64::from(bits as i16) / 10.0;
    if !(TV7105_MIN_CELSIUS..=TV7105_MAX_CELSIUS).contains(&celsius) {
        return Err(ConversionError::OutOfRange {
            value: celsius,
            min: TV7105_MIN_CELSIUS,
            max: TV7105_MAX_CELSIUS,
        });
    }
    Ok(celsius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_and_bare_hex() {
        assert_eq!(hex_to_temperature_celsius("0x0157"), Ok(34.3));
        assert_eq!(hex_to_temperature_celsius("0157"), Ok(34.3));
        assert_eq!(hex_to_temperature_celsius("0x00FF"), Ok(25.5));
        assert_eq!(hex_to_temperature_celsius("0x0000"), Ok(0.0));
        assert_eq!(hex_to_temperature_celsius(" 0X00ff\n"), Ok(25.5));
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(hex_to_temperature_celsius(""), Err(ConversionError::Empty));
        assert!(matches!(
            hex_to_temperature_celsius("zzzz"),
            Err(ConversionError::InvalidHex(_))
        ));
        assert!(hex_to_temperature_celsius("0xGGGG").is_err());
        assert!(hex_to_temperature_celsius("invalid").is_err());
        assert!(hex_to_temperature_celsius("0x").is_err());
        assert!(hex_to_temperature_celsius("+157").is_err());
        assert!(hex_to_temperature_celsius("-157").is_err());
    }

    #[test]
    fn test_values_wider_than_64_bits() {
        // 2^65 - 1
        let celsius = hex_to_temperature_celsius("0x1FFFFFFFFFFFFFFFF").unwrap();
        let expected = 2f64.powi(65) / 10.0;
        assert!((celsius - expected).abs() / expected < 1e-12);

        let celsius = hex_to_temperature_celsius("0x0000000000000000000157").unwrap();
        assert!((celsius - 34.3).abs() < 1e-9);
    }

    #[test]
    fn test_unrepresentable_value_overflows() {
        let huge = format!("0x{}", "F".repeat(300));
        assert!(matches!(
            hex_to_temperature_celsius(&huge),
            Err(ConversionError::Overflow(_))
        ));
    }

    #[test]
    fn test_value_is_integer_divided_by_ten() {
        for n in (0u64..5000).chain([65535, 0xFFFF_FFFF, 123_456_789]) {
            let lower = format!("{:x}", n);
            let upper = format!("0x{:08X}", n);
            let expected = n as f64 / 10.0;
            assert!((hex_to_temperature_celsius(&lower).unwrap() - expected).abs() < 1e-9);
            assert!((hex_to_temperature_celsius(&upper).unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tv7105_uses_first_word() {
        let decoder = TemperatureDecoder::Tv7105;
        assert_eq!(decoder.decode("0x01570000"), Ok(34.3));
        assert_eq!(decoder.decode("0157"), Ok(34.3));
        // -5.0°C in two's complement
        assert_eq!(decoder.decode("0xFFCE"), Ok(-5.0));
    }

    #[test]
    fn test_tv7105_rejects_short_and_out_of_range() {
        let decoder = TemperatureDecoder::Tv7105;
        assert!(matches!(decoder.decode("0x15"), Err(ConversionError::InvalidHex(_))));
        assert!(matches!(
            decoder.decode("0x7FFF"),
            Err(ConversionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_scaled_is_default() {
        assert_eq!(TemperatureDecoder::default(), TemperatureDecoder::Scaled);
        assert_eq!(TemperatureDecoder::default().decode("0x01570000"), Ok(2247884.8));
    }
}
