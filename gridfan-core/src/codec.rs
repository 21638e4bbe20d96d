//! Wire codec for Grid+ payloads
//!
//! Pure conversions between speed percentages, voltages and the byte
//! representations the controller sends and accepts. These are lossy: the
//! controller only takes half-volt steps, so percent → voltage → percent can
//! drift by a few points.

use crate::board::GridPlusV2;
use crate::error::{GridFanError, Result};

const PERCENT_RANGE: f64 = (GridPlusV2::MAX_SPEED - GridPlusV2::MIN_SPEED) as f64;
const VOLTAGE_RANGE: f64 = GridPlusV2::MAX_VOLTAGE - GridPlusV2::MIN_VOLTAGE;

/// Convert a speed percentage into the 2-byte voltage code, as 4 hex chars
///
/// - 0% → `"0000"` (channel off)
/// - anything at or below 20% → 4.0V → `"0400"`
/// - 55% → 7.5V → `"0750"`
/// - 100% → 12.0V → `"0c00"`
///
/// The high byte is the whole volts, the low byte is `0x50` for the upper
/// half-volt and `0x00` otherwise.
pub fn percent_to_voltage_code(percent: f64) -> String {
    if percent == 0.0 {
        return "0000".to_string();
    }

    let above_floor = if percent > f64::from(GridPlusV2::MIN_SPEED) {
        percent - f64::from(GridPlusV2::MIN_SPEED)
    } else {
        0.0
    };
    let voltage = above_floor * (VOLTAGE_RANGE / PERCENT_RANGE) + GridPlusV2::MIN_VOLTAGE;

    let whole = voltage.trunc() as u8;
    let half = if voltage.fract() < 0.5 { 0x00 } else { 0x50 };

    format!("{:02x}{:02x}", whole, half)
}

/// Convert a reported voltage into an approximate speed percentage
///
/// The controller under-reports near the floor, so anything up to 4V that is
/// not exactly zero is treated as the 20% floor.
pub fn voltage_to_percent(voltage: f64) -> u8 {
    if voltage == 0.0 {
        return 0;
    }
    if voltage <= GridPlusV2::MIN_VOLTAGE {
        return GridPlusV2::MIN_SPEED;
    }
    if voltage >= GridPlusV2::MAX_VOLTAGE {
        return GridPlusV2::MAX_SPEED;
    }

    let scaled = ((voltage - GridPlusV2::MIN_VOLTAGE) / VOLTAGE_RANGE) * PERCENT_RANGE;
    scaled.round_ties_even() as u8 + GridPlusV2::MIN_SPEED
}

/// Decode a voltage reading: whole volts plus hundredths, rounded to 0.1V
///
/// Rounding works on the exact value of the sum with ties to even, so
/// (0x07, 0x19) is 7.2V and (0x00, 0x0F) is 0.1V.
pub fn decode_voltage(high: u8, low: u8) -> Result<f64> {
    round_tenths(f64::from(high) + f64::from(low) / 100.0)
}

/// Decode a wattage reading
///
/// The controller packs the value as two decimal digits in one byte
/// (`0x14` is 1.4W), so each nibble must be a decimal digit.
pub fn decode_wattage(byte: u8) -> Result<f64> {
    let (tens, units) = (byte >> 4, byte & 0x0F);
    if tens > 9 || units > 9 {
        return Err(GridFanError::UnexpectedResponse(format!(
            "Wattage byte 0x{:02x} is not decimal-coded",
            byte
        )));
    }

    Ok(f64::from(tens * 10 + units) / 10.0)
}

/// Decode a big-endian 16-bit RPM reading
///
/// - (0x00, 0x00) → 0
/// - (0x01, 0xC2) → 450
#[inline]
pub fn decode_rpm(high: u8, low: u8) -> u16 {
    u16::from_be_bytes([high, low])
}

fn round_tenths(value: f64) -> Result<f64> {
    format!("{:.1}", value)
        .parse()
        .map_err(|e| GridFanError::Internal(format!("Cannot round {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_voltage_code_zero() {
        assert_eq!(percent_to_voltage_code(0.0), "0000");
    }

    #[test]
    fn test_percent_to_voltage_code_quantization() {
        // Device half-volt table
        assert_eq!(percent_to_voltage_code(20.0), "0400");
        assert_eq!(percent_to_voltage_code(25.0), "0450");
        assert_eq!(percent_to_voltage_code(50.0), "0700");
        assert_eq!(percent_to_voltage_code(55.0), "0750");
        assert_eq!(percent_to_voltage_code(63.66), "0800");
        assert_eq!(percent_to_voltage_code(90.0), "0b00");
        assert_eq!(percent_to_voltage_code(100.0), "0c00");
    }

    #[test]
    fn test_percent_below_floor_clamps_to_four_volts() {
        assert_eq!(percent_to_voltage_code(1.0), "0400");
        assert_eq!(percent_to_voltage_code(19.0), "0400");
    }

    #[test]
    fn test_voltage_to_percent() {
        assert_eq!(voltage_to_percent(0.0), 0);
        assert_eq!(voltage_to_percent(3.75), 20);
        assert_eq!(voltage_to_percent(4.0), 20);
        assert_eq!(voltage_to_percent(7.6), 56);
        assert_eq!(voltage_to_percent(12.0), 100);
        assert_eq!(voltage_to_percent(12.25), 100);
    }

    #[test]
    fn test_round_trip_is_quantized() {
        // 63% lands on 8.0V, which reads back as 60%
        assert_eq!(percent_to_voltage_code(63.0), "0800");
        assert_eq!(voltage_to_percent(decode_voltage(0x08, 0x00).unwrap()), 60);
        // 55% lands exactly on 7.5V
        assert_eq!(voltage_to_percent(decode_voltage(0x07, 0x32).unwrap()), 55);
    }

    #[test]
    fn test_decode_voltage() {
        let cases = [
            ((0x07, 0x39), 7.6),
            ((0x0C, 0x00), 12.0),
            ((0x00, 0x00), 0.0),
            ((0x0B, 0x50), 11.8),
        ];
        for ((high, low), expected) in cases {
            assert_eq!(decode_voltage(high, low).unwrap(), expected, "({high:#04x}, {low:#04x})");
        }
    }

    #[test]
    fn test_decode_voltage_rounds_ties_to_even() {
        // 7.25 is exact, the other two sit just below the half
        let cases = [
            ((0x07, 0x19), 7.2),
            ((0x00, 0x0F), 0.1),
            ((0x07, 0x05), 7.0),
        ];
        for ((high, low), expected) in cases {
            assert_eq!(decode_voltage(high, low).unwrap(), expected, "({high:#04x}, {low:#04x})");
        }
        assert_eq!(voltage_to_percent(decode_voltage(0x07, 0x19).unwrap()), 52);
    }

    #[test]
    fn test_decode_wattage() {
        assert_eq!(decode_wattage(0x14).unwrap(), 1.4);
        assert_eq!(decode_wattage(0x04).unwrap(), 0.4);
        assert_eq!(decode_wattage(0x00).unwrap(), 0.0);
        assert_eq!(decode_wattage(0x99).unwrap(), 9.9);
    }

    #[test]
    fn test_decode_wattage_rejects_hex_digits() {
        let err = decode_wattage(0x1A).unwrap_err();
        assert!(matches!(err, GridFanError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_decode_rpm() {
        assert_eq!(decode_rpm(0x01, 0xC2), 450);
        assert_eq!(decode_rpm(0x00, 0x00), 0);
        assert_eq!(decode_rpm(0xFF, 0xFF), 65535);
    }
}
