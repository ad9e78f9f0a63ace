//! ECHONET Lite cumulative energy unit (EPC 0xE1) to kWh multiplier.

use crate::{Error, Result};

/// Multiplier for a unit code, or [`Error::InvalidUnitCode`].
pub fn cumulative_unit_multiplier(code: u8) -> Result<f64> {
    // ---
    let multiplier = match code {
        0x00 => 1.0,
        0x01 => 0.1,
        0x02 => 0.01,
        0x03 => 0.001,
        0x04 => 0.0001,
        0x0A => 10.0,
        0x0B => 100.0,
        0x0C => 1000.0,
        0x0D => 10000.0,
        other => return Err(Error::InvalidUnitCode(format!("0x{other:02X}"))),
    };
    Ok(multiplier)
}

/// Read a unit code from an already-coerced property value.
///
/// Fractional, negative and out-of-range values are rejected as invalid codes.
pub fn unit_code_from_value(value: f64) -> Result<u8> {
    // ---
    if value.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&value) {
        return Err(Error::InvalidUnitCode(value.to_string()));
    }
    Ok(value as u8)
}
