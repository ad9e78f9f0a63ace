//! Smart meter decoding for the ECHONET Lite properties relayed by a
//! Nature Remo E.
//!
//! Cumulative energy in kWh is `register × coefficient × unit multiplier`;
//! instantaneous power (W) is reported unscaled.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    coerce_number, cumulative_unit_multiplier, unit_code_from_value, Appliance,
    DerivedEnergyMetric, EchonetProperty, Error, Result, SmartMeter,
};

/// Coefficient (0xD3).
pub const EPC_COEFFICIENT: u8 = 0xD3;
/// Number of effective digits for cumulative energy (0xD7).
pub const EPC_EFFECTIVE_DIGITS: u8 = 0xD7;
/// Normal direction cumulative energy (0xE0).
pub const EPC_NORMAL_CUMULATIVE: u8 = 0xE0;
/// Unit for cumulative energy (0xE1).
pub const EPC_CUMULATIVE_UNIT: u8 = 0xE1;
/// Reverse direction cumulative energy (0xE3).
pub const EPC_REVERSE_CUMULATIVE: u8 = 0xE3;
/// Measured instantaneous power (0xE7).
pub const EPC_INSTANTANEOUS_POWER: u8 = 0xE7;

pub const NORMAL_ELECTRIC_ENERGY: &str = "normal_electric_energy";
pub const REVERSE_ELECTRIC_ENERGY: &str = "reverse_electric_energy";
pub const MEASURED_INSTANTANEOUS: &str = "measured_instantaneous";

// ---

/// Decoded smart meter figures, ready for normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartMeterReadings {
    // ---
    pub normal_electric_energy: DerivedEnergyMetric,
    pub reverse_electric_energy: DerivedEnergyMetric,
    pub measured_instantaneous: DerivedEnergyMetric,
}

impl SmartMeterReadings {
    /// Metric key / value pairs in their fixed reporting order.
    pub fn entries(&self) -> [(&'static str, Option<&DerivedEnergyMetric>); 3] {
        [
            (NORMAL_ELECTRIC_ENERGY, Some(&self.normal_electric_energy)),
            (REVERSE_ELECTRIC_ENERGY, Some(&self.reverse_electric_energy)),
            (MEASURED_INSTANTANEOUS, Some(&self.measured_instantaneous)),
        ]
    }
}

/// Pick the smart meter appliance together with its meter data.
///
/// Only one smart meter per account is supported: the first appliance
/// carrying `smart_meter` data wins and later ones are ignored.
pub fn select_smart_meter(appliances: &[Appliance]) -> Result<(&Appliance, &SmartMeter)> {
    // ---
    let mut meters = appliances
        .iter()
        .filter_map(|a| a.smart_meter.as_ref().map(|m| (a, m)));

    let (appliance, meter) = meters.next().ok_or_else(|| {
        Error::IncompleteData("no appliance reports smart meter data".to_string())
    })?;

    let ignored = meters.count();
    if ignored > 0 {
        warn!(
            "Found {} additional smart meter(s); using '{}' only",
            ignored, appliance.device.name
        );
    }

    Ok((appliance, meter))
}

/// First property with the given EPC, in source order.
fn find_property(properties: &[EchonetProperty], epc: u8) -> Result<&EchonetProperty> {
    // ---
    properties.iter().find(|p| p.epc == epc).ok_or_else(|| {
        Error::IncompleteData(format!(
            "incomplete smart meter data: property 0x{epc:02X} ({epc}) missing"
        ))
    })
}

fn property_value(prop: &EchonetProperty) -> Result<f64> {
    coerce_number(&format!("epc 0x{:02X}", prop.epc), &prop.val)
}

fn property_timestamp(prop: &EchonetProperty) -> Result<DateTime<Utc>> {
    // ---
    prop.timestamp().ok_or_else(|| {
        Error::IncompleteData(format!(
            "smart meter property 0x{:02X} has no timestamp",
            prop.epc
        ))
    })
}

/// Derive cumulative energy and instantaneous power from raw properties.
pub fn decode(properties: &[EchonetProperty]) -> Result<SmartMeterReadings> {
    // ---
    let normal = find_property(properties, EPC_NORMAL_CUMULATIVE)?;
    let reverse = find_property(properties, EPC_REVERSE_CUMULATIVE)?;
    let coefficient = find_property(properties, EPC_COEFFICIENT)?;
    let unit = find_property(properties, EPC_CUMULATIVE_UNIT)?;
    let effective_digits = find_property(properties, EPC_EFFECTIVE_DIGITS)?;
    let instantaneous = find_property(properties, EPC_INSTANTANEOUS_POWER)?;

    let multiplier = cumulative_unit_multiplier(unit_code_from_value(property_value(unit)?)?)?;
    let coefficient = property_value(coefficient)?;

    debug!(
        "Smart meter coefficient={} unit multiplier={} effective digits={}",
        coefficient, multiplier, effective_digits.val
    );

    Ok(SmartMeterReadings {
        normal_electric_energy: DerivedEnergyMetric {
            value: property_value(normal)? * coefficient * multiplier,
            timestamp: property_timestamp(normal)?,
        },
        reverse_electric_energy: DerivedEnergyMetric {
            value: property_value(reverse)? * coefficient * multiplier,
            timestamp: property_timestamp(reverse)?,
        },
        measured_instantaneous: DerivedEnergyMetric {
            value: property_value(instantaneous)?,
            timestamp: property_timestamp(instantaneous)?,
        },
    })
}
