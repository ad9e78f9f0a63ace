//! Wire models for the Nature Remo Cloud API and the Mackerel tsdb endpoint.
//!
//! Only the fields the bridge reads are modelled. Optional JSON members are
//! `Option`s so that an absent key and an explicit `null` both read as
//! "not reported".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---

/// One entry of `GET /devices`.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    // ---
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub newest_events: Option<NewestEvents>,
}

/// Latest reading per sensor channel of a Nature Remo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewestEvents {
    // ---
    /// Temperature.
    #[serde(default)]
    pub te: Option<SensorEvent>,
    /// Humidity.
    #[serde(default)]
    pub hu: Option<SensorEvent>,
    /// Illuminance.
    #[serde(default)]
    pub il: Option<SensorEvent>,
    /// Human presence (movement).
    #[serde(default)]
    pub mo: Option<SensorEvent>,
}

/// A single sensor value; `val` is kept as raw JSON until normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorEvent {
    // ---
    #[serde(default)]
    pub val: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One entry of `GET /appliances`.
#[derive(Debug, Clone, Deserialize)]
pub struct Appliance {
    // ---
    pub device: ApplianceDevice,
    #[serde(default)]
    pub smart_meter: Option<SmartMeter>,
}

/// The Nature Remo device an appliance is bound to.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplianceDevice {
    // ---
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmartMeter {
    // ---
    #[serde(default)]
    pub echonetlite_properties: Vec<EchonetProperty>,
}

/// ECHONET Lite property as relayed by a Nature Remo E.
#[derive(Debug, Clone, Deserialize)]
pub struct EchonetProperty {
    // ---
    pub epc: u8,
    pub val: Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Energy figure derived from the smart meter registers.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedEnergyMetric {
    // ---
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Host metric record accepted by `POST /tsdb`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    // ---
    pub host_id: String,
    pub name: String,
    pub time: i64,
    pub value: f64,
}

/// `updated_at` wins over `created_at`; both mean "last change".
fn last_changed(
    updated_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    updated_at.or(created_at)
}

impl SensorEvent {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        last_changed(self.updated_at, self.created_at)
    }
}

impl EchonetProperty {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        last_changed(self.updated_at, self.created_at)
    }
}
