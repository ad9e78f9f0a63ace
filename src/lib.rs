//! Pull Nature Remo sensor and smart meter telemetry and push it to Mackerel
//! as host metrics.
//!
//! This crate follows the Explicit Module Boundary Pattern (EMBP): sibling
//! modules import shared types from this gateway rather than from each other's
//! files, and `main.rs` only needs [`config`] and [`pipeline`].

pub mod clients;
pub mod config;
pub mod device;
mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod smart_meter;
pub mod unit;

pub use clients::{MackerelClient, NatureClient};
pub use config::Config;
pub use device::find_target_device;
pub use error::{Error, Result};
pub use models::{
    Appliance, ApplianceDevice, DerivedEnergyMetric, Device, EchonetProperty, MetricPoint,
    NewestEvents, SensorEvent, SmartMeter,
};
pub use normalize::{coerce_number, metric_name, to_metric_points, Observation};
pub use pipeline::{build_batch, run, Batch, RunSummary};
pub use smart_meter::{decode, select_smart_meter, SmartMeterReadings};
pub use unit::{cumulative_unit_multiplier, unit_code_from_value};
