//! Target device selection and sensor channel extraction.

use crate::{Device, Error, Result, SensorEvent};

/// Metric keys of the Nature Remo sensor channels, in reporting order.
pub const SENSOR_CHANNELS: [&str; 4] = ["te", "hu", "il", "mo"];

// ---

/// Find the device whose id equals `target_id` (first match wins).
pub fn find_target_device<'a>(devices: &'a [Device], target_id: &str) -> Result<&'a Device> {
    // ---
    devices
        .iter()
        .find(|d| d.id == target_id)
        .ok_or_else(|| Error::NotFound {
            device_id: target_id.to_string(),
        })
}

impl Device {
    /// The four sensor channels keyed by metric name.
    ///
    /// A channel is `None` when it is missing, `null`, or carries no `val`.
    pub fn sensor_channels(&self) -> [(&'static str, Option<&SensorEvent>); 4] {
        // ---
        let events = self.newest_events.as_ref();
        [
            (SENSOR_CHANNELS[0], reported(events.and_then(|e| e.te.as_ref()))),
            (SENSOR_CHANNELS[1], reported(events.and_then(|e| e.hu.as_ref()))),
            (SENSOR_CHANNELS[2], reported(events.and_then(|e| e.il.as_ref()))),
            (SENSOR_CHANNELS[3], reported(events.and_then(|e| e.mo.as_ref()))),
        ]
    }
}

fn reported(event: Option<&SensorEvent>) -> Option<&SensorEvent> {
    event.filter(|e| e.val.is_some())
}
