//! Conversion of named observations into Mackerel metric points.
//!
//! Metric names are `<prefix>.<key>` with spaces replaced by underscores, and
//! timestamps are truncated to whole epoch seconds.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{DerivedEnergyMetric, Error, MetricPoint, Result, SensorEvent};

// ---

/// Something that can be turned into a single metric point.
pub trait Observation {
    /// The observed value as a finite number.
    ///
    /// `metric` is only used to label the error.
    fn numeric_value(&self, metric: &str) -> Result<f64>;

    /// When the value last changed, if reported.
    fn observed_at(&self) -> Option<DateTime<Utc>>;
}

impl Observation for SensorEvent {
    fn numeric_value(&self, metric: &str) -> Result<f64> {
        coerce_number(metric, self.val.as_ref().unwrap_or(&Value::Null))
    }

    fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp()
    }
}

impl Observation for DerivedEnergyMetric {
    fn numeric_value(&self, metric: &str) -> Result<f64> {
        // ---
        if self.value.is_finite() {
            Ok(self.value)
        } else {
            Err(Error::NonNumericValue {
                metric: metric.to_string(),
                value: self.value.to_string(),
            })
        }
    }

    fn observed_at(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }
}

/// Read a JSON number or numeric string as a finite `f64`.
///
/// Anything else (booleans, objects, blank or garbage strings) is an error
/// rather than a silent zero.
pub fn coerce_number(metric: &str, value: &Value) -> Result<f64> {
    // ---
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::NonNumericValue {
            metric: metric.to_string(),
            value: value.to_string(),
        })
}

/// `<prefix>.<key>` with every space replaced by `_`.
pub fn metric_name(prefix: &str, key: &str) -> String {
    format!("{prefix}.{key}").replace(' ', "_")
}

/// Build metric points for one device, preserving the order of `entries`.
///
/// Entries whose observation is `None` are skipped.
pub fn to_metric_points<O: Observation>(
    host_id: &str,
    prefix: &str,
    entries: &[(&str, Option<&O>)],
) -> Result<Vec<MetricPoint>> {
    // ---
    let mut points = Vec::with_capacity(entries.len());

    for (key, observation) in entries {
        let name = metric_name(prefix, key);

        let Some(observation) = observation else {
            tracing::debug!("Skipping {}: channel not reported", name);
            continue;
        };

        let value = observation.numeric_value(&name)?;
        let time = observation
            .observed_at()
            .ok_or_else(|| Error::IncompleteData(format!("{name} has no timestamp")))?
            .timestamp();

        points.push(MetricPoint {
            host_id: host_id.to_string(),
            name,
            time,
            value,
        });
    }

    Ok(points)
}
