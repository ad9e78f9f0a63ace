//! One pull-transform-push cycle.
//!
//! The run is strictly sequential: fetch devices, fetch appliances, build the
//! whole batch, then push it in a single request. Any error before the push
//! aborts the run without contacting Mackerel.

use std::collections::HashSet;

use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::{
    decode, find_target_device, select_smart_meter, to_metric_points, Appliance, Config, Device,
    Error, MackerelClient, MetricPoint, NatureClient, Result,
};

// ---

/// Metric points built from one pair of API responses.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    // ---
    pub device_name: String,
    pub smart_meter_name: String,
    pub points: Vec<MetricPoint>,
}

/// What a run did, for the final log line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    // ---
    pub device_name: String,
    pub smart_meter_name: String,
    pub point_count: usize,
    pub submitted: bool,
}

/// Build the batch: device sensor points first, then smart meter points.
pub fn build_batch(
    host_id: &str,
    target_device_id: &str,
    devices: &[Device],
    appliances: &[Appliance],
) -> Result<Batch> {
    // ---
    let device = find_target_device(devices, target_device_id)?;
    let mut points = to_metric_points(host_id, &device.name, &device.sensor_channels())?;
    debug!("{} sensor points from '{}'", points.len(), device.name);

    let (appliance, meter) = select_smart_meter(appliances)?;
    let readings = decode(&meter.echonetlite_properties)?;
    points.extend(to_metric_points(
        host_id,
        &appliance.device.name,
        &readings.entries(),
    )?);

    ensure_unique_names(&points)?;

    Ok(Batch {
        device_name: device.name.clone(),
        smart_meter_name: appliance.device.name.clone(),
        points,
    })
}

fn ensure_unique_names(points: &[MetricPoint]) -> Result<()> {
    // ---
    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert((point.host_id.as_str(), point.name.as_str())) {
            return Err(Error::DuplicateMetric(point.name.clone()));
        }
    }
    Ok(())
}

/// Pull from Nature Remo, transform, and push to Mackerel.
#[instrument(skip_all, fields(device_id = %cfg.target_device_id))]
pub async fn run(cfg: &Config) -> Result<RunSummary> {
    // ---
    info!("Starting pull/push cycle");

    let http = Client::new();
    let nature = NatureClient::new(http.clone(), &cfg.nature_api_url, &cfg.nature_token);
    let mackerel = MackerelClient::new(http, &cfg.mackerel_api_url, &cfg.mackerel_token);

    // Step 1: Pull
    let devices = nature.devices().await?;
    debug!("Fetched {} devices", devices.len());
    let appliances = nature.appliances().await?;
    debug!("Fetched {} appliances", appliances.len());

    // Step 2: Transform
    let batch = build_batch(
        &cfg.mackerel_host_id,
        &cfg.target_device_id,
        &devices,
        &appliances,
    )?;
    for point in &batch.points {
        debug!("{} {} = {}", point.time, point.name, point.value);
    }

    // Step 3: Push
    let submitted = if cfg.dry_run {
        info!("DRY_RUN set, not submitting {} points", batch.points.len());
        false
    } else {
        mackerel.post_metrics(&batch.points).await?;
        true
    };

    Ok(RunSummary {
        device_name: batch.device_name,
        smart_meter_name: batch.smart_meter_name,
        point_count: batch.points.len(),
        submitted,
    })
}
