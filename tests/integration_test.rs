//! Full pull/push cycles against an in-process stand-in for the Nature Remo
//! Cloud API and the Mackerel tsdb endpoint.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use remo_mackerel::{config, pipeline, Config, Error, MetricPoint};
use serde_json::{json, Value};

#[derive(Clone)]
struct Upstream {
    devices: Value,
    appliances: Value,
    devices_status: StatusCode,
    tsdb_status: StatusCode,
    posted: Arc<Mutex<Vec<(HeaderMap, Vec<MetricPoint>)>>>,
}

async fn devices(State(up): State<Upstream>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    // ---
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer nature-secret") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" })));
    }
    (up.devices_status, Json(up.devices))
}

async fn appliances(State(up): State<Upstream>) -> Json<Value> {
    Json(up.appliances)
}

async fn tsdb(
    State(up): State<Upstream>,
    headers: HeaderMap,
    Json(points): Json<Vec<MetricPoint>>,
) -> (StatusCode, String) {
    // ---
    up.posted.lock().unwrap().push((headers, points));
    if up.tsdb_status.is_success() {
        (up.tsdb_status, json!({ "success": true }).to_string())
    } else {
        (up.tsdb_status, "boom".to_string())
    }
}

/// Serve the stand-in on an ephemeral port and return a matching config.
async fn spawn_upstream(up: Upstream) -> Result<Config> {
    // ---
    let app = Router::new()
        .route("/1/devices", get(devices))
        .route("/1/appliances", get(appliances))
        .route("/api/v0/tsdb", post(tsdb))
        .with_state(up);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let base = format!("http://{addr}");
    let cfg = config::load_with(|name| match name {
        "NATURE_TOKEN" => Some("nature-secret".to_string()),
        "MACKEREL_TOKEN" => Some("mackerel-secret".to_string()),
        "MACKEREL_HOST_ID" => Some("host-1".to_string()),
        "TARGET_NATURE_REMO_ID" => Some("A".to_string()),
        "NATURE_API_URL" => Some(format!("{base}/1")),
        "MACKEREL_API_URL" => Some(format!("{base}/api/v0")),
        _ => None,
    })?;
    Ok(cfg)
}

fn smart_meter_appliances() -> Value {
    // ---
    json!([
        { "id": "tv", "type": "TV", "device": { "name": "Living Remo" } },
        {
            "id": "meter",
            "type": "EL_SMART_METER",
            "device": { "name": "Remo E lite" },
            "smart_meter": {
                "echonetlite_properties": [
                    { "epc": 211, "val": "1", "updated_at": "2021-01-01T00:00:00Z" },
                    { "epc": 215, "val": "6", "updated_at": "2021-01-01T00:00:00Z" },
                    { "epc": 224, "val": "12345", "updated_at": "2021-01-01T00:00:30Z" },
                    { "epc": 225, "val": "1", "updated_at": "2021-01-01T00:00:00Z" },
                    { "epc": 227, "val": "7", "updated_at": "2021-01-01T00:00:30Z" },
                    { "epc": 231, "val": "350", "updated_at": "2021-01-01T00:01:00Z" }
                ]
            }
        }
    ])
}

fn upstream(devices: Value, appliances: Value) -> Upstream {
    // ---
    Upstream {
        devices,
        appliances,
        devices_status: StatusCode::OK,
        tsdb_status: StatusCode::OK,
        posted: Arc::new(Mutex::new(Vec::new())),
    }
}

#[tokio::test]
async fn full_cycle_posts_single_batch() -> Result<()> {
    // ---
    let up = upstream(
        json!([
            { "id": "B", "name": "Bedroom", "newest_events": {} },
            {
                "id": "A",
                "name": "Living Remo",
                "newest_events": { "te": { "val": 20, "created_at": "2021-01-01T00:00:00Z" } }
            }
        ]),
        smart_meter_appliances(),
    );
    let posted = up.posted.clone();
    let cfg = spawn_upstream(up).await?;

    let summary = pipeline::run(&cfg).await?;
    assert!(summary.submitted);
    assert_eq!(summary.point_count, 4);
    assert_eq!(summary.device_name, "Living Remo");
    assert_eq!(summary.smart_meter_name, "Remo E lite");

    let posted = posted.lock().unwrap();
    assert_eq!(posted.len(), 1, "batch must be sent in exactly one request");

    let (headers, points) = &posted[0];
    assert_eq!(
        headers.get("x-api-key").and_then(|v| v.to_str().ok()),
        Some("mackerel-secret")
    );

    let device_points: Vec<_> = points
        .iter()
        .filter(|p| p.name.starts_with("Living_Remo."))
        .collect();
    assert_eq!(device_points.len(), 1);
    assert_eq!(device_points[0].name, "Living_Remo.te");
    assert_eq!(device_points[0].value, 20.0);
    assert_eq!(device_points[0].time, 1609459200);
    assert_eq!(device_points[0].host_id, "host-1");

    let energy = points
        .iter()
        .find(|p| p.name == "Remo_E_lite.normal_electric_energy")
        .expect("normal energy point");
    assert!((energy.value - 1234.5).abs() < 1e-9);
    assert_eq!(energy.time, 1609459230);

    Ok(())
}

#[tokio::test]
async fn missing_target_device_posts_nothing() -> Result<()> {
    // ---
    let up = upstream(
        json!([{ "id": "B", "name": "Bedroom", "newest_events": {} }]),
        smart_meter_appliances(),
    );
    let posted = up.posted.clone();
    let cfg = spawn_upstream(up).await?;

    let result = pipeline::run(&cfg).await;
    assert!(matches!(result, Err(Error::NotFound { ref device_id }) if device_id == "A"));
    assert!(posted.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn upstream_failure_aborts_run() -> Result<()> {
    // ---
    let mut up = upstream(json!([]), smart_meter_appliances());
    up.devices_status = StatusCode::SERVICE_UNAVAILABLE;
    let posted = up.posted.clone();
    let cfg = spawn_upstream(up).await?;

    match pipeline::run(&cfg).await {
        Err(Error::Upstream { status, .. }) => assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE),
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert!(posted.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn mackerel_failure_fails_run() -> Result<()> {
    // ---
    let mut up = upstream(
        json!([{ "id": "A", "name": "Living Remo", "newest_events": {} }]),
        smart_meter_appliances(),
    );
    up.tsdb_status = StatusCode::INTERNAL_SERVER_ERROR;
    let posted = up.posted.clone();
    let cfg = spawn_upstream(up).await?;

    match pipeline::run(&cfg).await {
        Err(Error::Upstream {
            service,
            status,
            body,
        }) => {
            assert_eq!(service, "Mackerel API");
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Mackerel upstream error, got {other:?}"),
    }
    assert_eq!(posted.lock().unwrap().len(), 1, "batch is attempted exactly once");

    Ok(())
}

#[tokio::test]
async fn invalid_unit_code_posts_nothing() -> Result<()> {
    // ---
    let mut appliances = smart_meter_appliances();
    appliances[1]["smart_meter"]["echonetlite_properties"][3]["val"] = json!("9");

    let up = upstream(
        json!([{ "id": "A", "name": "Living Remo", "newest_events": {} }]),
        appliances,
    );
    let posted = up.posted.clone();
    let cfg = spawn_upstream(up).await?;

    assert!(matches!(
        pipeline::run(&cfg).await,
        Err(Error::InvalidUnitCode(_))
    ));
    assert!(posted.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn dry_run_skips_push() -> Result<()> {
    // ---
    let up = upstream(
        json!([{ "id": "A", "name": "Living Remo", "newest_events": {} }]),
        smart_meter_appliances(),
    );
    let posted = up.posted.clone();
    let mut cfg = spawn_upstream(up).await?;
    cfg.dry_run = true;

    let summary = pipeline::run(&cfg).await?;
    assert!(!summary.submitted);
    assert_eq!(summary.point_count, 3);
    assert!(posted.lock().unwrap().is_empty());

    Ok(())
}
