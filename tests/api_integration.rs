//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt;

use bess_sim::api::{AppState, router};
use bess_sim::runner::{DEFAULT_MIN_HOURS, run_bess};

const HOURLY_KEYS: &[&str] = &[
    "timestamp",
    "price",
    "mode",
    "soc_mwh",
    "charge_mw",
    "discharge_mw",
    "charge_cost",
    "discharge_revenue",
    "net_revenue",
    "charge_energy_mwh",
    "discharge_energy_mwh",
    "throughput_mwh",
];

/// Runs the baseline synthetic year and wraps it as API state.
fn build_api_state() -> Arc<AppState> {
    let (cfg, prices) = common::synthetic_year();
    let params = cfg.dispatch_parameters().expect("valid parameters");
    let run = run_bess(&prices, &params, DEFAULT_MIN_HOURS).expect("run succeeds");
    Arc::new(AppState::from(run))
}

async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn summary_matches_the_run() {
    let state = build_api_state();
    let (status, json) = get_json(state.clone(), "/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hours"], state.records.len());
    assert_eq!(
        json["summary"]["Total Net Revenue ($)"].as_f64(),
        Some(state.summary.total_net_revenue)
    );
    assert_eq!(json["parameters"]["threshold_mode"], "global");
}

#[tokio::test]
async fn hourly_range_returns_inclusive_slice() {
    let state = build_api_state();
    let (status, json) = get_json(state.clone(), "/hourly?from=100&to=123").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().expect("array");
    assert_eq!(rows.len(), 24);
    for row in rows {
        let obj = row.as_object().expect("row should be an object");
        for key in HOURLY_KEYS {
            assert!(obj.contains_key(*key), "missing key: {key}");
        }
    }
    assert_eq!(
        rows[0]["soc_mwh"].as_f64(),
        Some(state.records[100].soc_mwh)
    );
}

#[tokio::test]
async fn daily_rows_cover_the_year() {
    let state = build_api_state();
    let (status, json) = get_json(state.clone(), "/daily").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().map(Vec::len), Some(state.daily.len()));
    assert_eq!(state.daily.len(), 366);
}

struct ChildGuard {
    child: Child,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn served_run_answers_over_http() {
    let port = allocate_port();
    let dir = common::scratch_dir("api");
    let _child = spawn_api_process(port, &dir.to_string_lossy());
    let addr = format!("127.0.0.1:{port}");

    wait_for_server(&addr, Duration::from_secs(30));

    let (status, body) = http_get(&addr, "/hourly?from=2&to=4").expect("/hourly request");
    assert_eq!(status, 200);
    let rows: Value = serde_json::from_str(&body).expect("hourly body should be JSON");
    assert_eq!(rows.as_array().map(Vec::len), Some(3));

    let (status, _) = http_get(&addr, "/hourly?from=4&to=2").expect("/hourly request");
    assert_eq!(status, 400);

    let _ = std::fs::remove_dir_all(&dir);
}

fn allocate_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port bind should succeed");
    listener
        .local_addr()
        .expect("local_addr should be available")
        .port()
}

fn spawn_api_process(port: u16, output_dir: &str) -> ChildGuard {
    let child = Command::new(env!("CARGO_BIN_EXE_bess-sim"))
        .args([
            "--preset",
            "baseline",
            "--no-charts",
            "--no-sensitivity",
            "--output-dir",
            output_dir,
            "--serve",
            "--port",
            &port.to_string(),
        ])
        .env("RUST_LOG", "off")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("bess-sim process should spawn");

    ChildGuard { child }
}

fn wait_for_server(addr: &str, timeout: Duration) {
    let start = Instant::now();
    loop {
        if let Ok((200, _)) = http_get(addr, "/summary") {
            return;
        }
        if start.elapsed() >= timeout {
            panic!("timed out waiting for API server on {addr}");
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn http_get(addr: &str, path: &str) -> Result<(u16, String), String> {
    let mut stream = TcpStream::connect(addr).map_err(|err| format!("connect: {err}"))?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .map_err(|err| format!("write: {err}"))?;

    let mut raw = String::new();
    stream
        .read_to_string(&mut raw)
        .map_err(|err| format!("read: {err}"))?;

    let (head, body) = raw
        .split_once("\r\n\r\n")
        .ok_or_else(|| "invalid HTTP response".to_string())?;
    let status_code = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(|| "missing status code".to_string())?
        .parse::<u16>()
        .map_err(|err| format!("invalid status code: {err}"))?;

    Ok((status_code, body.to_string()))
}
