//! HTTP transport against an in-process fake AL1350

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use iolink_core::endpoint;
use iolink_core::{ClientError, IoLinkMaster, MasterConfig, RequestMode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
struct FakeMaster {
    values: Arc<HashMap<String, String>>,
}

impl FakeMaster {
    fn al1350() -> Self {
        let mut values = HashMap::new();
        values.insert(endpoint::PORT_COUNT.to_string(), "4".to_string());
        for port in 1..=4 {
            values.insert(endpoint::status(port), "0".to_string());
        }
        values.insert(endpoint::status(2), "2".to_string());
        values.insert(endpoint::product_name(2), "TV7105".to_string());
        values.insert(endpoint::process_data(2), "0x0157".to_string());
        Self {
            values: Arc::new(values),
        }
    }

    fn envelope(&self, cid: i64, path: &str) -> Value {
        match self.values.get(path) {
            Some(value) => json!({ "cid": cid, "data": { "value": value }, "code": 200 }),
            None => json!({ "cid": cid, "code": 404 }),
        }
    }
}

async fn handle(State(fake): State<FakeMaster>, method: Method, uri: Uri, body: Bytes) -> Response {
    if method == Method::POST {
        let request: Value = match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        };
        let cid = request["cid"].as_i64().unwrap_or(-1);
        let adr = request["adr"].as_str().unwrap_or_default();
        return fake.envelope(cid, adr).to_string().into_response();
    }

    match uri.path() {
        "/" => "<html><title>ifm electronic AL1350</title></html>".into_response(),
        "/broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "late".into_response()
        }
        path => fake.envelope(-1, path).to_string().into_response(),
    }
}

async fn spawn_fake() -> String {
    let app = Router::new()
        .fallback(handle)
        .with_state(FakeMaster::al1350());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}

fn config(address: String, mode: RequestMode) -> MasterConfig {
    MasterConfig {
        timeout: Duration::from_millis(500),
        mode,
        ..MasterConfig::new(address)
    }
}

#[tokio::test]
async fn test_get_scan() {
    let address = spawn_fake().await;
    let master = IoLinkMaster::connect(config(address, RequestMode::Get))
        .await
        .unwrap();

    assert_eq!(master.port_count().await, 4);

    let scan = master.scan_all_ports().await;
    assert_eq!(scan.len(), 4);
    let port2 = scan.get(2).unwrap();
    assert!(port2.is_connected());
    assert_eq!(port2.name.as_deref(), Some("TV7105"));
    assert_eq!(port2.data.as_deref(), Some("0x0157"));
    assert_eq!(port2.temperature_c, Some(34.3));
    assert!(scan.get(1).unwrap().name.is_none());
}

#[tokio::test]
async fn test_post_mode() {
    let address = spawn_fake().await;
    let master = IoLinkMaster::new(config(address, RequestMode::Post));

    assert_eq!(master.port_count().await, 4);
    assert_eq!(master.temperature_celsius(2).await.unwrap(), 34.3);
}

#[tokio::test]
async fn test_device_error_code() {
    let address = spawn_fake().await;
    let master = IoLinkMaster::new(config(address, RequestMode::Get));

    match master.device_name(9).await {
        Err(ClientError::Device { code, .. }) => assert_eq!(code, 404),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_http_status_error() {
    let address = spawn_fake().await;
    let master = IoLinkMaster::new(config(address, RequestMode::Get));

    assert!(matches!(
        master.perform_request("/broken").await,
        Err(ClientError::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_request_timeout() {
    let address = spawn_fake().await;
    let master = IoLinkMaster::new(config(address, RequestMode::Get));

    assert!(matches!(
        master.perform_request("/slow").await,
        Err(ClientError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_connect_refused() {
    // Grab a free port and release it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result = IoLinkMaster::connect(config(address.clone(), RequestMode::Get)).await;
    assert!(matches!(result, Err(ClientError::Connectivity { .. })));

    // The lazy constructor succeeds and accessors degrade instead
    let master = IoLinkMaster::new(config(address, RequestMode::Get));
    assert_eq!(master.port_count().await, 0);
    assert!(master.scan_all_ports().await.is_empty());
}
