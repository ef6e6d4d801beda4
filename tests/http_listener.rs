//! Reverse-proxy listener probes

use kvshepherd::service::http::{serve, ListenerState};
use kvshepherd::ServiceVariant;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_health_endpoints() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve(
        addr,
        ListenerState {
            variant: ServiceVariant::Store,
        },
        async move {
            let _ = stop_rx.await;
        },
    ));

    let client = Client::new();
    let url = format!("http://{}/health", addr);
    let mut response = None;
    for _ in 0..50 {
        match client.get(&url).send().await {
            Ok(resp) => {
                response = Some(resp);
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
    let response = response.expect("listener never came up");
    assert!(response.status().is_success());
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["variant"], "store");

    let live = client
        .get(format!("http://{}/health/live", addr))
        .send()
        .await
        .unwrap();
    assert!(live.status().is_success());

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
