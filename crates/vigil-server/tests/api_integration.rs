#[allow(dead_code)]
mod common;

use common::{TestServer, test_config};

use vigil_server::config::{RegistryConfig, ServerConfig};

#[tokio::test]
async fn health_check_reports_ok() {
    let server = TestServer::new().await;
    let resp = reqwest::get(format!("{}/health", server.base_url()))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn status_starts_empty() {
    let server = TestServer::new().await;
    let resp = reqwest::get(server.api("/status")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["totalCount"], 0);
    assert_eq!(body["allNeedAttention"], false);
    assert_eq!(body["someNeedAttention"], false);
    assert!(body["uptime"].as_f64().is_some());
}

#[tokio::test]
async fn start_registers_instance() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.api("/start"))
        .json(&serde_json::json!({"instanceId": "a", "name": "Agent A"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["instanceId"], "a");
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["activeCount"], 1);
    assert_eq!(body["instances"][0]["name"], "Agent A");
}

#[tokio::test]
async fn spec_scenario_counts() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    for id in ["a", "b"] {
        client
            .post(server.api("/start"))
            .json(&serde_json::json!({"instanceId": id}))
            .send()
            .await
            .unwrap();
    }
    client
        .post(server.api("/stop"))
        .json(&serde_json::json!({"instanceId": "a"}))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = reqwest::get(server.api("/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["totalCount"], 2);
    assert_eq!(body["activeCount"], 1);
    assert_eq!(body["needsAttentionCount"], 1);
    assert_eq!(body["someNeedAttention"], true);
    assert_eq!(body["allNeedAttention"], false);
}

#[tokio::test]
async fn stop_before_start_is_valid() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.api("/stop"))
        .json(&serde_json::json!({"instanceId": "early-bird"}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["allNeedAttention"], true);
}

#[tokio::test]
async fn default_instance_id_applied() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.api("/start"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["instanceId"], "default");
}

#[tokio::test]
async fn heartbeat_unknown_instance_reports_failure() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.api("/heartbeat"))
        .json(&serde_json::json!({"instanceId": "ghost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["totalCount"], 0);
}

#[tokio::test]
async fn delete_instance_by_path() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    client
        .post(server.api("/start"))
        .json(&serde_json::json!({"instanceId": "a"}))
        .send()
        .await
        .unwrap();

    let resp = client
        .delete(server.api("/instance/a"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["totalCount"], 0);

    // Deleting again reports the instance is gone, still a 200.
    let resp = client
        .delete(server.api("/instance/a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unregister_requires_instance_id() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.api("/unregister"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("instanceId"),
        "error body should name the missing field: {body}"
    );
}

#[tokio::test]
async fn unregister_removes_instance() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    client
        .post(server.api("/start"))
        .json(&serde_json::json!({"instanceId": "a"}))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(server.api("/unregister"))
        .json(&serde_json::json!({"instanceId": "a"}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["totalCount"], 0);
}

#[tokio::test]
async fn stale_instance_flips_on_lazy_sweep() {
    // Tiny timeout so the lazy sweep on the status read does the work
    // without waiting for the background cadence.
    let config = ServerConfig {
        registry: RegistryConfig {
            timeout_ms: 50,
            sweep_interval_ms: 60_000,
        },
        ..test_config()
    };
    let server = TestServer::from_config(config).await;
    let client = reqwest::Client::new();

    client
        .post(server.api("/start"))
        .json(&serde_json::json!({"instanceId": "a"}))
        .send()
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(80)).await;

    let body: serde_json::Value = reqwest::get(server.api("/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["activeCount"], 0);
    assert_eq!(body["allNeedAttention"], true);

    // A heartbeat cannot resurrect the timed-out instance...
    let resp = client
        .post(server.api("/heartbeat"))
        .json(&serde_json::json!({"instanceId": "a"}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    // ...but a fresh start can.
    let resp = client
        .post(server.api("/start"))
        .json(&serde_json::json!({"instanceId": "a"}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["activeCount"], 1);
}

#[tokio::test]
async fn cors_preflight_allowed() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let resp = client
        .request(reqwest::Method::OPTIONS, server.api("/status"))
        .header("Origin", "https://www.youtube.com")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert!(
        resp.headers()
            .contains_key("access-control-allow-origin")
    );
}
