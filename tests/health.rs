use storefront_api::{response::ResponseStatus, routes::health::health_check};

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.status, ResponseStatus::Success);
    assert_eq!(response.0.message.as_deref(), Some("Health check"));

    let body = serde_json::to_value(&response.0).expect("serialize");
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(body.get("pagination").is_none());
}
