mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::http::{request, response_json, send_json};

#[tokio::test]
async fn it_health_live_and_ready() {
    let app = spawn_test_app();

    let live = request(&app.app, Method::GET, "/health/live", None, &[]).await;
    let (live_status, _, _) = response_json(live).await;
    assert_eq!(live_status, StatusCode::OK);

    let ready = request(&app.app, Method::GET, "/health/ready", None, &[]).await;
    let (ready_status, _, _) = response_json(ready).await;
    assert_eq!(ready_status, StatusCode::OK);
}

#[tokio::test]
async fn it_health_reports_monitor_state() {
    let app = spawn_test_app();

    let (status, body) = send_json(&app.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["monitor"]["running"], false);

    send_json(&app.app, Method::POST, "/api/monitor/start", None).await;
    let (_, body) = send_json(&app.app, Method::GET, "/health", None).await;
    assert_eq!(body["monitor"]["running"], true);
}

#[tokio::test]
async fn it_unknown_route_is_json_404_with_trace_id() {
    let app = spawn_test_app();

    let resp = request(
        &app.app,
        Method::GET,
        "/nope",
        None,
        &[("x-request-id", "trace-abc".to_string())],
    )
    .await;
    let (status, headers, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers["x-request-id"], "trace-abc");
    common::http::assert_json_error(&body, "NOT_FOUND");
    assert_eq!(body["traceId"], "trace-abc");
}
