//! Liveness endpoint.
//!
//! `GET /ping` echoes the `X-Ping-Id` request header (or the response
//! timestamp when absent) and reports the caller's address.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use axum::response::IntoResponse;
use serde::Serialize;

/// Request and response header carrying the ping id.
const PING_ID_HEADER: &str = "x-ping-id";

/// Response for GET /ping.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PingResponse {
    /// Server time in microseconds since the Unix epoch.
    timestamp: i64,
    /// Peer address, if the connection exposes one.
    client_ip: Option<String>,
}

/// Handle GET /ping.
pub(crate) async fn ping(request: Request) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().timestamp_micros();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let id = request
        .headers()
        .get(PING_ID_HEADER)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from(timestamp));

    (
        [(HeaderName::from_static(PING_ID_HEADER), id)],
        Json(PingResponse {
            timestamp,
            client_ip,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;

    use crate::state::test_support::{body_string, create_site, send, test_router};

    #[tokio::test]
    async fn test_ping_echoes_id() {
        let temp_dir = tempfile::tempdir().unwrap();
        let router = test_router(create_site(temp_dir.path()));

        let response = send(
            router,
            Request::builder()
                .uri("/ping")
                .header("X-Ping-Id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ping-id"], "abc-123");
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["timestamp"].as_i64().unwrap() > 0);
        assert!(body["clientIp"].is_null());
    }

    #[tokio::test]
    async fn test_ping_without_id_uses_timestamp() {
        let temp_dir = tempfile::tempdir().unwrap();
        let router = test_router(create_site(temp_dir.path()));

        let response = send(
            router,
            Request::builder().uri("/ping").body(Body::empty()).unwrap(),
        )
        .await;

        let id = response.headers()["x-ping-id"].to_str().unwrap().to_owned();
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(id, body["timestamp"].as_i64().unwrap().to_string());
    }
}
