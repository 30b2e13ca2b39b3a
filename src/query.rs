//! HTTP query boundary - last N alerts behind a bearer token
//!
//! `POST /alerts[?limit=N]` returns up to 10 alerts, newest first.
//! `GET /health` is unauthenticated.

use crate::alert_sink::{Alert, AlertSink, HISTORY_CAPACITY};
use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

#[derive(Clone)]
pub struct QueryState {
    sink: Arc<AlertSink>,
    expected_header: Arc<str>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub message: String,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

pub fn create_router(sink: Arc<AlertSink>, token: &str) -> Router {
    let state = QueryState {
        sink,
        expected_header: Arc::from(format!("Bearer {}", token)),
    };

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/alerts", post(post_alerts))
        .with_state(state)
}

async fn post_alerts(
    State(state): State<QueryState>,
    headers: HeaderMap,
    Query(query): Query<AlertsQuery>,
) -> Response {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == &*state.expected_header)
        .unwrap_or(false);

    if !authorized {
        log::warn!("Rejected /alerts request with invalid or missing token");
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                message: "Forbidden: Invalid or missing token".to_string(),
            }),
        )
            .into_response();
    }

    let limit = query.limit.unwrap_or(HISTORY_CAPACITY).min(HISTORY_CAPACITY);
    let alerts = state.sink.recent(limit);

    let message = if state.sink.history_len() == 0 {
        "No alerts found at the moment".to_string()
    } else {
        format!("Last {} Alerts", alerts.len())
    };

    (StatusCode::OK, Json(AlertsResponse { message, alerts })).into_response()
}

/// Serve the query router until shutdown is signalled
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("🌐 Alert query endpoint listening on http://{}", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert_sink::sink::tests::MemoryLog;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use tower::ServiceExt;

    const TOKEN: &str = "s3cret";

    fn sink() -> Arc<AlertSink> {
        Arc::new(AlertSink::new(Box::new(MemoryLog::default())))
    }

    fn request(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_forbidden() {
        let app = create_router(sink(), TOKEN);

        let response = app.clone().oneshot(request("/alerts", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: ErrorResponse = body_json(response).await;
        assert_eq!(body.message, "Forbidden: Invalid or missing token");

        let response = app
            .oneshot(request("/alerts", Some("Bearer wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let app = create_router(sink(), TOKEN);

        let response = app
            .oneshot(request("/alerts", Some("Bearer s3cret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: AlertsResponse = body_json(response).await;
        assert_eq!(body.message, "No alerts found at the moment");
        assert!(body.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_alerts_newest_first_with_limit() {
        let sink = sink();
        for i in 0..12 {
            sink.emit(Alert::new(format!("S{}", i), "movingAverage", Utc::now(), "r"))
                .await;
        }
        let app = create_router(sink, TOKEN);

        let response = app
            .clone()
            .oneshot(request("/alerts", Some("Bearer s3cret")))
            .await
            .unwrap();
        let body: AlertsResponse = body_json(response).await;
        assert_eq!(body.message, "Last 10 Alerts");
        assert_eq!(body.alerts.len(), 10);
        assert_eq!(body.alerts[0].symbol, "S11");

        let response = app
            .oneshot(request("/alerts?limit=3", Some("Bearer s3cret")))
            .await
            .unwrap();
        let body: AlertsResponse = body_json(response).await;
        assert_eq!(body.alerts.len(), 3);
        assert_eq!(body.alerts[2].symbol, "S9");
    }

    #[tokio::test]
    async fn test_zero_limit_returns_no_alerts() {
        let sink = sink();
        sink.emit(Alert::new("AAPL", "movingAverage", Utc::now(), "r")).await;
        let app = create_router(sink, TOKEN);

        let response = app
            .oneshot(request("/alerts?limit=0", Some("Bearer s3cret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: AlertsResponse = body_json(response).await;
        assert_eq!(body.message, "Last 0 Alerts");
        assert!(body.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let app = create_router(sink(), TOKEN);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
