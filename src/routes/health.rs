use axum::{extract::State, response::Json as ResponseJson, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> ResponseJson<Value> {
    Json(json!({
        "name": state.config.server.app_name,
        "version": state.config.server.app_version,
    }))
}

async fn health_check(State(state): State<AppState>) -> ResponseJson<HealthResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: state.config.server.app_version.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::RecordingExecutor;
    use crate::llm::testing::ScriptedAdapter;
    use crate::routes::test_support;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_version() {
        let state = test_support::state(
            &ScriptedAdapter::replying("unused"),
            RecordingExecutor::returning(vec![]),
            "http://127.0.0.1:9",
        );

        let response = router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["version"], "9.9.9");
        assert!(value["timestamp"].is_string());
    }
}
