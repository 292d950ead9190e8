use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::post,
    Json, Router,
};
use futures::StreamExt;
use serde_json::Value;
use tracing::info;

use crate::models::{AnalyticsRequest, AppState, ChatInput, ClassifyRequest};
use crate::pipeline::{encode, PipelineResult};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat/stream", post(stream_chat))
        .route("/chat/generateSQL", post(generate_sql))
        .route("/chat/classify", post(classify))
        .route("/chat/analytics", post(analytics))
        .with_state(state)
}

async fn stream_chat(State(state): State<AppState>, Json(input): Json<ChatInput>) -> Response {
    info!(
        db = %input.db_name,
        message_len = input.user_message.len(),
        "Received streaming chat request"
    );

    let records = state.pipeline.stream(input).map(|event| encode(&event));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(records),
    )
        .into_response()
}

async fn generate_sql(
    State(state): State<AppState>,
    Json(input): Json<ChatInput>,
) -> AppResult<ResponseJson<PipelineResult>> {
    info!(db = %input.db_name, "Received blocking chat request");
    Ok(Json(state.pipeline.invoke(&input).await?))
}

async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> AppResult<ResponseJson<String>> {
    Ok(Json(state.pipeline.classify(&request.user_message).await?))
}

async fn analytics(
    State(state): State<AppState>,
    Json(request): Json<AnalyticsRequest>,
) -> AppResult<ResponseJson<Value>> {
    info!(dashboard_id = %request.dashboard_id, "Generating dashboard panels");

    let mut config = state.analytics.generate(&request.db_info).await?;
    let panels = config.as_array_mut().ok_or_else(|| {
        AppError::MalformedOutput("Generated configuration is not a list of panels".to_string())
    })?;

    for panel in panels.iter_mut() {
        if let Some(panel) = panel.as_object_mut() {
            panel.insert(
                "dashboard_id".to_string(),
                Value::String(request.dashboard_id.clone()),
            );
        }
    }

    Ok(Json(config))
}
