use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::info;

use crate::models::{
    AppState, CreateDatasourceRequest, Datasource, QueryOutcome, QueryRequest, Relationship,
    SchemaRequest, StatusResponse, TableSchemas, TableSemantic,
};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/datasources", get(list_datasources))
        .route("/datasources/create", post(create_datasource))
        .route("/datasources/{name}", delete(delete_datasource))
        .route("/datasources/schemas/{name}", get(get_schemas))
        .route("/datasources/generate-relationships", post(generate_relationships))
        .route("/datasources/generate-semantics", post(generate_semantics))
        .route("/datasources/query", post(query))
        .with_state(state)
}

async fn list_datasources(State(state): State<AppState>) -> AppResult<ResponseJson<Vec<Datasource>>> {
    Ok(Json(state.datasources.list_datasources().await?))
}

async fn create_datasource(
    State(state): State<AppState>,
    Json(request): Json<CreateDatasourceRequest>,
) -> AppResult<ResponseJson<StatusResponse<Datasource>>> {
    info!(name = %request.name, engine = %request.engine, "Creating datasource");
    state
        .datasources
        .create_datasource(&request.name, &request.engine, &request.connection_data)
        .await?;

    Ok(Json(StatusResponse::success(
        "Datasource created successfully",
        Some(Datasource {
            name: request.name,
            engine: request.engine,
            description: None,
        }),
    )))
}

async fn delete_datasource(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<ResponseJson<StatusResponse<()>>> {
    info!(name = %name, "Deleting datasource");
    state.datasources.drop_datasource(&name).await?;
    Ok(Json(StatusResponse::success("Datasource deleted successfully", None)))
}

async fn get_schemas(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<ResponseJson<BTreeMap<String, TableSchemas>>> {
    let schemas = state.datasources.table_schemas(&name).await?;
    info!(name = %name, tables = schemas.len(), "Schemas discovered");
    Ok(Json(BTreeMap::from([(name, schemas)])))
}

async fn generate_relationships(
    State(state): State<AppState>,
    Json(request): Json<SchemaRequest>,
) -> AppResult<ResponseJson<StatusResponse<Vec<Relationship>>>> {
    require_schema(&request)?;
    let result = state.relationships.analyze(&request.schema).await?;
    Ok(Json(StatusResponse::success(
        "Relationships generated successfully",
        Some(result.relationships),
    )))
}

async fn generate_semantics(
    State(state): State<AppState>,
    Json(request): Json<SchemaRequest>,
) -> AppResult<ResponseJson<StatusResponse<Vec<TableSemantic>>>> {
    require_schema(&request)?;
    let result = state.semantics.analyze(&request.schema).await?;
    Ok(Json(StatusResponse::success(
        "Semantics generated successfully",
        Some(result.tables),
    )))
}

async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> AppResult<ResponseJson<StatusResponse<QueryOutcome>>> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Datasource name is required".to_string()));
    }
    let outcome = state.datasources.query(&request.query, Some(&request.name)).await?;
    Ok(Json(StatusResponse::success("Query executed successfully", Some(outcome))))
}

fn require_schema(request: &SchemaRequest) -> AppResult<()> {
    let empty = match &request.schema {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        Err(AppError::InvalidRequest("Datasource schemas not found".to_string()))
    } else {
        Ok(())
    }
}
