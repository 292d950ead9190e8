use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analyzers::{AnalyticsGenerator, RelationshipsAnalyzer, SemanticsAnalyzer};
use crate::config::Config;
use crate::executor::MindsDbClient;
use crate::pipeline::ChatPipeline;

/// Shared per-process state. Everything inside is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<ChatPipeline>,
    pub datasources: Arc<MindsDbClient>,
    pub relationships: Arc<RelationshipsAnalyzer>,
    pub semantics: Arc<SemanticsAnalyzer>,
    pub analytics: Arc<AnalyticsGenerator>,
}

/// One result row: column name to value, in the executor's column order.
pub type Row = serde_json::Map<String, serde_json::Value>;
pub type Rows = Vec<Row>;

/// Column name to column type (a JSON string).
pub type ColumnTypes = serde_json::Map<String, serde_json::Value>;

/// Table name to a [`ColumnTypes`] object. Both levels keep insertion order,
/// so tables reach the prompts in the order the caller sent them.
pub type TableSchemas = serde_json::Map<String, serde_json::Value>;

// Database context

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    /// "one-to-many", "many-to-one" or "one-to-one"
    pub relationship_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRelationships {
    pub relationships: Vec<Relationship>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSemantic {
    pub column_name: String,
    pub semantic_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSemantic {
    pub table_name: String,
    pub semantic_description: String,
    #[serde(default)]
    pub columns: Vec<ColumnSemantic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSemantics {
    pub tables: Vec<TableSemantic>,
}

/// The pipeline's unit of work: the user's message plus everything known
/// about the target database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatInput {
    pub user_message: String,
    pub db_type: String,
    #[serde(default)]
    pub tables: TableSchemas,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub semantics: Vec<TableSemantic>,
    /// Name of the external datasource the SQL runs against.
    pub db_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub schemas: serde_json::Value,
    pub relationships: serde_json::Value,
    pub semantics: serde_json::Value,
    pub db_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datasource {
    pub name: String,
    pub engine: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub columns: Vec<String>,
    pub data: Rows,
    pub row_count: usize,
}

// API Request/Response types

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub user_message: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsRequest {
    pub db_info: DatabaseInfo,
    pub dashboard_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateDatasourceRequest {
    pub name: String,
    pub engine: String,
    #[serde(default)]
    pub connection_data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaRequest {
    pub schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub name: String,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> StatusResponse<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}
