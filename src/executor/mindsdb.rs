// MindsDB HTTP SQL API client.
//
// Every operation is a `POST {base}/api/sql/query` carrying the SQL text and
// an optional default database; datasource management is plain SQL
// (`SHOW FULL DATABASES`, `CREATE DATABASE`, `DROP DATABASE`).

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::executor::QueryExecutor;
use crate::models::{ColumnTypes, Datasource, QueryOutcome, Row, Rows, TableSchemas};
use crate::types::{AppError, AppResult};

/// Databases MindsDB ships with; never listed as user datasources.
const SYSTEM_DATABASES: [&str; 3] = ["mindsdb", "information_schema", "files"];

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

pub struct MindsDbClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SqlRequest<'a> {
    query: &'a str,
    context: SqlContext<'a>,
}

#[derive(Serialize)]
struct SqlContext<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    db: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ResponseType {
    Table,
    Ok,
    Error,
}

#[derive(Debug, Deserialize)]
struct SqlResponse {
    #[serde(rename = "type")]
    kind: ResponseType,
    #[serde(default)]
    column_names: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
    #[serde(default)]
    error_message: Option<String>,
}

impl SqlResponse {
    fn into_rows(self) -> Rows {
        let columns = self.column_names;
        self.data
            .into_iter()
            .map(|values| {
                columns
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect::<Row>()
            })
            .collect()
    }
}

impl MindsDbClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn run(&self, sql: &str, db: Option<&str>) -> AppResult<SqlResponse> {
        let url = format!("{}/api/sql/query", self.base_url);
        debug!(db = ?db, sql_len = sql.len(), "Sending query to MindsDB");

        let response = self
            .client
            .post(&url)
            .json(&SqlRequest {
                query: sql,
                context: SqlContext { db },
            })
            .send()
            .await
            .map_err(|e| AppError::Executor(format!("MindsDB request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Executor(format!(
                "MindsDB returned {}: {}",
                status, error_text
            )));
        }

        let parsed: SqlResponse = response
            .json()
            .await
            .map_err(|e| AppError::Executor(format!("Failed to parse MindsDB response: {}", e)))?;

        match parsed.kind {
            ResponseType::Error => Err(AppError::Executor(
                parsed
                    .error_message
                    .unwrap_or_else(|| "MindsDB reported an unspecified error".to_string()),
            )),
            _ => Ok(parsed),
        }
    }

    /// Run SQL and keep the column order alongside the rows.
    pub async fn query(&self, sql: &str, db: Option<&str>) -> AppResult<QueryOutcome> {
        let response = self.run(sql, db).await?;
        let columns = response.column_names.clone();
        let data = response.into_rows();
        Ok(QueryOutcome {
            row_count: data.len(),
            columns,
            data,
        })
    }

    pub async fn list_datasources(&self) -> AppResult<Vec<Datasource>> {
        let response = self.run("SHOW FULL DATABASES", None).await?;
        let engine_col = response
            .column_names
            .iter()
            .position(|c| c.eq_ignore_ascii_case("engine"));

        let datasources = response
            .data
            .iter()
            .filter_map(|row| {
                let name = row.first().map(cell_text)?;
                if SYSTEM_DATABASES.contains(&name.as_str()) {
                    return None;
                }
                let engine = engine_col
                    .and_then(|i| row.get(i))
                    .filter(|v| !v.is_null())
                    .map(cell_text)
                    .unwrap_or_else(|| "unknown".to_string());
                Some(Datasource {
                    name,
                    engine,
                    description: None,
                })
            })
            .collect();

        Ok(datasources)
    }

    pub async fn create_datasource(
        &self,
        name: &str,
        engine: &str,
        connection_data: &serde_json::Map<String, Value>,
    ) -> AppResult<()> {
        check_identifier("datasource name", name)?;
        check_identifier("engine", engine)?;

        let sql = format!(
            "CREATE DATABASE {} WITH ENGINE = '{}', PARAMETERS = {}",
            name,
            engine,
            serde_json::to_string(connection_data)?
        );
        self.run(&sql, None).await?;
        info!(datasource = name, engine, "Datasource created");
        Ok(())
    }

    pub async fn drop_datasource(&self, name: &str) -> AppResult<()> {
        check_identifier("datasource name", name)?;
        self.run(&format!("DROP DATABASE {}", name), None).await?;
        info!(datasource = name, "Datasource dropped");
        Ok(())
    }

    /// Table → column → type for one datasource. A table whose columns cannot
    /// be read maps to an empty column set.
    pub async fn table_schemas(&self, name: &str) -> AppResult<TableSchemas> {
        check_identifier("datasource name", name)?;

        let tables = self
            .run(&format!("SHOW TABLES FROM {}", name), None)
            .await?
            .data
            .iter()
            .filter_map(|row| row.first().map(cell_text))
            .collect::<Vec<_>>();

        let mut schemas = TableSchemas::new();
        for table in tables {
            let columns = match self.table_columns(name, &table).await {
                Ok(columns) => columns,
                Err(e) => {
                    warn!(datasource = name, table = %table, error = %e, "Failed to read columns");
                    ColumnTypes::new()
                }
            };
            schemas.insert(table, Value::Object(columns));
        }

        Ok(schemas)
    }

    async fn table_columns(&self, db: &str, table: &str) -> AppResult<ColumnTypes> {
        let sql = format!(
            "SELECT COLUMN_NAME, IS_NULLABLE, DATA_TYPE FROM {}.INFORMATION_SCHEMA.COLUMNS WHERE table_name = '{}'",
            db,
            table.replace('\'', "''")
        );

        // Positions: 0 = name, 1 = nullability (unused), 2 = type.
        Ok(self
            .run(&sql, None)
            .await?
            .data
            .iter()
            .filter_map(|row| {
                let column = row.first().map(cell_text).filter(|c| !c.is_empty())?;
                let data_type = row.get(2).map(cell_text).unwrap_or_default();
                Some((column, Value::String(data_type)))
            })
            .collect())
    }
}

#[async_trait]
impl QueryExecutor for MindsDbClient {
    async fn execute_query(&self, sql: &str, datasource: &str) -> AppResult<Rows> {
        let response = self.run(sql, Some(datasource)).await?;
        Ok(response.into_rows())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check_identifier(what: &str, value: &str) -> AppResult<()> {
    if IDENTIFIER.is_match(value) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!(
            "Invalid {} '{}': use letters, digits and underscores",
            what, value
        )))
    }
}
