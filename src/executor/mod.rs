pub mod mindsdb;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

use crate::models::Rows;
use crate::types::AppResult;

pub use mindsdb::MindsDbClient;

/// Runs SQL against a named external datasource.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute_query(&self, sql: &str, datasource: &str) -> AppResult<Rows>;
}
