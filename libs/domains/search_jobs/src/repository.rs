//! Postgres access for the search pipeline.
//!
//! Table names travel with each job payload, so entity-based sea-orm
//! mapping (fixed at compile time) does not fit; queries are issued with
//! `Statement::from_sql_and_values` against `FromQueryResult` row structs,
//! the same pattern `domain_users`'s OAuth account repository uses for its
//! dynamic lookups.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    FromQueryResult, Statement};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::SearchResult;
use crate::models::{PageNode, PostgresConnectionParams, SummaryNode};

/// Data access boundary the pipeline drives; mocked in tests so pipeline
/// ranking/scoring logic can be exercised without a live Postgres.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchRepository: Send + Sync {
    async fn search_summaries(
        &self,
        params: &PostgresConnectionParams,
        query_embedding: &[f32],
        entry_limit: usize,
    ) -> SearchResult<Vec<SummaryNode>>;

    async fn fetch_pages(
        &self,
        params: &PostgresConnectionParams,
        parents: &[SummaryNode],
        page_limit: usize,
    ) -> SearchResult<Vec<PageNode>>;
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    node_id: String,
    document_id: String,
    path: String,
    summary_text: String,
    similarity: f32,
}

#[derive(Debug, FromQueryResult)]
struct PageRow {
    node_id: String,
    parent_node_id: String,
    path: String,
    content: String,
    image_url: Option<String>,
}

/// Connects to Postgres on demand per job, keyed by DSN so repeated jobs
/// against the same database reuse a connection rather than reconnecting.
pub struct PgSearchRepository {
    connections: RwLock<HashMap<String, Arc<DatabaseConnection>>>,
}

impl PgSearchRepository {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    async fn connection_for(
        &self,
        params: &PostgresConnectionParams,
    ) -> SearchResult<Arc<DatabaseConnection>> {
        let dsn = params.to_dsn();

        if let Some(conn) = self.connections.read().await.get(&dsn) {
            return Ok(conn.clone());
        }

        let mut opts = ConnectOptions::new(dsn.clone());
        opts.min_connections(params.pool_min)
            .max_connections(params.pool_max)
            .connect_timeout(Duration::from_millis(params.connect_timeout_ms))
            .sqlx_logging(false);

        let db = Database::connect(opts).await?;
        db.execute_unprepared(&format!(
            "SET statement_timeout = {}",
            params.statement_timeout_ms
        ))
        .await?;

        let conn = Arc::new(db);
        self.connections
            .write()
            .await
            .insert(dsn, conn.clone());
        Ok(conn)
    }
}

impl Default for PgSearchRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchRepository for PgSearchRepository {
    /// Ranks summary nodes by cosine distance against the query embedding,
    /// tie-breaking on ascending path for stable ordering of equally-similar
    /// entries.
    async fn search_summaries(
        &self,
        params: &PostgresConnectionParams,
        query_embedding: &[f32],
        entry_limit: usize,
    ) -> SearchResult<Vec<SummaryNode>> {
        let conn = self.connection_for(params).await?;

        let vector_literal = format_vector_literal(query_embedding);
        let sql = format!(
            "SELECT node_id, document_id, path, summary_text, \
             (1 - (embedding <=> $1::vector))::real AS similarity \
             FROM {table} \
             ORDER BY embedding <=> $1::vector ASC, path ASC \
             LIMIT $2",
            table = params.summary_table
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            [vector_literal.into(), (entry_limit as i64).into()],
        );

        debug!(table = %params.summary_table, entry_limit, "Querying summary nodes");

        let rows = SummaryRow::find_by_statement(stmt).all(conn.as_ref()).await?;
        Ok(rows
            .into_iter()
            .map(|r| SummaryNode {
                node_id: r.node_id,
                document_id: r.document_id,
                path: r.path,
                summary_text: r.summary_text,
                similarity: r.similarity,
            })
            .collect())
    }

    /// Fetches child page nodes for the given summary parents, sorted by
    /// parent similarity (descending) then path, capped to `page_limit`.
    async fn fetch_pages(
        &self,
        params: &PostgresConnectionParams,
        parents: &[SummaryNode],
        page_limit: usize,
    ) -> SearchResult<Vec<PageNode>> {
        if parents.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connection_for(params).await?;

        let parent_ids: Vec<sea_orm::Value> = parents
            .iter()
            .map(|p| p.node_id.clone().into())
            .collect();
        let placeholders: Vec<String> = (1..=parent_ids.len())
            .map(|i| format!("${i}"))
            .collect();

        // No LIMIT here: the cap is applied in Rust, after sorting by parent
        // score then path, so the highest-ranked pages across all matching
        // parents are the ones kept rather than an arbitrary Postgres-chosen
        // subset.
        let sql = format!(
            "SELECT node_id, parent_node_id, path, content, image_url \
             FROM {table} \
             WHERE parent_node_id IN ({placeholders})",
            table = params.page_table,
            placeholders = placeholders.join(", "),
        );

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, &sql, parent_ids);
        let rows = PageRow::find_by_statement(stmt).all(conn.as_ref()).await?;

        let similarity_by_parent: HashMap<&str, f32> = parents
            .iter()
            .map(|p| (p.node_id.as_str(), p.similarity))
            .collect();

        let mut pages: Vec<PageNode> = rows
            .into_iter()
            .map(|r| {
                let parent_similarity = similarity_by_parent
                    .get(r.parent_node_id.as_str())
                    .copied()
                    .unwrap_or(0.0);
                PageNode {
                    node_id: r.node_id,
                    parent_node_id: r.parent_node_id,
                    path: r.path,
                    content: r.content,
                    image_url: r.image_url,
                    parent_similarity,
                }
            })
            .collect();

        pages.sort_by(|a, b| {
            b.parent_similarity
                .partial_cmp(&a.parent_similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.path.cmp(&b.path))
        });
        pages.truncate(page_limit);

        Ok(pages)
    }
}

/// Formats an embedding as a pgvector literal, e.g. `[0.1,0.2,0.3]`.
fn format_vector_literal(embedding: &[f32]) -> String {
    let mut out = String::with_capacity(embedding.len() * 8 + 2);
    out.push('[');
    for (i, value) in embedding.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&value.to_string());
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_formats_as_bracketed_csv() {
        assert_eq!(format_vector_literal(&[0.1, 0.2, 0.3]), "[0.1,0.2,0.3]");
    }

    #[test]
    fn vector_literal_handles_empty_embedding() {
        assert_eq!(format_vector_literal(&[]), "[]");
    }
}
