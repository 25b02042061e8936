//! Write access to the managed data store.
//!
//! `RestBackend` talks to the hosted REST surface, `PgBackend` to Postgres
//! directly and `MemoryBackend` keeps everything in process for dry runs and
//! tests. All of them report failures as `AppError::Backend` carrying the table.

pub mod memory;
pub mod postgres;
pub mod rest;

use crate::domain::customer_user::NewAuthUser;
use crate::domain::error::{AppError, BackendFailure, BackendFailureKind, Result};
use crate::infrastructure::config::BackendCredentials;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;
pub use rest::RestBackend;

pub const AUTH_USERS_TABLE: &str = "auth.users";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Organizations,
    Leads,
    Campaigns,
    CampaignSequences,
    CustomerUsers,
    ActivityEvents,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Leads => "leads",
            Self::Campaigns => "campaigns",
            Self::CampaignSequences => "campaign_sequences",
            Self::CustomerUsers => "customer_users",
            Self::ActivityEvents => "activity_events",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[async_trait]
pub trait BackendStore: Send + Sync {
    /// Short label for logs.
    fn label(&self) -> &'static str;

    /// Inserts `rows` as one write and returns the stored ids in input order.
    async fn insert_rows(&self, table: Table, rows: &[Value]) -> Result<Vec<Uuid>>;

    /// Creates a confirmed auth identity and returns its id.
    async fn create_auth_user(&self, user: &NewAuthUser) -> Result<Uuid>;
}

/// Builds the store the credentials point at.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    async fn connect(&self, credentials: &BackendCredentials) -> Result<Arc<dyn BackendStore>>;
}

pub struct StoreConnector;

#[async_trait]
impl BackendConnector for StoreConnector {
    async fn connect(&self, credentials: &BackendCredentials) -> Result<Arc<dyn BackendStore>> {
        let store: Arc<dyn BackendStore> = match credentials {
            BackendCredentials::Rest(rest) => Arc::new(RestBackend::new(rest)?),
            BackendCredentials::Postgres(pg) => Arc::new(PgBackend::connect(pg).await?),
            BackendCredentials::Memory => Arc::new(MemoryBackend::new()),
        };
        Ok(store)
    }
}

pub fn to_rows<T: Serialize>(table: Table, records: &[T]) -> Result<Vec<Value>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::to_value(record).map_err(|e| {
                AppError::Backend(
                    BackendFailure::new(
                        table.name(),
                        BackendFailureKind::Rejected,
                        format!("Failed to serialize row: {}", e),
                    )
                    .at_record(index),
                )
            })
        })
        .collect()
}

/// Writes `rows` in chunks of `batch_size`, stopping at the first failed chunk.
///
/// `written` tracks acknowledged rows so callers can report progress on
/// failure. A failure's record index is made relative to the whole slice.
pub async fn insert_batched(
    store: &dyn BackendStore,
    table: Table,
    rows: &[Value],
    batch_size: usize,
    written: &mut usize,
) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(rows.len());
    for (chunk_index, chunk) in rows.chunks(batch_size.max(1)).enumerate() {
        let chunk_start = chunk_index * batch_size.max(1);
        let chunk_ids = store
            .insert_rows(table, chunk)
            .await
            .map_err(|err| match err {
                AppError::Backend(failure) => AppError::Backend(failure.offset_by(chunk_start)),
                other => other,
            })?;

        if chunk_ids.len() != chunk.len() {
            return Err(AppError::Backend(
                BackendFailure::new(
                    table.name(),
                    BackendFailureKind::Rejected,
                    format!(
                        "store acknowledged {} of {} rows",
                        chunk_ids.len(),
                        chunk.len()
                    ),
                )
                .at_record(chunk_start),
            ));
        }

        *written += chunk_ids.len();
        ids.extend(chunk_ids);
        debug!(table = %table, written = *written, total = rows.len(), "Batch written");
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_names_match_schema() {
        assert_eq!(Table::CampaignSequences.to_string(), "campaign_sequences");
        assert_eq!(Table::ActivityEvents.name(), "activity_events");
    }

    #[tokio::test]
    async fn test_insert_batched_chunks_and_counts() {
        let store = MemoryBackend::new();
        let org_id = Uuid::new_v4();
        store
            .insert_rows(
                Table::Organizations,
                &[json!({"id": org_id, "slug": "acme", "name": "Acme"})],
            )
            .await
            .unwrap();

        let rows: Vec<Value> = (0..7)
            .map(|_| json!({"id": Uuid::new_v4(), "organization_id": org_id}))
            .collect();
        let mut written = 0;
        let ids = insert_batched(&store, Table::Leads, &rows, 3, &mut written)
            .await
            .unwrap();

        assert_eq!(ids.len(), 7);
        assert_eq!(written, 7);
        // one organization write plus three lead chunks
        assert_eq!(store.write_calls(), 4);
    }

    #[tokio::test]
    async fn test_insert_batched_reports_absolute_index() {
        let store = MemoryBackend::new();
        let org_id = Uuid::new_v4();
        store
            .insert_rows(
                Table::Organizations,
                &[json!({"id": org_id, "slug": "acme", "name": "Acme"})],
            )
            .await
            .unwrap();

        let mut rows: Vec<Value> = (0..6)
            .map(|_| json!({"id": Uuid::new_v4(), "organization_id": org_id}))
            .collect();
        rows[4] = json!({"id": Uuid::new_v4(), "organization_id": Uuid::new_v4()});

        let mut written = 0;
        let err = insert_batched(&store, Table::Leads, &rows, 3, &mut written)
            .await
            .unwrap_err();
        let failure = err.backend_failure().unwrap();
        assert_eq!(failure.kind, BackendFailureKind::ConstraintViolation);
        assert_eq!(failure.record_index, Some(4));
        assert_eq!(written, 3);
    }
}
