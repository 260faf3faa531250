//! PostgreSQL implementation of DeletionLog.
//!
//! `deletion_records.original_id` is UNIQUE, so `record` is an
//! `INSERT ... ON CONFLICT DO NOTHING`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};

use super::{column, db_error, user_id_column};
use crate::domain::canvas::{DeletionReason, DeletionRecord, VotableEntity};
use crate::domain::foundation::{DeletionRecordId, DomainError, EntityId, Timestamp};
use crate::ports::DeletionLog;

const RECORD_COLUMNS: &str = "id, original_id, entity_snapshot, reason, deleted_by, \
     deleted_at, restored_at, restored_as";

#[derive(Clone)]
pub struct PostgresDeletionLog {
    pool: PgPool,
}

impl PostgresDeletionLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        column_name: &str,
        id: &uuid::Uuid,
    ) -> Result<Option<DeletionRecord>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM deletion_records WHERE {} = $1",
            RECORD_COLUMNS, column_name
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch deletion record", e))?;

        row.as_ref().map(row_to_record).transpose()
    }
}

#[async_trait]
impl DeletionLog for PostgresDeletionLog {
    async fn record(&self, record: &DeletionRecord) -> Result<bool, DomainError> {
        let snapshot = serde_json::to_value(record.entity_snapshot())
            .map_err(|e| DomainError::store(format!("Failed to encode snapshot: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO deletion_records (
                id, original_id, entity_snapshot, reason, deleted_by,
                deleted_at, restored_at, restored_as
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (original_id) DO NOTHING
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.original_id().as_uuid())
        .bind(snapshot)
        .bind(record.reason().as_str())
        .bind(record.deleted_by().as_str())
        .bind(record.deleted_at().as_datetime())
        .bind(record.restored_at().map(|t| *t.as_datetime()))
        .bind(record.restored_as().map(|id| *id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert deletion record", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(
        &self,
        id: &DeletionRecordId,
    ) -> Result<Option<DeletionRecord>, DomainError> {
        self.find_one("id", id.as_uuid()).await
    }

    async fn find_by_original_id(
        &self,
        original_id: &EntityId,
    ) -> Result<Option<DeletionRecord>, DomainError> {
        self.find_one("original_id", original_id.as_uuid()).await
    }

    async fn list(&self) -> Result<Vec<DeletionRecord>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM deletion_records ORDER BY deleted_at DESC",
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list deletion records", e))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn mark_restored(
        &self,
        id: &DeletionRecordId,
        restored_as: &EntityId,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE deletion_records
            SET restored_at = $2, restored_as = $3
            WHERE id = $1 AND restored_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .bind(restored_as.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark deletion record restored", e))?;

        Ok(result.rows_affected() == 1)
    }
}

fn row_to_record(row: &PgRow) -> Result<DeletionRecord, DomainError> {
    let id: uuid::Uuid = column(row, "id")?;
    let original_id: uuid::Uuid = column(row, "original_id")?;
    let snapshot: serde_json::Value = column(row, "entity_snapshot")?;
    let snapshot: VotableEntity = serde_json::from_value(snapshot)
        .map_err(|e| DomainError::store(format!("Invalid entity snapshot: {}", e)))?;
    let reason: String = column(row, "reason")?;
    let reason: DeletionReason = reason
        .parse()
        .map_err(|e| DomainError::store(format!("Invalid deletion reason: {}", e)))?;
    let deleted_at: chrono::DateTime<chrono::Utc> = column(row, "deleted_at")?;
    let restored_at: Option<chrono::DateTime<chrono::Utc>> = column(row, "restored_at")?;
    let restored_as: Option<uuid::Uuid> = column(row, "restored_as")?;

    Ok(DeletionRecord::reconstitute(
        DeletionRecordId::from_uuid(id),
        EntityId::from_uuid(original_id),
        snapshot,
        reason,
        user_id_column(row, "deleted_by")?,
        Timestamp::from_datetime(deleted_at),
        restored_at.map(Timestamp::from_datetime),
        restored_as.map(EntityId::from_uuid),
    ))
}
