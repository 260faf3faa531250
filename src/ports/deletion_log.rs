//! Deletion log port.
//!
//! Receives a record whenever a text block crosses its deletion threshold.
//! Records are keyed by the original entity id: recording the same entity
//! twice keeps the first record.

use async_trait::async_trait;

use crate::domain::canvas::DeletionRecord;
use crate::domain::foundation::{DeletionRecordId, DomainError, EntityId, Timestamp};

#[async_trait]
pub trait DeletionLog: Send + Sync {
    /// Stores a record unless one already exists for its `original_id`.
    ///
    /// Returns true if this call inserted the record.
    async fn record(&self, record: &DeletionRecord) -> Result<bool, DomainError>;

    async fn find_by_id(&self, id: &DeletionRecordId)
        -> Result<Option<DeletionRecord>, DomainError>;

    async fn find_by_original_id(
        &self,
        original_id: &EntityId,
    ) -> Result<Option<DeletionRecord>, DomainError>;

    /// All records, most recent deletion first.
    async fn list(&self) -> Result<Vec<DeletionRecord>, DomainError>;

    /// Marks a record restored, only if it was not restored before.
    ///
    /// Returns true if this call performed the change.
    async fn mark_restored(
        &self,
        id: &DeletionRecordId,
        restored_as: &EntityId,
        at: Timestamp,
    ) -> Result<bool, DomainError>;
}
