//! PostgreSQL implementation of VotableRepository.

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgRow};

use super::{column, db_error, direction_from_str, ledgers_from_rows, net_change, user_id_column};
use crate::domain::canvas::{EntityKind, EntityKindTag, VotableEntity};
use crate::domain::foundation::{DomainError, EntityId, Timestamp, UserId};
use crate::domain::voting::{
    Brightness, LedgerDelta, VoteLedger, MAX_BRIGHTNESS, MIN_BRIGHTNESS, VOTE_STEP,
};
use crate::ports::{AppliedDelta, VotableRepository};

const ENTITY_COLUMNS: &str =
    "id, kind, payload, brightness, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresVotableRepository {
    pool: PgPool,
}

impl PostgresVotableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VotableRepository for PostgresVotableRepository {
    async fn save(&self, entity: &VotableEntity) -> Result<(), DomainError> {
        let payload = serde_json::to_value(entity.kind())
            .map_err(|e| DomainError::store(format!("Failed to encode entity: {}", e)))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO votable_entities (
                id, kind, payload, brightness, created_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                payload = EXCLUDED.payload,
                brightness = EXCLUDED.brightness,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(entity.id().as_uuid())
        .bind(entity.kind_tag().as_str())
        .bind(payload)
        .bind(entity.brightness().value())
        .bind(entity.created_by().as_str())
        .bind(entity.created_at().as_datetime())
        .bind(entity.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to upsert entity", e))?;

        sqlx::query("DELETE FROM entity_votes WHERE entity_id = $1")
            .bind(entity.id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to clear entity votes", e))?;

        let votes = entity
            .ledger()
            .upvoters()
            .map(|v| (v, "up"))
            .chain(entity.ledger().downvoters().map(|v| (v, "down")));
        for (voter, direction) in votes {
            sqlx::query(
                "INSERT INTO entity_votes (entity_id, voter_id, direction, voted_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(entity.id().as_uuid())
            .bind(voter.as_str())
            .bind(direction)
            .bind(entity.updated_at().as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert entity vote", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<VotableEntity>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        load_entity(&mut *conn, id).await
    }

    async fn list(&self, kind: Option<EntityKindTag>) -> Result<Vec<VotableEntity>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM votable_entities WHERE ($1::text IS NULL OR kind = $1) ORDER BY created_at, id",
            ENTITY_COLUMNS
        ))
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list entities", e))?;

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        attach_ledgers(&mut *conn, rows).await
    }

    async fn apply_delta(
        &self,
        id: &EntityId,
        delta: &LedgerDelta,
    ) -> Result<Option<AppliedDelta>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let locked: Option<i32> =
            sqlx::query_scalar("SELECT brightness FROM votable_entities WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to lock entity", e))?;
        let Some(brightness_before) = locked else {
            return Ok(None);
        };
        let brightness_before = Brightness::new(brightness_before)
            .map_err(|e| DomainError::store(format!("Invalid brightness: {}", e)))?;

        let prior: Option<String> = sqlx::query_scalar(
            "SELECT direction FROM entity_votes WHERE entity_id = $1 AND voter_id = $2",
        )
        .bind(id.as_uuid())
        .bind(delta.voter.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to read entity vote", e))?;
        let prior = prior.as_deref().map(direction_from_str).transpose()?;

        let now = Timestamp::now();
        match delta.set_to {
            Some(direction) => {
                sqlx::query(
                    r#"
                    INSERT INTO entity_votes (entity_id, voter_id, direction, voted_at)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (entity_id, voter_id)
                    DO UPDATE SET direction = EXCLUDED.direction, voted_at = EXCLUDED.voted_at
                    "#,
                )
                .bind(id.as_uuid())
                .bind(delta.voter.as_str())
                .bind(direction.as_str())
                .bind(now.as_datetime())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to upsert entity vote", e))?;
            }
            None => {
                sqlx::query("DELETE FROM entity_votes WHERE entity_id = $1 AND voter_id = $2")
                    .bind(id.as_uuid())
                    .bind(delta.voter.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| db_error("Failed to delete entity vote", e))?;
            }
        }

        let step = net_change(prior, delta.set_to) * VOTE_STEP;
        sqlx::query(
            r#"
            UPDATE votable_entities
            SET brightness = LEAST($3, GREATEST($2, brightness + $4)),
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(MIN_BRIGHTNESS)
        .bind(MAX_BRIGHTNESS)
        .bind(step)
        .bind(now.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update brightness", e))?;

        let entity = load_entity(&mut *tx, id).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(entity.map(|entity| AppliedDelta {
            brightness_before,
            entity,
        }))
    }

    async fn delete(&self, id: &EntityId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM votable_entities WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete entity", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_voted_by(&self, voter: &UserId) -> Result<Vec<VotableEntity>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM votable_entities
            WHERE id IN (SELECT entity_id FROM entity_votes WHERE voter_id = $1)
            ORDER BY created_at, id
            "#,
            ENTITY_COLUMNS
        ))
        .bind(voter.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find entities by voter", e))?;

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        attach_ledgers(&mut *conn, rows).await
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

async fn load_entity(
    conn: &mut PgConnection,
    id: &EntityId,
) -> Result<Option<VotableEntity>, DomainError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM votable_entities WHERE id = $1",
        ENTITY_COLUMNS
    ))
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to fetch entity", e))?;

    match row {
        Some(row) => Ok(attach_ledgers(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn attach_ledgers(
    conn: &mut PgConnection,
    rows: Vec<PgRow>,
) -> Result<Vec<VotableEntity>, DomainError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<uuid::Uuid> = rows
        .iter()
        .map(|row| column(row, "id"))
        .collect::<Result<_, _>>()?;

    let vote_rows = sqlx::query(
        "SELECT entity_id, voter_id, direction FROM entity_votes WHERE entity_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to fetch entity votes", e))?;
    let mut ledgers = ledgers_from_rows(vote_rows, "entity_id")?;

    rows.into_iter()
        .map(|row| {
            let id: uuid::Uuid = column(&row, "id")?;
            let ledger = ledgers.remove(&id).unwrap_or_default();
            row_to_entity(&row, ledger)
        })
        .collect()
}

fn row_to_entity(row: &PgRow, ledger: VoteLedger) -> Result<VotableEntity, DomainError> {
    let id: uuid::Uuid = column(row, "id")?;
    let payload: serde_json::Value = column(row, "payload")?;
    let kind: EntityKind = serde_json::from_value(payload)
        .map_err(|e| DomainError::store(format!("Invalid entity payload: {}", e)))?;
    let brightness: i32 = column(row, "brightness")?;
    let brightness = Brightness::new(brightness)
        .map_err(|e| DomainError::store(format!("Invalid brightness: {}", e)))?;
    let created_at: chrono::DateTime<chrono::Utc> = column(row, "created_at")?;
    let updated_at: chrono::DateTime<chrono::Utc> = column(row, "updated_at")?;

    Ok(VotableEntity::reconstitute(
        EntityId::from_uuid(id),
        kind,
        brightness,
        ledger,
        user_id_column(row, "created_by")?,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
