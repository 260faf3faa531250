//! PostgreSQL implementation of ProposalRepository.

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgRow};

use super::{column, db_error, ledgers_from_rows, user_id_column};
use crate::domain::foundation::{
    DomainError, ErrorCode, ProposalId, StateMachine, Timestamp, UserId,
};
use crate::domain::governance::{Proposal, ProposalStatus, ProposalType};
use crate::domain::voting::{LedgerDelta, VoteLedger};
use crate::ports::ProposalRepository;

const PROPOSAL_COLUMNS: &str = "id, proposal_type, title, description, proposed_by, \
     proposed_by_name, status, created_at, expires_at, closed_at";

#[derive(Clone)]
pub struct PostgresProposalRepository {
    pool: PgPool,
}

impl PostgresProposalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProposalRepository for PostgresProposalRepository {
    async fn save(&self, proposal: &Proposal) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO proposals (
                id, proposal_type, title, description, proposed_by, proposed_by_name,
                status, created_at, expires_at, closed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(proposal.id().as_uuid())
        .bind(proposal.proposal_type().as_str())
        .bind(proposal.title())
        .bind(proposal.description())
        .bind(proposal.proposed_by().as_str())
        .bind(proposal.proposed_by_name())
        .bind(proposal.status().as_str())
        .bind(proposal.created_at().as_datetime())
        .bind(proposal.expires_at().as_datetime())
        .bind(proposal.closed_at().map(|t| *t.as_datetime()))
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert proposal", e))?;

        let votes = proposal
            .ledger()
            .upvoters()
            .map(|v| (v, "up"))
            .chain(proposal.ledger().downvoters().map(|v| (v, "down")));
        for (voter, direction) in votes {
            sqlx::query(
                "INSERT INTO proposal_votes (proposal_id, voter_id, direction, voted_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(proposal.id().as_uuid())
            .bind(voter.as_str())
            .bind(direction)
            .bind(proposal.created_at().as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert proposal vote", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))
    }

    async fn find_by_id(&self, id: &ProposalId) -> Result<Option<Proposal>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        load_proposal(&mut *conn, id).await
    }

    async fn list(&self) -> Result<Vec<Proposal>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM proposals ORDER BY created_at DESC, id",
            PROPOSAL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list proposals", e))?;

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        attach_ledgers(&mut *conn, rows).await
    }

    async fn apply_delta(
        &self,
        id: &ProposalId,
        delta: &LedgerDelta,
    ) -> Result<Option<Proposal>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let exists = sqlx::query("SELECT id FROM proposals WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock proposal", e))?;
        if exists.is_none() {
            return Ok(None);
        }

        match delta.set_to {
            Some(direction) => {
                sqlx::query(
                    r#"
                    INSERT INTO proposal_votes (proposal_id, voter_id, direction, voted_at)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (proposal_id, voter_id)
                    DO UPDATE SET direction = EXCLUDED.direction, voted_at = EXCLUDED.voted_at
                    "#,
                )
                .bind(id.as_uuid())
                .bind(delta.voter.as_str())
                .bind(direction.as_str())
                .bind(Timestamp::now().as_datetime())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to upsert proposal vote", e))?;
            }
            None => {
                sqlx::query("DELETE FROM proposal_votes WHERE proposal_id = $1 AND voter_id = $2")
                    .bind(id.as_uuid())
                    .bind(delta.voter.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| db_error("Failed to delete proposal vote", e))?;
            }
        }

        let proposal = load_proposal(&mut *tx, id).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(proposal)
    }

    async fn transition_status(
        &self,
        id: &ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        if !from.can_transition_to(&to) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition from {} to {}", from, to),
            ));
        }

        let result = sqlx::query(
            "UPDATE proposals SET status = $3, closed_at = $4 WHERE id = $1 AND status = $2",
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update proposal status", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_voted_by(&self, voter: &UserId) -> Result<Vec<Proposal>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM proposals
            WHERE id IN (SELECT proposal_id FROM proposal_votes WHERE voter_id = $1)
            ORDER BY created_at DESC, id
            "#,
            PROPOSAL_COLUMNS
        ))
        .bind(voter.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find proposals by voter", e))?;

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

async fn load_proposal(
    conn: &mut PgConnection,
    id: &ProposalId,
) -> Result<Option<Proposal>, DomainError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM proposals WHERE id = $1",
        PROPOSAL_COLUMNS
    ))
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to fetch proposal", e))?;

    match row {
        Some(row) => Ok(attach_ledgers(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn attach_ledgers(
    conn: &mut PgConnection,
    rows: Vec<PgRow>,
) -> Result<Vec<Proposal>, DomainError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<uuid::Uuid> = rows
        .iter()
        .map(|row| column(row, "id"))
        .collect::<Result<_, _>>()?;

    let vote_rows = sqlx::query(
        "SELECT proposal_id, voter_id, direction FROM proposal_votes WHERE proposal_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to fetch proposal votes", e))?;
    let mut ledgers = ledgers_from_rows(vote_rows, "proposal_id")?;

    rows.into_iter()
        .map(|row| {
            let id: uuid::Uuid = column(&row, "id")?;
            let ledger = ledgers.remove(&id).unwrap_or_default();
            row_to_proposal(&row, ledger)
        })
        .collect()
}

fn row_to_proposal(row: &PgRow, ledger: VoteLedger) -> Result<Proposal, DomainError> {
    let id: uuid::Uuid = column(row, "id")?;
    let proposal_type: String = column(row, "proposal_type")?;
    let proposal_type: ProposalType = proposal_type
        .parse()
        .map_err(|e| DomainError::store(format!("Invalid proposal type: {}", e)))?;
    let status: String = column(row, "status")?;
    let status: ProposalStatus = status
        .parse()
        .map_err(|e| DomainError::store(format!("Invalid proposal status: {}", e)))?;
    let created_at: chrono::DateTime<chrono::Utc> = column(row, "created_at")?;
    let expires_at: chrono::DateTime<chrono::Utc> = column(row, "expires_at")?;
    let closed_at: Option<chrono::DateTime<chrono::Utc>> = column(row, "closed_at")?;

    Ok(Proposal::reconstitute(
        ProposalId::from_uuid(id),
        proposal_type,
        column(row, "title")?,
        column(row, "description")?,
        user_id_column(row, "proposed_by")?,
        column(row, "proposed_by_name")?,
        ledger,
        status,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(expires_at),
        closed_at.map(Timestamp::from_datetime),
    ))
}
