//! PostgreSQL adapters - Database implementations for store ports.
//!
//! - `PostgresVotableRepository` - Entities plus a per-voter `entity_votes` table
//! - `PostgresProposalRepository` - Proposals plus `proposal_votes`
//! - `PostgresDeletionLog` - `deletion_records`, unique per original entity
//!
//! Voter sets live in vote tables keyed by `(aggregate, voter)`. A vote is
//! an upsert or delete on that key plus, for entities, a clamped brightness
//! update in the same transaction.

mod deletion_log;
mod proposal_repository;
mod votable_repository;

pub use deletion_log::PostgresDeletionLog;
pub use proposal_repository::PostgresProposalRepository;
pub use votable_repository::PostgresVotableRepository;

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row};
use std::collections::HashMap;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::voting::{VoteDirection, VoteLedger};

/// Builds the shared connection pool from configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.pool.max)
        .min_connections(config.pool.min)
        .acquire_timeout(config.pool.acquire_timeout())
        .idle_timeout(config.pool.idle_timeout())
        .max_lifetime(config.pool.max_lifetime())
        .connect(&config.url)
        .await
}

/// Applies the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::store(format!("{}: {}", context, err))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::store(format!("Failed to read column {}: {}", name, e)))
}

fn user_id_column(row: &PgRow, name: &str) -> Result<UserId, DomainError> {
    let raw: String = column(row, name)?;
    UserId::new(raw).map_err(|e| DomainError::store(format!("Invalid {}: {}", name, e)))
}

fn direction_from_str(s: &str) -> Result<VoteDirection, DomainError> {
    s.parse()
        .map_err(|e| DomainError::store(format!("Invalid vote direction: {}", e)))
}

/// Groups `(owner, voter, direction)` rows into one ledger per owner.
fn ledgers_from_rows(
    rows: Vec<PgRow>,
    owner_column: &str,
) -> Result<HashMap<uuid::Uuid, VoteLedger>, DomainError> {
    let mut sets: HashMap<uuid::Uuid, (Vec<UserId>, Vec<UserId>)> = HashMap::new();
    for row in &rows {
        let owner: uuid::Uuid = column(row, owner_column)?;
        let voter = user_id_column(row, "voter_id")?;
        let direction: String = column(row, "direction")?;
        let entry = sets.entry(owner).or_default();
        match direction_from_str(&direction)? {
            VoteDirection::Up => entry.0.push(voter),
            VoteDirection::Down => entry.1.push(voter),
        }
    }
    sets.into_iter()
        .map(|(owner, (up, down))| {
            VoteLedger::from_sets(up, down)
                .map(|ledger| (owner, ledger))
                .map_err(|e| DomainError::store(format!("Corrupt vote rows: {}", e)))
        })
        .collect()
}

/// Net change of replacing `prior` with `set_to` for one voter.
fn net_change(prior: Option<VoteDirection>, set_to: Option<VoteDirection>) -> i32 {
    set_to.map_or(0, |d| d.weight()) - prior.map_or(0, |d| d.weight())
}
