//! Shared application state for the HTTP surface.

use std::sync::Arc;

use crate::application::handlers::canvas::{
    CastEntityVoteHandler, CreateEntityHandler, GetEntityHandler, GetEntityVoteHandler,
    ListDeletionsHandler, ListEntitiesHandler, ReconcileEntityHandler, RestoreDeletedBlockHandler,
};
use crate::application::handlers::governance::{
    CastProposalVoteHandler, CreateProposalHandler, GetProposalHandler, GetProposalVoteHandler,
    ListProposalsHandler,
};
use crate::application::handlers::voter::RemoveVoterHandler;
use crate::application::{ProposalExpiryChecker, ProposalThresholds, ThresholdEnforcer};
use crate::domain::foundation::AdminRoster;
use crate::ports::{
    DeletionLog, EventPublisher, ProposalRepository, SessionValidator, VotableRepository,
};

/// Shared application state containing all dependencies.
///
/// Handlers are cheap to build and are created per request.
#[derive(Clone)]
pub struct AppState {
    pub entities: Arc<dyn VotableRepository>,
    pub proposals: Arc<dyn ProposalRepository>,
    pub deletion_log: Arc<dyn DeletionLog>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub admins: Arc<AdminRoster>,
    entity_thresholds: Arc<ThresholdEnforcer>,
    proposal_thresholds: Arc<ProposalThresholds>,
    expiry: Arc<ProposalExpiryChecker>,
}

impl AppState {
    pub fn new(
        entities: Arc<dyn VotableRepository>,
        proposals: Arc<dyn ProposalRepository>,
        deletion_log: Arc<dyn DeletionLog>,
        event_publisher: Arc<dyn EventPublisher>,
        session_validator: Arc<dyn SessionValidator>,
        admins: AdminRoster,
    ) -> Self {
        let entity_thresholds = Arc::new(ThresholdEnforcer::new(
            entities.clone(),
            deletion_log.clone(),
            event_publisher.clone(),
        ));
        let proposal_thresholds = Arc::new(ProposalThresholds::new(
            proposals.clone(),
            event_publisher.clone(),
        ));
        let expiry = Arc::new(ProposalExpiryChecker::new(
            proposals.clone(),
            event_publisher.clone(),
        ));

        Self {
            entities,
            proposals,
            deletion_log,
            event_publisher,
            session_validator,
            admins: Arc::new(admins),
            entity_thresholds,
            proposal_thresholds,
            expiry,
        }
    }

    // === Canvas ===

    pub fn create_entity_handler(&self) -> CreateEntityHandler {
        CreateEntityHandler::new(self.entities.clone(), self.event_publisher.clone())
    }

    pub fn get_entity_handler(&self) -> GetEntityHandler {
        GetEntityHandler::new(self.entities.clone())
    }

    pub fn list_entities_handler(&self) -> ListEntitiesHandler {
        ListEntitiesHandler::new(self.entities.clone())
    }

    pub fn get_entity_vote_handler(&self) -> GetEntityVoteHandler {
        GetEntityVoteHandler::new(self.entities.clone())
    }

    pub fn cast_entity_vote_handler(&self) -> CastEntityVoteHandler {
        CastEntityVoteHandler::new(
            self.entities.clone(),
            self.entity_thresholds.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn reconcile_entity_handler(&self) -> ReconcileEntityHandler {
        ReconcileEntityHandler::new(self.entities.clone(), self.entity_thresholds.clone())
    }

    pub fn list_deletions_handler(&self) -> ListDeletionsHandler {
        ListDeletionsHandler::new(self.deletion_log.clone(), self.admins.clone())
    }

    pub fn restore_deleted_block_handler(&self) -> RestoreDeletedBlockHandler {
        RestoreDeletedBlockHandler::new(
            self.entities.clone(),
            self.deletion_log.clone(),
            self.event_publisher.clone(),
            self.admins.clone(),
        )
    }

    // === Governance ===

    pub fn create_proposal_handler(&self) -> CreateProposalHandler {
        CreateProposalHandler::new(self.proposals.clone(), self.event_publisher.clone())
    }

    pub fn get_proposal_handler(&self) -> GetProposalHandler {
        GetProposalHandler::new(
            self.proposals.clone(),
            self.proposal_thresholds.clone(),
            self.expiry.clone(),
        )
    }

    pub fn list_proposals_handler(&self) -> ListProposalsHandler {
        ListProposalsHandler::new(
            self.proposals.clone(),
            self.proposal_thresholds.clone(),
            self.expiry.clone(),
        )
    }

    pub fn get_proposal_vote_handler(&self) -> GetProposalVoteHandler {
        GetProposalVoteHandler::new(self.proposals.clone())
    }

    pub fn cast_proposal_vote_handler(&self) -> CastProposalVoteHandler {
        CastProposalVoteHandler::new(
            self.proposals.clone(),
            self.expiry.clone(),
            self.proposal_thresholds.clone(),
            self.event_publisher.clone(),
        )
    }

    // === Voters ===

    pub fn remove_voter_handler(&self) -> RemoveVoterHandler {
        RemoveVoterHandler::new(
            self.entities.clone(),
            self.proposals.clone(),
            self.entity_thresholds.clone(),
            self.proposal_thresholds.clone(),
            self.expiry.clone(),
            self.admins.clone(),
        )
    }
}
