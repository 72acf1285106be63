use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::access::Visibility;
use super::domain::{
    ActionStatus, ChangeOutcome, StateChange, VisitRequestPatch, VisitRequestView, VisitState,
    ADMIN_ASSIGNED_STATUS, CONFIRMED_STATUS,
};
use super::input::{self, GARDENER_ID};
use super::repository::VisitRequestRepository;
use crate::actor::Actor;
use crate::errors::{FieldErrors, ServiceError};
use crate::pagination::Pagination;

pub const NOT_AVAILABLE: &str = "This request is no longer available.";
pub const CANNOT_CONFIRM: &str = "The request cannot be confirmed in its current state.";
pub const UNKNOWN_GARDENER: &str = "No gardener exists with the given id.";

/// Visit request CRUD and lifecycle transitions.
///
/// Every action checks, in order: the actor's role, visibility of the
/// target, the request body, the state precondition.
pub struct VisitService {
    repo: Arc<dyn VisitRequestRepository>,
}

impl VisitService {
    pub fn new(repo: Arc<dyn VisitRequestRepository>) -> Self { Self { repo } }

    #[instrument(skip(self), fields(rol = actor.role_name()))]
    pub async fn list(&self, actor: &Actor, page: Option<Pagination>) -> Result<Vec<VisitRequestView>, ServiceError> {
        self.repo.list(Visibility::for_actor(actor), page).await
    }

    /// Records outside the actor's view are reported as not found.
    #[instrument(skip(self), fields(rol = actor.role_name()))]
    pub async fn get(&self, actor: &Actor, id: i32) -> Result<VisitRequestView, ServiceError> {
        self.visible(actor, id).await
    }

    async fn visible(&self, actor: &Actor, id: i32) -> Result<VisitRequestView, ServiceError> {
        self.repo
            .find(id, Visibility::for_actor(actor))
            .await?
            .ok_or_else(|| ServiceError::not_found("visit request"))
    }

    /// Open a new request owned by the calling client.
    #[instrument(skip(self, body), fields(rol = actor.role_name()))]
    pub async fn create(&self, actor: &Actor, body: &Value) -> Result<VisitRequestView, ServiceError> {
        let Actor::Client { client_id, .. } = *actor else {
            return Err(ServiceError::forbidden("create visit requests"));
        };
        let draft = input::parse_draft(body)?;
        let view = self.repo.insert(client_id, draft).await?;
        info!(visit_request_id = view.id, client_id, "visit_request_created");
        Ok(view)
    }

    /// Full (`partial == false`) or partial update of the writable fields.
    /// Owning client or admin only.
    #[instrument(skip(self, body), fields(rol = actor.role_name()))]
    pub async fn update(&self, actor: &Actor, id: i32, body: &Value, partial: bool) -> Result<VisitRequestView, ServiceError> {
        if !matches!(actor, Actor::Client { .. } | Actor::Admin { .. }) {
            return Err(ServiceError::forbidden("modify visit requests"));
        }
        self.visible(actor, id).await?;
        let patch = if partial {
            input::parse_patch(body)?
        } else {
            VisitRequestPatch::from(input::parse_draft(body)?)
        };
        let view = self.repo
            .update_details(id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("visit request"))?;
        debug!(visit_request_id = id, partial, "visit_request_updated");
        Ok(view)
    }

    /// A gardener claims an open request.
    #[instrument(skip(self), fields(rol = actor.role_name()))]
    pub async fn accept(&self, actor: &Actor, id: i32) -> Result<VisitRequestView, ServiceError> {
        let Actor::Gardener { gardener_id, .. } = *actor else {
            return Err(ServiceError::forbidden("accept visit requests"));
        };
        let current = self.visible(actor, id).await?;
        if current.state != VisitState::Requested {
            return Err(ServiceError::InvalidState(NOT_AVAILABLE.into()));
        }
        let change = StateChange {
            id,
            expected: Some(VisitState::Requested),
            owner: None,
            next: VisitState::Assigned,
            gardener: Some(gardener_id),
        };
        match self.repo.apply(change).await? {
            ChangeOutcome::Applied => {}
            ChangeOutcome::StateMismatch => {
                warn!(visit_request_id = id, gardener_id, "visit_request_accept_lost_race");
                return Err(ServiceError::InvalidState(NOT_AVAILABLE.into()));
            }
            ChangeOutcome::UnknownGardener => return Err(ServiceError::not_found("gardener profile")),
        }
        info!(visit_request_id = id, gardener_id, "visit_request_assigned");
        self.visible(actor, id).await
    }

    /// The owning client confirms an assigned visit.
    #[instrument(skip(self), fields(rol = actor.role_name()))]
    pub async fn confirm(&self, actor: &Actor, id: i32) -> Result<ActionStatus, ServiceError> {
        let Actor::Client { client_id, .. } = *actor else {
            return Err(ServiceError::forbidden("confirm visit requests"));
        };
        let current = self.visible(actor, id).await?;
        if current.state != VisitState::Assigned {
            return Err(ServiceError::InvalidState(CANNOT_CONFIRM.into()));
        }
        let change = StateChange {
            id,
            expected: Some(VisitState::Assigned),
            owner: Some(client_id),
            next: VisitState::Confirmed,
            gardener: None,
        };
        if self.repo.apply(change).await? != ChangeOutcome::Applied {
            return Err(ServiceError::InvalidState(CANNOT_CONFIRM.into()));
        }
        info!(visit_request_id = id, client_id, "visit_request_confirmed");
        Ok(ActionStatus { status: CONFIRMED_STATUS })
    }

    /// Staff sets the gardener, overwriting any prior assignment and state.
    #[instrument(skip(self, body), fields(rol = actor.role_name()))]
    pub async fn assign_by_admin(&self, actor: &Actor, id: i32, body: &Value) -> Result<ActionStatus, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::forbidden("assign gardeners"));
        }
        let current = self.visible(actor, id).await?;
        let gardener_id = input::parse_assignment(body)?;
        if !self.repo.gardener_exists(gardener_id).await? {
            return Err(ServiceError::InvalidFields(FieldErrors::single(GARDENER_ID, UNKNOWN_GARDENER)));
        }
        let change = StateChange { id, expected: None, owner: None, next: VisitState::Assigned, gardener: Some(gardener_id) };
        match self.repo.apply(change).await? {
            ChangeOutcome::Applied => {}
            ChangeOutcome::UnknownGardener => {
                return Err(ServiceError::InvalidFields(FieldErrors::single(GARDENER_ID, UNKNOWN_GARDENER)));
            }
            ChangeOutcome::StateMismatch => return Err(ServiceError::not_found("visit request")),
        }
        info!(
            visit_request_id = id,
            gardener_id,
            previous_gardener = ?current.gardener_id(),
            previous_state = current.state.as_str(),
            "visit_request_assigned_by_admin"
        );
        Ok(ActionStatus { status: ADMIN_ASSIGNED_STATUS })
    }
}
