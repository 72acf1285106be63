use async_trait::async_trait;

use super::access::Visibility;
use super::domain::{ChangeOutcome, StateChange, VisitRequestDraft, VisitRequestPatch, VisitRequestView};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Storage seam for visit requests. Reads are always scoped by a
/// [`Visibility`]; writes trust the caller to have checked it.
#[async_trait]
pub trait VisitRequestRepository: Send + Sync {
    /// Newest first, ties broken by descending id.
    async fn list(&self, visibility: Visibility, page: Option<Pagination>) -> Result<Vec<VisitRequestView>, ServiceError>;

    async fn find(&self, id: i32, visibility: Visibility) -> Result<Option<VisitRequestView>, ServiceError>;

    /// New request in SOLICITADA for the given client profile.
    async fn insert(&self, client_id: i32, draft: VisitRequestDraft) -> Result<VisitRequestView, ServiceError>;

    /// Writable fields only. `None` when the row is gone.
    async fn update_details(&self, id: i32, patch: VisitRequestPatch) -> Result<Option<VisitRequestView>, ServiceError>;

    /// Atomic conditional state write.
    async fn apply(&self, change: StateChange) -> Result<ChangeOutcome, ServiceError>;

    async fn gardener_exists(&self, gardener_id: i32) -> Result<bool, ServiceError>;
}
