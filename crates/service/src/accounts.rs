use std::sync::Arc;

use tracing::{info, instrument};

use crate::actor::Actor;
use crate::auth::domain::AccountRemoval;
use crate::auth::repository::AccountRepository;
use crate::errors::ServiceError;

/// Staff-only account administration.
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self { Self { repo } }

    /// Delete an account and everything hanging off it. Work held by a
    /// removed gardener returns to the open pool in the same unit of work.
    #[instrument(skip(self), fields(rol = actor.role_name()))]
    pub async fn remove(&self, actor: &Actor, account_id: i32) -> Result<AccountRemoval, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::forbidden("remove accounts"));
        }
        let removal = self
            .repo
            .delete_account(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("account"))?;
        info!(account_id, reverted_requests = removal.reverted_requests, "account_removed");
        Ok(removal)
    }
}
