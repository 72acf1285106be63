use async_trait::async_trait;

use super::domain::{AccountRecord, AccountRemoval, Credentials, Identity, NewAccount};
use super::errors::AuthError;

/// Repository abstraction for account-related persistence.
///
/// Implemented over SeaORM in [`crate::auth::repo::seaorm`] and in memory in
/// [`crate::memory`].
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_account_by_username(&self, username: &str) -> Result<Option<AccountRecord>, AuthError>;

    /// Account, profile and credentials are written together or not at all.
    async fn create_account(&self, new: NewAccount) -> Result<Identity, AuthError>;

    async fn get_credentials(&self, account_id: i32) -> Result<Option<Credentials>, AuthError>;
    async fn load_identity(&self, account_id: i32) -> Result<Option<Identity>, AuthError>;

    /// Delete an account. Visit requests held by its gardener profile in
    /// ASIGNADA or CONFIRMADA go back to SOLICITADA in the same unit of work.
    /// `None` when the account does not exist.
    async fn delete_account(&self, account_id: i32) -> Result<Option<AccountRemoval>, AuthError>;
}
