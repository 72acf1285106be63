use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, TransactionTrait};

use models::visit_request::VisitState;
use models::{account, account_credentials, client_profile, gardener_profile, visit_request};

use crate::auth::domain::{AccountRecord, AccountRemoval, Credentials, Identity, NewAccount, ProfileSpec};
use crate::auth::errors::AuthError;
use crate::auth::repository::AccountRepository;

pub struct SeaOrmAccountRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn repo_err(e: impl ToString) -> AuthError { AuthError::Repository(e.to_string()) }

fn to_record(a: account::Model) -> AccountRecord {
    AccountRecord {
        id: a.id,
        username: a.username,
        first_name: a.first_name,
        last_name: a.last_name,
        email: a.email,
        is_staff: a.is_staff,
    }
}

fn map_model_err(e: models::errors::ModelError) -> AuthError {
    match e {
        models::errors::ModelError::Validation(msg) => AuthError::Validation(msg),
        models::errors::ModelError::Db(msg) if msg.contains("duplicate key") => AuthError::Conflict,
        models::errors::ModelError::Db(msg) => AuthError::Repository(msg),
    }
}

#[async_trait::async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn find_account_by_username(&self, username: &str) -> Result<Option<AccountRecord>, AuthError> {
        let res = account::find_by_username(&self.db, username).await.map_err(map_model_err)?;
        Ok(res.map(to_record))
    }

    async fn create_account(&self, new: NewAccount) -> Result<Identity, AuthError> {
        let txn = self.db.begin().await.map_err(repo_err)?;
        let created = account::create(&txn, &new.username, new.is_staff).await.map_err(map_model_err)?;
        account_credentials::upsert_password(&txn, created.id, new.password_hash, &new.password_algorithm)
            .await
            .map_err(map_model_err)?;
        let (client_id, gardener_id) = match &new.profile {
            ProfileSpec::Client { phone } => {
                let p = client_profile::create(&txn, created.id, phone).await.map_err(map_model_err)?;
                (Some(p.id), None)
            }
            ProfileSpec::Gardener { specialty } => {
                let p = gardener_profile::create(&txn, created.id, specialty).await.map_err(map_model_err)?;
                (None, Some(p.id))
            }
            ProfileSpec::None => (None, None),
        };
        txn.commit().await.map_err(repo_err)?;
        Ok(Identity { account: to_record(created), client_id, gardener_id })
    }

    async fn get_credentials(&self, account_id: i32) -> Result<Option<Credentials>, AuthError> {
        let res = account_credentials::Entity::find()
            .filter(account_credentials::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(res.map(|c| Credentials { account_id: c.account_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn load_identity(&self, account_id: i32) -> Result<Option<Identity>, AuthError> {
        let Some(acc) = account::Entity::find_by_id(account_id).one(&self.db).await.map_err(repo_err)? else {
            return Ok(None);
        };
        let client_id = client_profile::find_by_account(&self.db, acc.id).await.map_err(map_model_err)?.map(|p| p.id);
        let gardener_id = gardener_profile::find_by_account(&self.db, acc.id).await.map_err(map_model_err)?.map(|p| p.id);
        Ok(Some(Identity { account: to_record(acc), client_id, gardener_id }))
    }

    async fn delete_account(&self, account_id: i32) -> Result<Option<AccountRemoval>, AuthError> {
        let txn = self.db.begin().await.map_err(repo_err)?;
        if account::Entity::find_by_id(account_id).one(&txn).await.map_err(repo_err)?.is_none() {
            return Ok(None);
        }
        let mut reverted_requests = 0;
        // blocks concurrent assignments to this gardener until the delete commits
        let gardener = gardener_profile::Entity::find()
            .filter(gardener_profile::Column::AccountId.eq(account_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(repo_err)?;
        if let Some(gardener) = gardener {
            let res = visit_request::Entity::update_many()
                .col_expr(visit_request::Column::State, Expr::value(VisitState::Requested.as_str()))
                .col_expr(visit_request::Column::GardenerId, Expr::value(Option::<i32>::None))
                .filter(visit_request::Column::GardenerId.eq(gardener.id))
                .filter(visit_request::Column::State.is_in([VisitState::Assigned.as_str(), VisitState::Confirmed.as_str()]))
                .exec(&txn)
                .await
                .map_err(repo_err)?;
            reverted_requests = res.rows_affected;
        }
        account::Entity::delete_by_id(account_id).exec(&txn).await.map_err(repo_err)?;
        txn.commit().await.map_err(repo_err)?;
        Ok(Some(AccountRemoval { account_id, reverted_requests }))
    }
}
