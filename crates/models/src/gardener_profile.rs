use sea_orm::{entity::prelude::*, ConnectionTrait, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::{account, errors};

pub const MAX_SPECIALTY_LEN: usize = 100;

/// Gardener extension of an account (one-to-one, removed with the account).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gardener_profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub account_id: i32,
    /// Free text, e.g. pruning, irrigation, garden design.
    pub specialty: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Account }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Account => Entity::belongs_to(account::Entity)
                .from(Column::AccountId)
                .to(account::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<account::Entity> for Entity {
    fn to() -> RelationDef { Relation::Account.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(db: &C, account_id: i32, specialty: &str) -> Result<Model, errors::ModelError> {
    if specialty.chars().count() > MAX_SPECIALTY_LEN {
        return Err(errors::ModelError::Validation(format!("specialty longer than {MAX_SPECIALTY_LEN} characters")));
    }
    let am = ActiveModel { id: NotSet, account_id: Set(account_id), specialty: Set(specialty.to_string()) };
    Ok(am.insert(db).await?)
}

pub async fn find_by_account<C: ConnectionTrait>(db: &C, account_id: i32) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find().filter(Column::AccountId.eq(account_id)).one(db).await?)
}
