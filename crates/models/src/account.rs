use sea_orm::{entity::prelude::*, ConnectionTrait, NotSet, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const MAX_USERNAME_LEN: usize = 150;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), errors::ModelError> {
    if username.trim().is_empty() {
        return Err(errors::ModelError::Validation("username required".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(errors::ModelError::Validation(format!("username longer than {MAX_USERNAME_LEN} characters")));
    }
    Ok(())
}

/// Insert a bare account row; names and email start empty.
pub async fn create<C: ConnectionTrait>(db: &C, username: &str, is_staff: bool) -> Result<Model, errors::ModelError> {
    validate_username(username)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        username: Set(username.to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        email: Set(String::new()),
        is_staff: Set(is_staff),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find().filter(Column::Username.eq(username)).one(db).await?)
}
