use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, NotSet, Set};
use anyhow::Result;

use super::{setup_test_db, unique_username};
use crate::visit_request::{self, VisitState};
use crate::{account, account_credentials, client_profile, gardener_profile};

async fn insert_request(db: &sea_orm::DatabaseConnection, client_id: i32, gardener_id: Option<i32>, state: VisitState) -> Result<visit_request::Model> {
    let am = visit_request::ActiveModel {
        id: NotSet,
        client_id: Set(client_id),
        gardener_id: Set(gardener_id),
        address: Set("Calle 1".into()),
        service_type: Set("poda".into()),
        availability: Set("Jueves y Viernes de 9am a 5pm".into()),
        area_m2: Set(50),
        latitude: Set(Some(-33.45)),
        longitude: Set(None),
        state: Set(state),
        created_at: Set(Utc::now().into()),
        confirmed_visit_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

#[tokio::test]
async fn test_account_and_profiles_crud() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let username = unique_username("crud_client");
    let acc = account::create(&db, &username, false).await?;
    assert_eq!(acc.username, username);
    assert!(!acc.is_staff);

    let found = account::find_by_username(&db, &username).await?;
    assert_eq!(found.map(|a| a.id), Some(acc.id));

    let profile = client_profile::create(&db, acc.id, "555-1234").await?;
    let creds = account_credentials::upsert_password(&db, acc.id, "hash-1".into(), "argon2").await?;
    let creds2 = account_credentials::upsert_password(&db, acc.id, "hash-2".into(), "argon2").await?;
    assert_eq!(creds.id, creds2.id);
    assert_eq!(creds2.password_hash, "hash-2");

    let by_account = client_profile::find_by_account(&db, acc.id).await?;
    assert_eq!(by_account.map(|p| p.id), Some(profile.id));

    // account delete cascades to profile and credentials
    acc.delete(&db).await?;
    assert!(client_profile::Entity::find_by_id(profile.id).one(&db).await?.is_none());
    assert!(account_credentials::Entity::find_by_id(creds.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_username_rejected() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let username = unique_username("dup");
    let acc = account::create(&db, &username, false).await?;
    let again = account::create(&db, &username, false).await;
    assert!(again.is_err());
    account::Entity::delete_by_id(acc.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_gardener_delete_nulls_assignment() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let client_acc = account::create(&db, &unique_username("fk_client"), false).await?;
    let client = client_profile::create(&db, client_acc.id, "").await?;
    let gardener_acc = account::create(&db, &unique_username("fk_gardener"), false).await?;
    let gardener = gardener_profile::create(&db, gardener_acc.id, "riego").await?;

    let req = insert_request(&db, client.id, Some(gardener.id), VisitState::Assigned).await?;
    assert_eq!(req.state, VisitState::Assigned);

    account::Entity::delete_by_id(gardener_acc.id).exec(&db).await?;
    let after = visit_request::Entity::find_by_id(req.id).one(&db).await?.expect("request survives");
    assert_eq!(after.gardener_id, None);
    // raw FK behaviour only; the service layer is what reverts the state
    assert_eq!(after.state, VisitState::Assigned);

    account::Entity::delete_by_id(client_acc.id).exec(&db).await?;
    assert!(visit_request::Entity::find_by_id(req.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_negative_area_rejected_by_check() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let acc = account::create(&db, &unique_username("area"), false).await?;
    let client = client_profile::create(&db, acc.id, "").await?;
    let am = visit_request::ActiveModel {
        id: NotSet,
        client_id: Set(client.id),
        gardener_id: Set(None),
        address: Set("Calle 2".into()),
        service_type: Set("poda".into()),
        availability: Set("lunes".into()),
        area_m2: Set(-1),
        latitude: Set(None),
        longitude: Set(None),
        state: Set(VisitState::Requested),
        created_at: Set(Utc::now().into()),
        confirmed_visit_at: Set(None),
    };
    assert!(am.insert(&db).await.is_err());
    account::Entity::delete_by_id(acc.id).exec(&db).await?;
    Ok(())
}

#[test]
fn username_validation() {
    assert!(account::validate_username("  ").is_err());
    assert!(account::validate_username(&"x".repeat(account::MAX_USERNAME_LEN + 1)).is_err());
    assert!(account::validate_username("ana").is_ok());
}
