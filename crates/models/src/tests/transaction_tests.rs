use sea_orm::{EntityTrait, TransactionTrait};
use anyhow::Result;

use super::{setup_test_db, unique_username};
use crate::{account, gardener_profile};

#[tokio::test]
async fn test_transaction_rollback_discards_account_and_profile() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let username = unique_username("tx_rollback");
    let txn = db.begin().await?;
    let acc = account::create(&txn, &username, false).await?;
    let profile = gardener_profile::create(&txn, acc.id, "poda").await?;
    txn.rollback().await?;

    assert!(account::find_by_username(&db, &username).await?.is_none());
    assert!(gardener_profile::Entity::find_by_id(profile.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_transaction_commit_keeps_rows() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let username = unique_username("tx_commit");
    let txn = db.begin().await?;
    let acc = account::create(&txn, &username, false).await?;
    gardener_profile::create(&txn, acc.id, "diseño").await?;
    txn.commit().await?;

    let found = gardener_profile::find_by_account(&db, acc.id).await?;
    assert_eq!(found.map(|g| g.specialty), Some("diseño".to_string()));
    account::Entity::delete_by_id(acc.id).exec(&db).await?;
    Ok(())
}
