use std::sync::Arc;

use serde_json::json;

use crate::accounts::AccountService;
use crate::actor::Actor;
use crate::auth::domain::{NewAccount, ProfileSpec};
use crate::auth::repo::seaorm::SeaOrmAccountRepository;
use crate::auth::repository::AccountRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::test_support::{get_db, unique_username};
use crate::visits::domain::VisitState;
use crate::visits::repo::seaorm::SeaOrmVisitRequestRepository;
use crate::visits::VisitService;

struct Db {
    accounts_repo: Arc<SeaOrmAccountRepository>,
    visits: Arc<VisitService>,
    accounts: AccountService,
}

impl Db {
    async fn open() -> anyhow::Result<Option<Self>> {
        let Some(db) = get_db().await? else { return Ok(None) };
        let accounts_repo = Arc::new(SeaOrmAccountRepository::new(db.clone()));
        let visits = Arc::new(VisitService::new(Arc::new(SeaOrmVisitRequestRepository::new(db))));
        let accounts = AccountService::new(accounts_repo.clone());
        Ok(Some(Self { accounts_repo, visits, accounts }))
    }

    async fn actor(&self, prefix: &str, is_staff: bool, profile: ProfileSpec) -> anyhow::Result<Actor> {
        let identity = self
            .accounts_repo
            .create_account(NewAccount {
                username: unique_username(prefix),
                is_staff,
                profile,
                password_hash: "$argon2id$placeholder".into(),
                password_algorithm: "argon2".into(),
            })
            .await?;
        Ok(Actor::resolve(&identity))
    }

    async fn client(&self) -> anyhow::Result<Actor> {
        self.actor("client", false, ProfileSpec::Client { phone: "555-0101".into() }).await
    }

    async fn gardener(&self) -> anyhow::Result<Actor> {
        self.actor("gardener", false, ProfileSpec::Gardener { specialty: "poda".into() }).await
    }
}

fn body() -> serde_json::Value {
    json!({"direccion": "Calle 1", "tipo_servicio": "poda", "disponibilidad_horaria": "Lunes", "metros_cuadrados": 50})
}

#[tokio::test]
async fn lifecycle_against_postgres() -> anyhow::Result<()> {
    let Some(db) = Db::open().await? else { return Ok(()) };
    let client = db.client().await?;
    let gardener = db.gardener().await?;
    let rival = db.gardener().await?;

    let created = db.visits.create(&client, &body()).await?;
    assert_eq!(created.state, VisitState::Requested);
    assert_eq!(created.client.phone, "555-0101");

    let accepted = db.visits.accept(&gardener, created.id).await?;
    assert_eq!(accepted.state, VisitState::Assigned);
    assert_eq!(accepted.gardener.as_ref().map(|g| g.specialty.as_str()), Some("poda"));
    assert!(matches!(db.visits.accept(&rival, created.id).await, Err(ServiceError::NotFound(_))));

    db.visits.confirm(&client, created.id).await?;
    assert_eq!(db.visits.get(&client, created.id).await?.state, VisitState::Confirmed);
    Ok(())
}

#[tokio::test]
async fn gardener_filter_in_sql() -> anyhow::Result<()> {
    let Some(db) = Db::open().await? else { return Ok(()) };
    let client = db.client().await?;
    let mine = db.gardener().await?;
    let other = db.gardener().await?;
    let open = db.visits.create(&client, &body()).await?.id;
    let taken = db.visits.create(&client, &body()).await?.id;
    db.visits.accept(&other, taken).await?;

    let seen: Vec<i32> = db.visits.list(&mine, None).await?.into_iter().map(|v| v.id).collect();
    assert!(seen.contains(&open));
    assert!(!seen.contains(&taken));

    let own: Vec<i32> = db.visits.list(&client, Some(Pagination { page: 1, per_page: 10 })).await?.into_iter().map(|v| v.id).collect();
    assert_eq!(own, vec![taken, open]);
    Ok(())
}

#[tokio::test]
async fn admin_assign_locks_and_validates() -> anyhow::Result<()> {
    let Some(db) = Db::open().await? else { return Ok(()) };
    let admin = db.actor("admin", true, ProfileSpec::None).await?;
    let client = db.client().await?;
    let gardener = db.gardener().await?;
    let Actor::Gardener { gardener_id, .. } = gardener else { anyhow::bail!("expected gardener") };
    let id = db.visits.create(&client, &body()).await?.id;

    assert!(matches!(
        db.visits.assign_by_admin(&admin, id, &json!({"jardinero_id": i32::MAX})).await,
        Err(ServiceError::InvalidFields(_))
    ));
    db.visits.assign_by_admin(&admin, id, &json!({"jardinero_id": gardener_id})).await?;
    let v = db.visits.get(&admin, id).await?;
    assert_eq!(v.state, VisitState::Assigned);
    assert_eq!(v.gardener_id(), Some(gardener_id));
    Ok(())
}

#[tokio::test]
async fn removal_reverts_in_one_transaction() -> anyhow::Result<()> {
    let Some(db) = Db::open().await? else { return Ok(()) };
    let admin = db.actor("admin", true, ProfileSpec::None).await?;
    let client = db.client().await?;
    let leaving = db.gardener().await?;
    let other = db.gardener().await?;
    let id = db.visits.create(&client, &body()).await?.id;
    db.visits.accept(&leaving, id).await?;
    db.visits.confirm(&client, id).await?;

    let removal = db.accounts.remove(&admin, leaving.account_id()).await?;
    assert_eq!(removal.reverted_requests, 1);
    let v = db.visits.get(&other, id).await?;
    assert_eq!(v.state, VisitState::Requested);
    assert!(v.gardener.is_none());
    assert!(db.accounts_repo.load_identity(leaving.account_id()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_conflict() -> anyhow::Result<()> {
    let Some(db) = Db::open().await? else { return Ok(()) };
    let name = unique_username("dup");
    let new = || NewAccount {
        username: name.clone(),
        is_staff: false,
        profile: ProfileSpec::None,
        password_hash: "$argon2id$placeholder".into(),
        password_algorithm: "argon2".into(),
    };
    db.accounts_repo.create_account(new()).await?;
    assert!(matches!(db.accounts_repo.create_account(new()).await, Err(crate::auth::errors::AuthError::Conflict)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn removal_racing_accepts_leaves_no_orphaned_assignment() -> anyhow::Result<()> {
    let Some(db) = Db::open().await? else { return Ok(()) };
    let admin = db.actor("admin", true, ProfileSpec::None).await?;
    let client = db.client().await?;

    for _ in 0..10 {
        let gardener = db.gardener().await?;
        let mut ids = Vec::new();
        for _ in 0..20 {
            ids.push(db.visits.create(&client, &body()).await?.id);
        }
        let visits = db.visits.clone();
        let claimed = ids.clone();
        let accepting = tokio::spawn(async move {
            for id in claimed {
                let _ = visits.accept(&gardener, id).await;
            }
        });
        tokio::task::yield_now().await;
        db.accounts.remove(&admin, gardener.account_id()).await?;
        accepting.await?;

        for id in ids {
            let v = db.visits.get(&admin, id).await?;
            if v.state == VisitState::Assigned {
                assert!(v.gardener.is_some(), "request {id} assigned without a gardener");
            }
            assert_eq!(v.gardener.is_none(), v.state == VisitState::Requested);
        }
    }
    Ok(())
}
