use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use models::{account, client_profile, gardener_profile, visit_request};
use models::visit_request::VisitState;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::visits::access::Visibility;
use crate::visits::domain::{
    AccountSummary, ChangeOutcome, ClientSummary, GardenerSummary, StateChange, VisitRequestDraft,
    VisitRequestPatch, VisitRequestView,
};
use crate::visits::repository::VisitRequestRepository;

pub struct SeaOrmVisitRequestRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmVisitRequestRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn summary(a: Option<account::Model>) -> AccountSummary {
    match a {
        Some(a) => AccountSummary { id: a.id, username: a.username, first_name: a.first_name, last_name: a.last_name, email: a.email },
        None => AccountSummary { id: 0, username: String::new(), first_name: String::new(), last_name: String::new(), email: String::new() },
    }
}

/// Expand client and gardener profiles for a batch of rows, two queries per kind.
async fn hydrate<C: ConnectionTrait>(db: &C, rows: Vec<visit_request::Model>) -> Result<Vec<VisitRequestView>, ServiceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let client_ids: Vec<i32> = rows.iter().map(|r| r.client_id).collect();
    let gardener_ids: Vec<i32> = rows.iter().filter_map(|r| r.gardener_id).collect();

    let clients: HashMap<i32, ClientSummary> = client_profile::Entity::find()
        .filter(client_profile::Column::Id.is_in(client_ids))
        .find_also_related(account::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|(p, a)| (p.id, ClientSummary { id: p.id, user: summary(a), phone: p.phone }))
        .collect();

    let gardeners: HashMap<i32, GardenerSummary> = if gardener_ids.is_empty() {
        HashMap::new()
    } else {
        gardener_profile::Entity::find()
            .filter(gardener_profile::Column::Id.is_in(gardener_ids))
            .find_also_related(account::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|(p, a)| (p.id, GardenerSummary { id: p.id, user: summary(a), specialty: p.specialty }))
            .collect()
    };

    rows.into_iter()
        .map(|r| {
            let client = clients
                .get(&r.client_id)
                .cloned()
                .ok_or_else(|| ServiceError::Db(format!("client profile {} missing for visit request {}", r.client_id, r.id)))?;
            Ok(VisitRequestView {
                id: r.id,
                client,
                gardener: r.gardener_id.and_then(|g| gardeners.get(&g).cloned()),
                address: r.address,
                service_type: r.service_type,
                availability: r.availability,
                area_m2: r.area_m2,
                latitude: r.latitude,
                longitude: r.longitude,
                state: r.state,
                created_at: r.created_at,
                confirmed_visit_at: r.confirmed_visit_at,
            })
        })
        .collect()
}

async fn hydrate_one<C: ConnectionTrait>(db: &C, row: visit_request::Model) -> Result<VisitRequestView, ServiceError> {
    hydrate(db, vec![row]).await?.pop().ok_or_else(|| ServiceError::Db("hydration returned no row".into()))
}

#[async_trait::async_trait]
impl VisitRequestRepository for SeaOrmVisitRequestRepository {
    async fn list(&self, visibility: Visibility, page: Option<Pagination>) -> Result<Vec<VisitRequestView>, ServiceError> {
        if visibility.is_nothing() {
            return Ok(Vec::new());
        }
        let query = visit_request::Entity::find()
            .filter(visibility.condition())
            .order_by_desc(visit_request::Column::CreatedAt)
            .order_by_desc(visit_request::Column::Id);
        let rows = match page {
            Some(p) => {
                let (idx, per) = p.normalize();
                query.paginate(&self.db, per).fetch_page(idx).await?
            }
            None => query.all(&self.db).await?,
        };
        hydrate(&self.db, rows).await
    }

    async fn find(&self, id: i32, visibility: Visibility) -> Result<Option<VisitRequestView>, ServiceError> {
        if visibility.is_nothing() {
            return Ok(None);
        }
        let row = visit_request::Entity::find_by_id(id)
            .filter(visibility.condition())
            .one(&self.db)
            .await?;
        match row {
            Some(row) => Ok(Some(hydrate_one(&self.db, row).await?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, client_id: i32, draft: VisitRequestDraft) -> Result<VisitRequestView, ServiceError> {
        let am = visit_request::ActiveModel {
            id: NotSet,
            client_id: Set(client_id),
            gardener_id: Set(None),
            address: Set(draft.address),
            service_type: Set(draft.service_type),
            availability: Set(draft.availability),
            area_m2: Set(draft.area_m2),
            latitude: Set(draft.latitude),
            longitude: Set(draft.longitude),
            state: Set(VisitState::Requested),
            created_at: Set(Utc::now().into()),
            confirmed_visit_at: Set(None),
        };
        let row = am.insert(&self.db).await?;
        hydrate_one(&self.db, row).await
    }

    async fn update_details(&self, id: i32, patch: VisitRequestPatch) -> Result<Option<VisitRequestView>, ServiceError> {
        let Some(row) = visit_request::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(hydrate_one(&self.db, row).await?));
        }
        let mut am: visit_request::ActiveModel = row.into();
        if let Some(v) = patch.address { am.address = Set(v); }
        if let Some(v) = patch.service_type { am.service_type = Set(v); }
        if let Some(v) = patch.availability { am.availability = Set(v); }
        if let Some(v) = patch.area_m2 { am.area_m2 = Set(v); }
        if let Some(v) = patch.latitude { am.latitude = Set(v); }
        if let Some(v) = patch.longitude { am.longitude = Set(v); }
        let updated = am.update(&self.db).await?;
        Ok(Some(hydrate_one(&self.db, updated).await?))
    }

    async fn apply(&self, change: StateChange) -> Result<ChangeOutcome, ServiceError> {
        let txn = self.db.begin().await?;
        if let Some(gid) = change.gardener {
            // shared lock on the gardener row until commit
            let gardener = gardener_profile::Entity::find_by_id(gid).lock_shared().one(&txn).await?;
            if gardener.is_none() {
                return Ok(ChangeOutcome::UnknownGardener);
            }
        }
        let mut update = visit_request::Entity::update_many()
            .col_expr(visit_request::Column::State, Expr::value(change.next.as_str()))
            .filter(visit_request::Column::Id.eq(change.id));
        if let Some(gid) = change.gardener {
            update = update.col_expr(visit_request::Column::GardenerId, Expr::value(gid));
        }
        if let Some(expected) = change.expected {
            update = update.filter(visit_request::Column::State.eq(expected.as_str()));
        }
        if let Some(owner) = change.owner {
            update = update.filter(visit_request::Column::ClientId.eq(owner));
        }
        let res = update.exec(&txn).await?;
        txn.commit().await?;
        Ok(if res.rows_affected == 1 { ChangeOutcome::Applied } else { ChangeOutcome::StateMismatch })
    }

    async fn gardener_exists(&self, gardener_id: i32) -> Result<bool, ServiceError> {
        Ok(gardener_profile::Entity::find_by_id(gardener_id).one(&self.db).await?.is_some())
    }
}
