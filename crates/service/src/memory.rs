//! In-memory implementation of both repositories, used by tests and demos.
//!
//! All access goes through one `tokio::sync::Mutex`, so each conditional
//! write is atomic with respect to every other operation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::Mutex;

use models::visit_request::VisitState;

use crate::auth::domain::{AccountRecord, AccountRemoval, Credentials, Identity, NewAccount, ProfileSpec};
use crate::auth::errors::AuthError;
use crate::auth::repository::AccountRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::visits::access::Visibility;
use crate::visits::domain::{
    AccountSummary, ChangeOutcome, ClientSummary, GardenerSummary, StateChange, VisitRequestDraft,
    VisitRequestPatch, VisitRequestView,
};
use crate::visits::repository::VisitRequestRepository;

#[derive(Debug, Clone)]
struct VisitRow {
    id: i32,
    client_id: i32,
    gardener_id: Option<i32>,
    address: String,
    service_type: String,
    availability: String,
    area_m2: i32,
    latitude: Option<f64>,
    longitude: Option<f64>,
    state: VisitState,
    created_at: DateTime<FixedOffset>,
    confirmed_visit_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone)]
struct Profile {
    account_id: i32,
    detail: String,
}

#[derive(Default)]
struct Tables {
    last_id: i32,
    accounts: BTreeMap<i32, AccountRecord>,
    credentials: BTreeMap<i32, Credentials>,
    clients: BTreeMap<i32, Profile>,
    gardeners: BTreeMap<i32, Profile>,
    visits: BTreeMap<i32, VisitRow>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn summary(&self, account_id: i32) -> AccountSummary {
        match self.accounts.get(&account_id) {
            Some(a) => AccountSummary {
                id: a.id,
                username: a.username.clone(),
                first_name: a.first_name.clone(),
                last_name: a.last_name.clone(),
                email: a.email.clone(),
            },
            None => AccountSummary {
                id: account_id,
                username: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
            },
        }
    }

    fn identity(&self, account_id: i32) -> Option<Identity> {
        let account = self.accounts.get(&account_id)?.clone();
        let find = |profiles: &BTreeMap<i32, Profile>| {
            profiles.iter().find(|(_, p)| p.account_id == account_id).map(|(id, _)| *id)
        };
        Some(Identity { account, client_id: find(&self.clients), gardener_id: find(&self.gardeners) })
    }

    fn view(&self, row: &VisitRow) -> Result<VisitRequestView, ServiceError> {
        let client = self
            .clients
            .get(&row.client_id)
            .ok_or_else(|| ServiceError::Db(format!("client profile {} missing", row.client_id)))?;
        let gardener = row.gardener_id.and_then(|gid| {
            self.gardeners.get(&gid).map(|g| GardenerSummary {
                id: gid,
                user: self.summary(g.account_id),
                specialty: g.detail.clone(),
            })
        });
        Ok(VisitRequestView {
            id: row.id,
            client: ClientSummary { id: row.client_id, user: self.summary(client.account_id), phone: client.detail.clone() },
            gardener,
            address: row.address.clone(),
            service_type: row.service_type.clone(),
            availability: row.availability.clone(),
            area_m2: row.area_m2,
            latitude: row.latitude,
            longitude: row.longitude,
            state: row.state,
            created_at: row.created_at,
            confirmed_visit_at: row.confirmed_visit_at,
        })
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Unscoped read of a single request.
    pub async fn snapshot(&self, id: i32) -> Option<VisitRequestView> {
        let t = self.tables.lock().await;
        t.visits.get(&id).and_then(|row| t.view(row).ok())
    }

    /// Force a state no exposed operation reaches.
    pub async fn force_state(&self, id: i32, state: VisitState) -> bool {
        let mut t = self.tables.lock().await;
        match t.visits.get_mut(&id) {
            Some(row) => {
                row.state = state;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_account_by_username(&self, username: &str) -> Result<Option<AccountRecord>, AuthError> {
        let t = self.tables.lock().await;
        Ok(t.accounts.values().find(|a| a.username == username).cloned())
    }

    async fn create_account(&self, new: NewAccount) -> Result<Identity, AuthError> {
        let mut t = self.tables.lock().await;
        if t.accounts.values().any(|a| a.username == new.username) {
            return Err(AuthError::Conflict);
        }
        models::account::validate_username(&new.username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let id = t.next_id();
        t.accounts.insert(
            id,
            AccountRecord {
                id,
                username: new.username,
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                is_staff: new.is_staff,
            },
        );
        t.credentials.insert(
            id,
            Credentials { account_id: id, password_hash: new.password_hash, password_algorithm: new.password_algorithm },
        );
        match new.profile {
            ProfileSpec::Client { phone } => {
                let pid = t.next_id();
                t.clients.insert(pid, Profile { account_id: id, detail: phone });
            }
            ProfileSpec::Gardener { specialty } => {
                let pid = t.next_id();
                t.gardeners.insert(pid, Profile { account_id: id, detail: specialty });
            }
            ProfileSpec::None => {}
        }
        t.identity(id).ok_or_else(|| AuthError::Repository("account vanished".into()))
    }

    async fn get_credentials(&self, account_id: i32) -> Result<Option<Credentials>, AuthError> {
        Ok(self.tables.lock().await.credentials.get(&account_id).cloned())
    }

    async fn load_identity(&self, account_id: i32) -> Result<Option<Identity>, AuthError> {
        Ok(self.tables.lock().await.identity(account_id))
    }

    async fn delete_account(&self, account_id: i32) -> Result<Option<AccountRemoval>, AuthError> {
        let mut t = self.tables.lock().await;
        if t.accounts.remove(&account_id).is_none() {
            return Ok(None);
        }
        t.credentials.remove(&account_id);

        let gardener_ids: Vec<i32> =
            t.gardeners.iter().filter(|(_, p)| p.account_id == account_id).map(|(id, _)| *id).collect();
        let mut reverted_requests = 0;
        for row in t.visits.values_mut() {
            if let Some(gid) = row.gardener_id {
                if gardener_ids.contains(&gid) {
                    if row.state.holds_assignment() {
                        row.state = VisitState::Requested;
                        reverted_requests += 1;
                    }
                    row.gardener_id = None;
                }
            }
        }
        t.gardeners.retain(|_, p| p.account_id != account_id);

        let client_ids: Vec<i32> =
            t.clients.iter().filter(|(_, p)| p.account_id == account_id).map(|(id, _)| *id).collect();
        t.visits.retain(|_, row| !client_ids.contains(&row.client_id));
        t.clients.retain(|_, p| p.account_id != account_id);

        Ok(Some(AccountRemoval { account_id, reverted_requests }))
    }
}

#[async_trait]
impl VisitRequestRepository for InMemoryStore {
    async fn list(&self, visibility: Visibility, page: Option<Pagination>) -> Result<Vec<VisitRequestView>, ServiceError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<&VisitRow> = t
            .visits
            .values()
            .filter(|r| visibility.admits(r.client_id, r.gardener_id, r.state))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let rows: Vec<&VisitRow> = match page {
            Some(p) => {
                let (_, per) = p.normalize();
                rows.into_iter().skip(p.offset()).take(per as usize).collect()
            }
            None => rows,
        };
        rows.into_iter().map(|r| t.view(r)).collect()
    }

    async fn find(&self, id: i32, visibility: Visibility) -> Result<Option<VisitRequestView>, ServiceError> {
        let t = self.tables.lock().await;
        match t.visits.get(&id) {
            Some(r) if visibility.admits(r.client_id, r.gardener_id, r.state) => Ok(Some(t.view(r)?)),
            _ => Ok(None),
        }
    }

    async fn insert(&self, client_id: i32, draft: VisitRequestDraft) -> Result<VisitRequestView, ServiceError> {
        let mut t = self.tables.lock().await;
        if !t.clients.contains_key(&client_id) {
            return Err(ServiceError::Db(format!("client profile {client_id} does not exist")));
        }
        let id = t.next_id();
        let row = VisitRow {
            id,
            client_id,
            gardener_id: None,
            address: draft.address,
            service_type: draft.service_type,
            availability: draft.availability,
            area_m2: draft.area_m2,
            latitude: draft.latitude,
            longitude: draft.longitude,
            state: VisitState::Requested,
            created_at: Utc::now().into(),
            confirmed_visit_at: None,
        };
        let view = t.view(&row)?;
        t.visits.insert(id, row);
        Ok(view)
    }

    async fn update_details(&self, id: i32, patch: VisitRequestPatch) -> Result<Option<VisitRequestView>, ServiceError> {
        let mut t = self.tables.lock().await;
        let Some(row) = t.visits.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = patch.address { row.address = v; }
        if let Some(v) = patch.service_type { row.service_type = v; }
        if let Some(v) = patch.availability { row.availability = v; }
        if let Some(v) = patch.area_m2 { row.area_m2 = v; }
        if let Some(v) = patch.latitude { row.latitude = v; }
        if let Some(v) = patch.longitude { row.longitude = v; }
        let row = row.clone();
        Ok(Some(t.view(&row)?))
    }

    async fn apply(&self, change: StateChange) -> Result<ChangeOutcome, ServiceError> {
        let mut t = self.tables.lock().await;
        if let Some(gid) = change.gardener {
            if !t.gardeners.contains_key(&gid) {
                return Ok(ChangeOutcome::UnknownGardener);
            }
        }
        let Some(row) = t.visits.get_mut(&change.id) else {
            return Ok(ChangeOutcome::StateMismatch);
        };
        if change.expected.is_some_and(|s| s != row.state) || change.owner.is_some_and(|o| o != row.client_id) {
            return Ok(ChangeOutcome::StateMismatch);
        }
        row.state = change.next;
        if let Some(gid) = change.gardener {
            row.gardener_id = Some(gid);
        }
        Ok(ChangeOutcome::Applied)
    }

    async fn gardener_exists(&self, gardener_id: i32) -> Result<bool, ServiceError> {
        Ok(self.tables.lock().await.gardeners.contains_key(&gardener_id))
    }
}
