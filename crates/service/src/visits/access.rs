use sea_orm::{ColumnTrait, Condition};

use models::visit_request::{self, VisitState};

use crate::actor::Actor;

/// Which visit requests an actor may see or act upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    All,
    /// Open requests plus those assigned to this gardener profile.
    OpenOrAssignedTo(i32),
    /// Requests of this client profile.
    OwnedBy(i32),
    Nothing,
}

impl Visibility {
    pub fn for_actor(actor: &Actor) -> Self {
        match *actor {
            Actor::Admin { .. } => Visibility::All,
            Actor::Gardener { gardener_id, .. } => Visibility::OpenOrAssignedTo(gardener_id),
            Actor::Client { client_id, .. } => Visibility::OwnedBy(client_id),
            Actor::Anonymous { .. } => Visibility::Nothing,
        }
    }

    pub fn admits(&self, client_id: i32, gardener_id: Option<i32>, state: VisitState) -> bool {
        match *self {
            Visibility::All => true,
            Visibility::OpenOrAssignedTo(gid) => state == VisitState::Requested || gardener_id == Some(gid),
            Visibility::OwnedBy(cid) => client_id == cid,
            Visibility::Nothing => false,
        }
    }

    pub fn is_nothing(&self) -> bool { matches!(self, Visibility::Nothing) }

    /// Same predicate as [`Visibility::admits`] over `visit_request` columns.
    pub fn condition(&self) -> Condition {
        use visit_request::Column;
        match *self {
            Visibility::All => Condition::all(),
            Visibility::OpenOrAssignedTo(gid) => Condition::any()
                .add(Column::State.eq(VisitState::Requested.as_str()))
                .add(Column::GardenerId.eq(gid)),
            Visibility::OwnedBy(cid) => Condition::all().add(Column::ClientId.eq(cid)),
            // empty `any` renders as FALSE
            Visibility::Nothing => Condition::any(),
        }
    }
}
