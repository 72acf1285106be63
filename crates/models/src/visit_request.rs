use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{client_profile, gardener_profile};

pub const MAX_ADDRESS_LEN: usize = 300;
pub const MAX_SERVICE_TYPE_LEN: usize = 100;
pub const MAX_AVAILABILITY_LEN: usize = 200;

/// Lifecycle state of a visit request.
///
/// Stored lowercase; [`VisitState::label`] is what clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum VisitState {
    #[sea_orm(string_value = "solicitada")]
    #[serde(rename = "solicitada")]
    Requested,
    #[sea_orm(string_value = "asignada")]
    #[serde(rename = "asignada")]
    Assigned,
    #[sea_orm(string_value = "confirmada")]
    #[serde(rename = "confirmada")]
    Confirmed,
    #[sea_orm(string_value = "completada")]
    #[serde(rename = "completada")]
    Completed,
    #[sea_orm(string_value = "cancelada")]
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl VisitState {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitState::Requested => "solicitada",
            VisitState::Assigned => "asignada",
            VisitState::Confirmed => "confirmada",
            VisitState::Completed => "completada",
            VisitState::Cancelled => "cancelada",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VisitState::Requested => "Solicitada",
            VisitState::Assigned => "Asignada",
            VisitState::Confirmed => "Confirmada por Cliente",
            VisitState::Completed => "Completada",
            VisitState::Cancelled => "Cancelada",
        }
    }

    /// States during which a gardener reference is live work.
    pub fn holds_assignment(self) -> bool {
        matches!(self, VisitState::Assigned | VisitState::Confirmed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, VisitState::Completed | VisitState::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visit_request")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub gardener_id: Option<i32>,
    pub address: String,
    pub service_type: String,
    pub availability: String,
    pub area_m2: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub state: VisitState,
    pub created_at: DateTimeWithTimeZone,
    pub confirmed_visit_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Client,
    Gardener,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Client => Entity::belongs_to(client_profile::Entity)
                .from(Column::ClientId)
                .to(client_profile::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Gardener => Entity::belongs_to(gardener_profile::Entity)
                .from(Column::GardenerId)
                .to(gardener_profile::Column::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .into(),
        }
    }
}

impl Related<client_profile::Entity> for Entity {
    fn to() -> RelationDef { Relation::Client.def() }
}

impl Related<gardener_profile::Entity> for Entity {
    fn to() -> RelationDef { Relation::Gardener.def() }
}

impl ActiveModelBehavior for ActiveModel {}
