use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};

pub use models::visit_request::VisitState;

/// Public account fields embedded in profile summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub id: i32,
    pub user: AccountSummary,
    #[serde(rename = "telefono")]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GardenerSummary {
    pub id: i32,
    pub user: AccountSummary,
    #[serde(rename = "especialidad")]
    pub specialty: String,
}

/// Visit request as rendered to callers, with both profiles expanded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitRequestView {
    pub id: i32,
    #[serde(rename = "cliente")]
    pub client: ClientSummary,
    #[serde(rename = "jardinero_asignado")]
    pub gardener: Option<GardenerSummary>,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "tipo_servicio")]
    pub service_type: String,
    #[serde(rename = "disponibilidad_horaria")]
    pub availability: String,
    #[serde(rename = "metros_cuadrados")]
    pub area_m2: i32,
    #[serde(rename = "latitud")]
    pub latitude: Option<f64>,
    #[serde(rename = "longitud")]
    pub longitude: Option<f64>,
    #[serde(rename = "estado", serialize_with = "state_label")]
    pub state: VisitState,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(rename = "fecha_visita_confirmada")]
    pub confirmed_visit_at: Option<DateTime<FixedOffset>>,
}

fn state_label<S: Serializer>(state: &VisitState, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(state.label())
}

impl VisitRequestView {
    pub fn gardener_id(&self) -> Option<i32> { self.gardener.as_ref().map(|g| g.id) }
}

/// Writable fields of a new visit request.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRequestDraft {
    pub address: String,
    pub service_type: String,
    pub availability: String,
    pub area_m2: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Partial update. `None` leaves a field alone; coordinates use
/// `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitRequestPatch {
    pub address: Option<String>,
    pub service_type: Option<String>,
    pub availability: Option<String>,
    pub area_m2: Option<i32>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
}

impl VisitRequestPatch {
    pub fn is_empty(&self) -> bool { *self == Self::default() }
}

impl From<VisitRequestDraft> for VisitRequestPatch {
    fn from(d: VisitRequestDraft) -> Self {
        Self {
            address: Some(d.address),
            service_type: Some(d.service_type),
            availability: Some(d.availability),
            area_m2: Some(d.area_m2),
            latitude: Some(d.latitude),
            longitude: Some(d.longitude),
        }
    }
}

/// Conditional state write: applied only while the row still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub id: i32,
    /// Required current state; `None` accepts any.
    pub expected: Option<VisitState>,
    /// Required owning client profile.
    pub owner: Option<i32>,
    pub next: VisitState,
    /// Gardener to set; `None` leaves the column as is.
    pub gardener: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    Applied,
    /// Row changed underneath (state or owner no longer match).
    StateMismatch,
    UnknownGardener,
}

/// Body of the non-representation action responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionStatus {
    pub status: &'static str,
}

pub const CONFIRMED_STATUS: &str = "Visit confirmed by the client";
pub const ADMIN_ASSIGNED_STATUS: &str = "Gardener assigned by the administrator";
