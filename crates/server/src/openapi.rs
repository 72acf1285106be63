use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// `cliente` or `jardinero`
    pub rol: String,
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(ToSchema)]
pub struct ClientDoc { pub id: i32, pub user: UserDoc, pub telefono: String }

#[derive(ToSchema)]
pub struct GardenerDoc { pub id: i32, pub user: UserDoc, pub especialidad: String }

#[derive(ToSchema)]
pub struct VisitRequestDoc {
    pub id: i32,
    pub cliente: ClientDoc,
    pub jardinero_asignado: Option<GardenerDoc>,
    pub direccion: String,
    pub tipo_servicio: String,
    pub disponibilidad_horaria: String,
    pub metros_cuadrados: i32,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    /// Display label, e.g. `Confirmada por Cliente`
    pub estado: String,
    pub fecha_creacion: String,
    pub fecha_visita_confirmada: Option<String>,
}

#[derive(ToSchema)]
pub struct VisitRequestInputDoc {
    pub direccion: String,
    pub tipo_servicio: String,
    pub disponibilidad_horaria: String,
    pub metros_cuadrados: i32,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

#[derive(ToSchema)]
pub struct AssignGardenerDoc { pub jardinero_id: i32 }

#[derive(ToSchema)]
pub struct ActionStatusDoc { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::visits::list,
        crate::routes::visits::create,
        crate::routes::visits::get,
        crate::routes::visits::update,
        crate::routes::visits::partial_update,
        crate::routes::visits::accept,
        crate::routes::visits::confirm,
        crate::routes::visits::assign_by_admin,
        crate::routes::admin::delete_account,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            UserDoc,
            ClientDoc,
            GardenerDoc,
            VisitRequestDoc,
            VisitRequestInputDoc,
            AssignGardenerDoc,
            ActionStatusDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "visits"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
