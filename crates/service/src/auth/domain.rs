use serde::{Deserialize, Serialize};

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    /// `cliente` or `jardinero`; checked by the service so a bad tag is a field error.
    #[serde(rename = "rol")]
    pub role: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "especialidad", default)]
    pub specialty: Option<String>,
}

/// Profile kind a self-registering account receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationRole {
    Client,
    Gardener,
}

impl RegistrationRole {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "cliente" => Some(Self::Client),
            "jardinero" => Some(Self::Gardener),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Client => "cliente",
            Self::Gardener => "jardinero",
        }
    }
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Domain account (business view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub account_id: i32,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Profile row created alongside a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSpec {
    Client { phone: String },
    Gardener { specialty: String },
    None,
}

/// Everything needed to persist an account in one unit of work.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub is_staff: bool,
    pub profile: ProfileSpec,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Account plus the ids of whatever profiles hang off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub account: AccountRecord,
    pub client_id: Option<i32>,
    pub gardener_id: Option<i32>,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub identity: Identity,
    pub token: Option<String>,
}

/// JWT payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub uid: i32,
    pub exp: usize,
}

/// Outcome of an account removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountRemoval {
    pub account_id: i32,
    /// Requests sent back to the open pool because their gardener left.
    pub reverted_requests: u64,
}
