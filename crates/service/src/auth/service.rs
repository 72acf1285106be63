use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use models::account::MAX_USERNAME_LEN;
use models::client_profile::MAX_PHONE_LEN;
use models::gardener_profile::MAX_SPECIALTY_LEN;

use super::domain::{
    AuthSession, Identity, LoginInput, NewAccount, ProfileSpec, RegisterInput, RegistrationRole, TokenClaims,
};
use super::errors::AuthError;
use super::repository::AccountRepository;
use crate::actor::Actor;
use crate::errors::FieldErrors;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Tokens are neither issued nor accepted without a secret.
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, password_algorithm: "argon2".into(), token_ttl_hours: 12 }
    }
}

/// Auth business service independent of web framework
pub struct AuthService {
    repo: Arc<dyn AccountRepository>,
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AccountRepository>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register an account together with the profile named by `rol`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, domain::RegisterInput};
    /// use service::memory::InMemoryStore;
    /// use std::sync::Arc;
    /// let store = Arc::new(InMemoryStore::default());
    /// let svc = AuthService::new(store, AuthConfig::default());
    /// let input = RegisterInput { username: "ana".into(), password: "Secret123".into(), role: "cliente".into(), phone: Some("555".into()), specialty: None };
    /// let identity = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert!(identity.client_id.is_some());
    /// assert!(identity.gardener_id.is_none());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, rol = %input.role))]
    pub async fn register(&self, input: RegisterInput) -> Result<Identity, AuthError> {
        let mut errs = FieldErrors::new();
        let username = input.username.trim();
        if username.is_empty() {
            errs.add("username", "This field may not be blank.");
        } else if username.chars().count() > MAX_USERNAME_LEN {
            errs.add("username", format!("Ensure this field has no more than {MAX_USERNAME_LEN} characters."));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            errs.add("password", format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."));
        }
        let role = RegistrationRole::parse(&input.role);
        if role.is_none() {
            errs.add("rol", format!("\"{}\" is not a valid choice.", input.role));
        }
        let phone = input.phone.unwrap_or_default();
        if phone.chars().count() > MAX_PHONE_LEN {
            errs.add("telefono", format!("Ensure this field has no more than {MAX_PHONE_LEN} characters."));
        }
        let specialty = input.specialty.unwrap_or_default();
        if specialty.chars().count() > MAX_SPECIALTY_LEN {
            errs.add("especialidad", format!("Ensure this field has no more than {MAX_SPECIALTY_LEN} characters."));
        }
        let role = match role {
            Some(role) if errs.is_empty() => role,
            _ => return Err(AuthError::InvalidFields(errs)),
        };

        if let Some(existing) = self.repo.find_account_by_username(username).await? {
            debug!("account exists: {}", existing.username);
            return Err(AuthError::Conflict);
        }

        let profile = match role {
            RegistrationRole::Client => ProfileSpec::Client { phone },
            RegistrationRole::Gardener => ProfileSpec::Gardener { specialty },
        };
        let identity = self.create(username, &input.password, false, profile).await?;
        info!(account_id = identity.account.id, username = %identity.account.username, rol = role.as_tag(), "account_registered");
        Ok(identity)
    }

    /// Create the configured staff account unless it already exists.
    /// Returns the new identity, or `None` when the staff account is present.
    /// A non-staff account holding the username is a validation error.
    #[instrument(skip(self, password))]
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<Option<Identity>, AuthError> {
        if let Some(existing) = self.repo.find_account_by_username(username).await? {
            if !existing.is_staff {
                return Err(AuthError::Validation(format!("admin username `{username}` belongs to a non-staff account")));
            }
            debug!("bootstrap admin already present");
            return Ok(None);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("admin password too short (>={MIN_PASSWORD_LEN})")));
        }
        let identity = self.create(username, password, true, ProfileSpec::None).await?;
        info!(account_id = identity.account.id, username = %username, "admin_bootstrapped");
        Ok(Some(identity))
    }

    async fn create(&self, username: &str, password: &str, is_staff: bool, profile: ProfileSpec) -> Result<Identity, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();
        self.repo
            .create_account(NewAccount {
                username: username.to_string(),
                is_staff,
                profile,
                password_hash: hash,
                password_algorithm: self.cfg.password_algorithm.clone(),
            })
            .await
    }

    /// Authenticate an account and issue a token when a secret is configured.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, domain::{RegisterInput, LoginInput}};
    /// use service::memory::InMemoryStore;
    /// use std::sync::Arc;
    /// let store = Arc::new(InMemoryStore::default());
    /// let svc = AuthService::new(store, AuthConfig { jwt_secret: Some("secret".into()), ..AuthConfig::default() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "gil".into(), password: "Passw0rd".into(), role: "jardinero".into(), phone: None, specialty: Some("poda".into()) }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "gil".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.identity.account.username, "gil");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let account = self.repo
            .find_account_by_username(input.username.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(account.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let identity = self.repo.load_identity(account.id).await?.ok_or(AuthError::Unauthorized)?;
        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize;
            let claims = TokenClaims { sub: account.username.clone(), uid: account.id, exp };
            token = Some(
                encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
                    .map_err(|e| AuthError::TokenError(e.to_string()))?,
            );
        }
        info!(account_id = account.id, "login_succeeded");
        Ok(AuthSession { identity, token })
    }

    /// Decode and check signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let secret = self.cfg.jwt_secret.as_ref().ok_or_else(|| AuthError::TokenError("token signing disabled".into()))?;
        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(data.claims)
    }

    /// Token to identity. A valid token for a removed account is unauthorized.
    pub async fn identify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.verify_token(token)?;
        self.repo.load_identity(claims.uid).await?.ok_or(AuthError::Unauthorized)
    }

    /// Token to actor, resolved once per request.
    pub async fn authenticate(&self, token: &str) -> Result<Actor, AuthError> {
        let identity = self.identify(token).await?;
        Ok(Actor::resolve(&identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    fn svc() -> (Arc<InMemoryStore>, AuthService) {
        let store = Arc::new(InMemoryStore::default());
        let cfg = AuthConfig { jwt_secret: Some("test-secret".into()), ..AuthConfig::default() };
        (store.clone(), AuthService::new(store, cfg))
    }

    fn input(username: &str, role: &str) -> RegisterInput {
        RegisterInput {
            username: username.into(),
            password: "Password1".into(),
            role: role.into(),
            phone: None,
            specialty: None,
        }
    }

    #[tokio::test]
    async fn register_creates_exactly_one_profile_of_requested_kind() {
        let (_, svc) = svc();
        let client = svc.register(input("clara", "cliente")).await.unwrap();
        assert!(client.client_id.is_some() && client.gardener_id.is_none());
        let gardener = svc.register(input("gerardo", "jardinero")).await.unwrap();
        assert!(gardener.gardener_id.is_some() && gardener.client_id.is_none());
        assert!(!gardener.account.is_staff);
    }

    #[tokio::test]
    async fn unknown_role_is_a_field_error() {
        let (_, svc) = svc();
        match svc.register(input("x", "admin")).await {
            Err(AuthError::InvalidFields(f)) => assert!(f.contains("rol")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn field_errors_are_collected_together() {
        let (_, svc) = svc();
        let mut bad = input("  ", "cliente");
        bad.password = "short".into();
        bad.phone = Some("1234567890123456".into());
        match svc.register(bad).await {
            Err(AuthError::InvalidFields(f)) => {
                assert!(f.contains("username"));
                assert!(f.contains("password"));
                assert!(f.contains("telefono"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let (_, svc) = svc();
        svc.register(input("dup", "cliente")).await.unwrap();
        assert!(matches!(svc.register(input("dup", "jardinero")).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_token_resolves_actor() {
        let (_, svc) = svc();
        let id = svc.register(input("gabi", "jardinero")).await.unwrap();
        let session = svc.login(LoginInput { username: "gabi".into(), password: "Password1".into() }).await.unwrap();
        let token = session.token.unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.uid, id.account.id);
        assert_eq!(claims.sub, "gabi");
        let actor = svc.authenticate(&token).await.unwrap();
        assert_eq!(actor, Actor::Gardener { account_id: id.account.id, gardener_id: id.gardener_id.unwrap() });
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (_, svc) = svc();
        svc.register(input("carla", "cliente")).await.unwrap();
        let res = svc.login(LoginInput { username: "carla".into(), password: "nope-nope".into() }).await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
        let res = svc.login(LoginInput { username: "ghost".into(), password: "Password1".into() }).await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn garbage_token_is_token_error() {
        let (_, svc) = svc();
        assert!(matches!(svc.authenticate("not.a.jwt").await, Err(AuthError::TokenError(_))));
    }

    #[tokio::test]
    async fn token_for_removed_account_is_unauthorized() {
        let (store, svc) = svc();
        let id = svc.register(input("temp", "cliente")).await.unwrap();
        let token = svc.login(LoginInput { username: "temp".into(), password: "Password1".into() }).await.unwrap().token.unwrap();
        store.delete_account(id.account.id).await.unwrap();
        assert!(matches!(svc.authenticate(&token).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let (_, svc) = svc();
        let created = svc.bootstrap_admin("root", "rootpass123").await.unwrap().unwrap();
        assert!(created.account.is_staff);
        assert!(created.client_id.is_none() && created.gardener_id.is_none());
        assert!(svc.bootstrap_admin("root", "rootpass123").await.unwrap().is_none());
        let session = svc.login(LoginInput { username: "root".into(), password: "rootpass123".into() }).await.unwrap();
        let actor = svc.authenticate(session.token.as_deref().unwrap()).await.unwrap();
        assert!(actor.is_admin());
    }

    #[tokio::test]
    async fn bootstrap_admin_refuses_non_staff_username() {
        let (_, svc) = svc();
        svc.register(input("root", "cliente")).await.unwrap();
        assert!(matches!(svc.bootstrap_admin("root", "rootpass123").await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn no_secret_means_no_token() {
        let store = Arc::new(InMemoryStore::default());
        let svc = AuthService::new(store, AuthConfig::default());
        svc.register(input("nosec", "cliente")).await.unwrap();
        let session = svc.login(LoginInput { username: "nosec".into(), password: "Password1".into() }).await.unwrap();
        assert!(session.token.is_none());
        assert!(svc.verify_token("x").is_err());
    }
}
