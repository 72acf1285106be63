use serde::Serialize;

use crate::auth::domain::Identity;

/// Role of the authenticated account for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rol", rename_all = "snake_case")]
pub enum Actor {
    Admin { account_id: i32 },
    Gardener { account_id: i32, gardener_id: i32 },
    Client { account_id: i32, client_id: i32 },
    /// Authenticated but neither staff nor holder of a profile.
    Anonymous { account_id: i32 },
}

impl Actor {
    /// Staff wins over any profile; a gardener profile wins over a client one.
    pub fn resolve(identity: &Identity) -> Self {
        let account_id = identity.account.id;
        if identity.account.is_staff {
            return Actor::Admin { account_id };
        }
        if let Some(gardener_id) = identity.gardener_id {
            return Actor::Gardener { account_id, gardener_id };
        }
        if let Some(client_id) = identity.client_id {
            return Actor::Client { account_id, client_id };
        }
        Actor::Anonymous { account_id }
    }

    pub fn account_id(&self) -> i32 {
        match *self {
            Actor::Admin { account_id }
            | Actor::Gardener { account_id, .. }
            | Actor::Client { account_id, .. }
            | Actor::Anonymous { account_id } => account_id,
        }
    }

    pub fn role_name(&self) -> &'static str {
        match self {
            Actor::Admin { .. } => "admin",
            Actor::Gardener { .. } => "jardinero",
            Actor::Client { .. } => "cliente",
            Actor::Anonymous { .. } => "anonimo",
        }
    }

    pub fn is_admin(&self) -> bool { matches!(self, Actor::Admin { .. }) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::AccountRecord;

    fn identity(is_staff: bool, client_id: Option<i32>, gardener_id: Option<i32>) -> Identity {
        Identity {
            account: AccountRecord {
                id: 7,
                username: "someone".into(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                is_staff,
            },
            client_id,
            gardener_id,
        }
    }

    #[test]
    fn staff_takes_precedence_over_profiles() {
        assert_eq!(Actor::resolve(&identity(true, Some(1), Some(2))), Actor::Admin { account_id: 7 });
    }

    #[test]
    fn gardener_before_client() {
        assert_eq!(
            Actor::resolve(&identity(false, Some(1), Some(2))),
            Actor::Gardener { account_id: 7, gardener_id: 2 }
        );
        assert_eq!(Actor::resolve(&identity(false, Some(1), None)), Actor::Client { account_id: 7, client_id: 1 });
    }

    #[test]
    fn no_profile_is_anonymous() {
        let actor = Actor::resolve(&identity(false, None, None));
        assert_eq!(actor, Actor::Anonymous { account_id: 7 });
        assert_eq!(actor.role_name(), "anonimo");
        assert_eq!(actor.account_id(), 7);
    }
}
