use chrono::{Duration, Utc};
use entity::profile;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "pw_session";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// Role ladder. SUPER_ADMIN sits above the persisted roles: the
/// navigation tables know it, but no stored profile can carry it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum UserRole {
    Employee,
    Manager,
    HrAdmin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Employee => "EMPLOYEE",
            UserRole::Manager => "MANAGER",
            UserRole::HrAdmin => "HR_ADMIN",
            UserRole::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "EMPLOYEE" => Some(UserRole::Employee),
            "MANAGER" => Some(UserRole::Manager),
            "HR_ADMIN" => Some(UserRole::HrAdmin),
            "SUPER_ADMIN" => Some(UserRole::SuperAdmin),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            UserRole::Employee => 1,
            UserRole::Manager => 2,
            UserRole::HrAdmin => 3,
            UserRole::SuperAdmin => 4,
        }
    }
}

impl From<profile::Role> for UserRole {
    fn from(value: profile::Role) -> Self {
        match value {
            profile::Role::Employee => UserRole::Employee,
            profile::Role::Manager => UserRole::Manager,
            profile::Role::HrAdmin => UserRole::HrAdmin,
        }
    }
}

/// Request-scoped capability resolved from the session token. Injected
/// into the GraphQL context by the transport layer; absence means the
/// request is unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: UserRole,
}

impl AuthSession {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role.level() >= role.level()
    }
}

pub fn issue_token(user_id: Uuid, config: &AuthConfig) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: user_id,
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}
