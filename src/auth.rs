//! Credential hashing and token capabilities.
//!
//! The service layer depends on the [`CredentialHasher`] and [`TokenAuthority`] traits only.
//! [`Argon2Hasher`] and [`JwtAuthority`] are the bundled implementations.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::model::AccountId;
use crate::policy::Role;

/// Environment variable holding the token signing secret.
pub const SECRET_ENV: &str = "SHEET_ANALYTICS_JWT_SECRET";
/// Environment variable holding the token lifetime in seconds.
pub const TOKEN_TTL_ENV: &str = "SHEET_ANALYTICS_TOKEN_TTL_SECS";

const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Password hashing capability.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> AuthResult<String>;

    /// `Ok(false)` for a wrong password; `Err` only when `hash` itself is unusable.
    fn verify(&self, password: &str, hash: &str) -> AuthResult<bool>;
}

/// Token issuance and verification capability.
pub trait TokenAuthority: Send + Sync {
    fn issue_token(&self, claims: &Claims) -> AuthResult<String>;

    fn verify_token(&self, token: &str) -> AuthResult<Claims>;
}

/// Identity carried by a token.
///
/// `role` is the raw string from the token so that an unknown role still verifies and is then
/// denied by [`crate::policy::authorize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: AccountId,
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    pub fn new(sub: AccountId, role: Role) -> Self {
        Self {
            sub,
            role: Some(role.as_str().to_string()),
        }
    }

    /// Parsed role, `None` if missing or unknown.
    pub fn role(&self) -> Option<Role> {
        Role::parse(self.role.as_deref())
    }
}

/// Token settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens.
    pub secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Default for AuthConfig {
    /// A per-process random secret and a one day token lifetime.
    fn default() -> Self {
        Self {
            secret: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

impl AuthConfig {
    /// Read [`SECRET_ENV`] and [`TOKEN_TTL_ENV`], falling back to [`Default`] for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(secret) = lookup(SECRET_ENV).filter(|s| !s.is_empty()) {
            cfg.secret = secret;
        }
        if let Some(secs) = lookup(TOKEN_TTL_ENV).and_then(|v| v.trim().parse::<u64>().ok()) {
            cfg.token_ttl = Duration::from_secs(secs);
        }
        cfg
    }
}

/// Argon2id password hashing with a random salt per hash (PHC string format).
#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Hash {
                message: e.to_string(),
            })
    }

    fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash {
            message: e.to_string(),
        })?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[derive(Serialize, Deserialize)]
struct JwtClaims {
    sub: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    exp: u64,
}

/// HS256 JSON Web Tokens with an expiry of `now + token_ttl`.
pub struct JwtAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl fmt::Debug for JwtAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuthority")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl JwtAuthority {
    pub fn new(config: &AuthConfig) -> Self {
        // Expiry is exact: a token is dead once `exp` has passed.
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            token_ttl: config.token_ttl,
        }
    }
}

impl TokenAuthority for JwtAuthority {
    fn issue_token(&self, claims: &Claims) -> AuthResult<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let wire = JwtClaims {
            sub: claims.sub.clone(),
            role: claims.role.clone(),
            exp: (now + self.token_ttl).as_secs(),
        };
        Ok(encode(&Header::default(), &wire, &self.encoding)?)
    }

    fn verify_token(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation)?;
        Ok(Claims {
            sub: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::{
        Argon2Hasher, AuthConfig, Claims, CredentialHasher, JwtAuthority, JwtClaims, SECRET_ENV,
        TOKEN_TTL_ENV, TokenAuthority,
    };
    use crate::model::AccountId;
    use crate::policy::Role;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            secret: secret.to_string(),
            token_ttl: Duration::from_secs(3600),
        }
    }

    #[test]
    fn hash_then_verify() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(hasher.verify("hunter2", &hash).unwrap());
        assert!(!hasher.verify("hunter3", &hash).unwrap());
        assert!(hasher.verify("hunter2", "not a phc string").is_err());
    }

    #[test]
    fn token_carries_subject_and_role() {
        let jwt = JwtAuthority::new(&config("s3cret"));
        let token = jwt
            .issue_token(&Claims::new(AccountId::from("acc-1"), Role::Admin))
            .unwrap();
        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, AccountId::from("acc-1"));
        assert_eq!(claims.role(), Some(Role::Admin));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let a = JwtAuthority::new(&config("one"));
        let b = JwtAuthority::new(&config("two"));
        let token = a
            .issue_token(&Claims::new(AccountId::from("acc-1"), Role::User))
            .unwrap();
        assert!(b.verify_token(&token).is_err());
        assert!(a.verify_token("garbage").is_err());
    }

    #[test]
    fn unknown_role_verifies_but_does_not_parse() {
        let jwt = JwtAuthority::new(&config("s3cret"));
        let claims = Claims {
            sub: AccountId::from("acc-1"),
            role: Some("superuser".to_string()),
        };
        let token = jwt.issue_token(&claims).unwrap();
        assert_eq!(jwt.verify_token(&token).unwrap().role(), None);
    }

    #[test]
    fn default_config_has_one_day_ttl_and_a_secret() {
        let cfg = AuthConfig::default();
        assert_eq!(cfg.token_ttl, Duration::from_secs(86_400));
        assert!(cfg.secret.len() >= 32);
        assert!(!format!("{cfg:?}").contains(&cfg.secret));
    }

    #[test]
    fn expired_token_is_rejected_without_grace() {
        let jwt = JwtAuthority::new(&config("s3cret"));
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let stale = JwtClaims {
            sub: AccountId::from("acc-1"),
            role: Some("user".to_string()),
            exp: now - 5,
        };
        let token = encode(
            &Header::default(),
            &stale,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(jwt.verify_token(&token).is_err());

        let fresh = JwtClaims { exp: now + 60, ..stale };
        let token = encode(
            &Header::default(),
            &fresh,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(jwt.verify_token(&token).is_ok());
    }

    #[test]
    fn config_reads_secret_and_ttl_from_lookup() {
        let vars = HashMap::from([
            (SECRET_ENV, "from-env"),
            (TOKEN_TTL_ENV, " 120 "),
        ]);
        let cfg = AuthConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.secret, "from-env");
        assert_eq!(cfg.token_ttl, Duration::from_secs(120));
    }

    #[test]
    fn config_falls_back_on_unset_empty_or_unparsable_values() {
        let unset = AuthConfig::from_lookup(|_| None);
        assert_eq!(unset.token_ttl, Duration::from_secs(86_400));
        assert!(unset.secret.len() >= 32);

        let vars = HashMap::from([(SECRET_ENV, ""), (TOKEN_TTL_ENV, "a day")]);
        let bad = AuthConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_ne!(bad.secret, "");
        assert_eq!(bad.token_ttl, Duration::from_secs(86_400));
    }
}
