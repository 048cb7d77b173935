//! Transport-free application service.
//!
//! [`AnalyticsService`] holds the operations a route layer exposes: registration, login, token
//! authentication, uploads, per-user history and account administration. Collaborators are
//! passed in at construction; the service keeps no global state.
//!
//! When an [`UploadObserver`] is configured in [`UploadOptions`], each authorized upload reports:
//!
//! - `on_success` once the record is stored, with row/column stats
//! - `on_failure` on failure, with a computed severity
//! - `on_alert` on failure when the severity is >= `options.alert_at_or_above`

pub mod observability;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{Argon2Hasher, AuthConfig, Claims, CredentialHasher, JwtAuthority, TokenAuthority};
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::ingestion::{decode_with, DecodeOptions, UploadFormat};
use crate::model::{AccountId, AccountView, NewAccount, RecordId, StoredUpload, UploadRecord};
use crate::policy::{authorize, Role};
use crate::processing::{summarize, TableSummary};
use crate::store::{AccountStore, InMemoryStore, UploadStore};

pub use observability::{
    severity_for_error, CompositeObserver, FileObserver, StdErrObserver, TracingObserver, UploadContext,
    UploadObserver, UploadSeverity, UploadStats,
};

/// Options controlling upload handling.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct UploadOptions {
    /// Decoding options. If `decode.format` is `None`, the format is inferred from the filename.
    pub decode: DecodeOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn UploadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: UploadSeverity,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            decode: DecodeOptions::default(),
            observer: None,
            alert_at_or_above: UploadSeverity::Critical,
        }
    }
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("decode", &self.decode)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Authenticated caller, derived from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: AccountId,
    /// `None` when the token carried no role or an unknown one.
    pub role: Option<Role>,
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// Result of a stored upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub id: RecordId,
    pub row_count: usize,
    pub summary: TableSummary,
}

/// Registration, login, uploads and administration over injected collaborators.
pub struct AnalyticsService {
    accounts: Arc<dyn AccountStore>,
    uploads: Arc<dyn UploadStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenAuthority>,
    options: UploadOptions,
}

impl fmt::Debug for AnalyticsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsService")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl AnalyticsService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        uploads: Arc<dyn UploadStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenAuthority>,
        options: UploadOptions,
    ) -> Self {
        Self {
            accounts,
            uploads,
            hasher,
            tokens,
            options,
        }
    }

    /// Service over a fresh [`InMemoryStore`], [`Argon2Hasher`] and [`JwtAuthority`].
    pub fn in_memory(auth: &AuthConfig, options: UploadOptions) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(
            store.clone(),
            store,
            Arc::new(Argon2Hasher),
            Arc::new(JwtAuthority::new(auth)),
            options,
        )
    }

    /// Create a `user` account. Username and password are required; usernames are unique.
    pub fn register(&self, username: &str, password: &str) -> ServiceResult<AccountId> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(bad_request("username and password required"));
        }
        if self.accounts.find_account_by_username(username)?.is_some() {
            return Err(ServiceError::UsernameTaken);
        }

        let password_hash = self.hasher.hash(password)?;
        self.accounts
            .save_account(NewAccount {
                username: username.to_string(),
                password_hash,
                role: Role::User,
            })
            .map_err(|e| match e {
                StoreError::Conflict { .. } => ServiceError::UsernameTaken,
                other => other.into(),
            })
    }

    /// Check credentials and issue a token. Unknown users and wrong passwords look the same.
    pub fn login(&self, username: &str, password: &str) -> ServiceResult<LoginResponse> {
        let account = self
            .accounts
            .find_account_by_username(username)?
            .ok_or(ServiceError::InvalidCredentials)?;
        if !self.hasher.verify(password, &account.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue_token(&Claims::new(account.id.clone(), account.role))?;
        Ok(LoginResponse {
            token,
            role: account.role,
        })
    }

    /// Turn an `Authorization: Bearer <token>` header value into a [`Session`].
    pub fn authenticate(&self, authorization: Option<&str>) -> ServiceResult<Session> {
        let header = authorization.ok_or_else(|| unauthorized("no token"))?;
        let mut parts = header.split_whitespace();
        let token = match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => token,
            _ => return Err(unauthorized("malformed authorization header")),
        };

        let claims = self
            .tokens
            .verify_token(token)
            .map_err(|_| unauthorized("invalid token"))?;
        Ok(Session {
            role: claims.role(),
            account_id: claims.sub,
        })
    }

    /// Decode, summarize and store an upload owned by the caller.
    pub fn upload(&self, session: &Session, filename: &str, bytes: &[u8]) -> ServiceResult<UploadReceipt> {
        authorize(session.role, Role::User).require()?;

        let format = self
            .options
            .decode
            .format
            .or_else(|| UploadFormat::from_filename(filename));
        let ctx = UploadContext {
            owner: session.account_id.clone(),
            filename: filename.to_string(),
            format,
        };

        let result = self.store_upload(session, filename, bytes, format);

        if let Some(obs) = self.options.observer.as_ref() {
            match &result {
                Ok(receipt) => obs.on_success(
                    &ctx,
                    UploadStats {
                        rows: receipt.row_count,
                        numeric_columns: receipt.summary.len(),
                    },
                ),
                Err(e) => {
                    let sev = severity_for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result
    }

    fn store_upload(
        &self,
        session: &Session,
        filename: &str,
        bytes: &[u8],
        format: Option<UploadFormat>,
    ) -> ServiceResult<UploadReceipt> {
        if bytes.is_empty() {
            return Err(bad_request("no file uploaded"));
        }

        let decode = DecodeOptions {
            format,
            ..self.options.decode.clone()
        };
        let rows = decode_with(bytes, &decode)?;
        let summary = summarize(&rows);
        let row_count = rows.len();

        let record = UploadRecord::new(session.account_id.clone(), filename, rows, summary.clone());
        let id = self.uploads.save_upload(record)?;

        Ok(UploadReceipt {
            id,
            row_count,
            summary,
        })
    }

    /// The caller's uploads, newest first.
    pub fn history(&self, session: &Session) -> ServiceResult<Vec<StoredUpload>> {
        authorize(session.role, Role::User).require()?;
        Ok(self.uploads.list_by_owner(&session.account_id)?)
    }

    /// All accounts without password hashes. Admin only.
    pub fn list_users(&self, session: &Session) -> ServiceResult<Vec<AccountView>> {
        authorize(session.role, Role::Admin).require()?;
        Ok(self
            .accounts
            .list_accounts()?
            .iter()
            .map(AccountView::from)
            .collect())
    }

    /// Change an account's role. `role` must be `"user"` or `"admin"`. Admin only.
    pub fn update_role(&self, session: &Session, id: &AccountId, role: &str) -> ServiceResult<()> {
        authorize(session.role, Role::Admin).require()?;
        let role = role
            .parse::<Role>()
            .map_err(|e| bad_request(&e.to_string()))?;
        Ok(self.accounts.update_account_role(id, role)?)
    }

    /// Delete an account. Admin only.
    pub fn delete_user(&self, session: &Session, id: &AccountId) -> ServiceResult<()> {
        authorize(session.role, Role::Admin).require()?;
        Ok(self.accounts.delete_account(id)?)
    }
}

fn bad_request(message: &str) -> ServiceError {
    ServiceError::BadRequest {
        message: message.to_string(),
    }
}

fn unauthorized(message: &str) -> ServiceError {
    ServiceError::Unauthorized {
        message: message.to_string(),
    }
}
