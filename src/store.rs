//! Persistence interfaces and an in-memory implementation.
//!
//! The service layer only talks to [`UploadStore`] and [`AccountStore`]; a document database
//! or SQL backend implements these in the embedding application. [`InMemoryStore`] backs tests
//! and single-process deployments.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::{Account, AccountId, NewAccount, RecordId, StoredUpload, UploadRecord};
use crate::policy::Role;

/// Storage for upload records.
pub trait UploadStore: Send + Sync {
    /// Persist a new record and return its id.
    fn save_upload(&self, record: UploadRecord) -> StoreResult<RecordId>;

    /// All uploads owned by `owner`, newest first.
    fn list_by_owner(&self, owner: &AccountId) -> StoreResult<Vec<StoredUpload>>;
}

/// Storage for accounts.
pub trait AccountStore: Send + Sync {
    fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    fn find_account(&self, id: &AccountId) -> StoreResult<Option<Account>>;

    /// Persist a new account. Fails with [`StoreError::Conflict`] if the username is taken.
    fn save_account(&self, account: NewAccount) -> StoreResult<AccountId>;

    /// Fails with [`StoreError::NotFound`] for an unknown id.
    fn update_account_role(&self, id: &AccountId, role: Role) -> StoreResult<()>;

    /// Fails with [`StoreError::NotFound`] for an unknown id.
    fn delete_account(&self, id: &AccountId) -> StoreResult<()>;

    /// All accounts, ordered by username.
    fn list_accounts(&self) -> StoreResult<Vec<Account>>;
}

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    uploads: Vec<StoredUpload>,
}

/// Thread-safe in-memory store implementing both [`UploadStore`] and [`AccountStore`].
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Unavailable {
            message: "in-memory store lock poisoned".to_string(),
        })
    }
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("InMemoryStore");
        if let Ok(t) = self.tables.lock() {
            d.field("accounts_len", &t.accounts.len())
                .field("uploads_len", &t.uploads.len());
        }
        d.finish()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl UploadStore for InMemoryStore {
    fn save_upload(&self, record: UploadRecord) -> StoreResult<RecordId> {
        let id = RecordId(new_id());
        self.lock()?.uploads.push(StoredUpload {
            id: id.clone(),
            record,
        });
        Ok(id)
    }

    fn list_by_owner(&self, owner: &AccountId) -> StoreResult<Vec<StoredUpload>> {
        let tables = self.lock()?;
        let mut out: Vec<StoredUpload> = tables
            .uploads
            .iter()
            .filter(|u| u.record.owner() == owner)
            .cloned()
            .collect();
        // Ties on timestamp: most recently saved first.
        out.reverse();
        out.sort_by(|a, b| b.record.uploaded_at().cmp(&a.record.uploaded_at()));
        Ok(out)
    }
}

impl AccountStore for InMemoryStore {
    fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    fn find_account(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        Ok(self.lock()?.accounts.get(id).cloned())
    }

    fn save_account(&self, account: NewAccount) -> StoreResult<AccountId> {
        let mut tables = self.lock()?;
        if tables.accounts.values().any(|a| a.username == account.username) {
            return Err(StoreError::Conflict {
                message: format!("username '{}' already exists", account.username),
            });
        }

        let id = AccountId(new_id());
        tables.accounts.insert(
            id.clone(),
            Account {
                id: id.clone(),
                username: account.username,
                password_hash: account.password_hash,
                role: account.role,
            },
        );
        Ok(id)
    }

    fn update_account_role(&self, id: &AccountId, role: Role) -> StoreResult<()> {
        match self.lock()?.accounts.get_mut(id) {
            Some(account) => {
                account.role = role;
                Ok(())
            }
            None => Err(account_not_found(id)),
        }
    }

    fn delete_account(&self, id: &AccountId) -> StoreResult<()> {
        self.lock()?
            .accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| account_not_found(id))
    }

    fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let mut out: Vec<Account> = self.lock()?.accounts.values().cloned().collect();
        out.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(out)
    }
}

fn account_not_found(id: &AccountId) -> StoreError {
    StoreError::NotFound {
        kind: "account",
        id: id.to_string(),
    }
}
