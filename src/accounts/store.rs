//! Account record store.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::accounts::model::{normalize_email, UserRecord};
use crate::lockout::AccountSecurityState;
use crate::observability::metrics;

/// Errors raised by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account {0} not found")]
    NotFound(Uuid),

    #[error("an account with email {0} already exists")]
    Conflict(String),

    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot format error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed persistence for accounts.
///
/// `load_security` followed by `save_security` is a plain read-modify-write;
/// implementations are not required to make the pair atomic.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Insert a new account. Fails with [`StoreError::Conflict`] on a taken email.
    async fn insert(&self, record: UserRecord) -> StoreResult<()>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<UserRecord>>;

    async fn load_security(&self, id: Uuid) -> StoreResult<AccountSecurityState>;

    async fn save_security(&self, id: Uuid, state: AccountSecurityState) -> StoreResult<()>;

    async fn count(&self) -> StoreResult<usize>;

    /// Write any buffered state to durable storage.
    async fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// In-memory store backed by `DashMap`, optionally snapshotted to a JSON file.
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    users: Arc<DashMap<Uuid, UserRecord>>,
    by_email: Arc<DashMap<String, Uuid>>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryAccountStore {
    pub fn new(snapshot_path: Option<PathBuf>) -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            by_email: Arc::new(DashMap::new()),
            snapshot_path,
        }
    }

    /// Open a store, loading the snapshot at `path` if it exists.
    pub fn load_from_file(path: &Path) -> StoreResult<Self> {
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let records: Vec<UserRecord> = serde_json::from_reader(reader)?;
            for record in records {
                store.by_email.insert(record.email.clone(), record.id);
                store.users.insert(record.id, record);
            }
            metrics::record_account_count(store.users.len());
            tracing::info!(
                path = %path.display(),
                accounts = store.users.len(),
                "Loaded account snapshot"
            );
        }
        Ok(store)
    }

    /// Write all accounts to the snapshot file, if one is configured.
    ///
    /// Regular files are replaced atomically through a sibling `.tmp` file.
    /// Other targets (devices, pipes) are written in place.
    pub fn save_to_file(&self) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let records: Vec<UserRecord> = self.users.iter().map(|r| r.value().clone()).collect();

        if path.exists() && !path.is_file() {
            write_snapshot(path, &records, false)?;
        } else {
            let tmp = tmp_path(path);
            if let Err(e) = write_snapshot(&tmp, &records, true) {
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
            fs::rename(&tmp, path)?;
        }

        tracing::info!(path = %path.display(), accounts = records.len(), "Saved account snapshot");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_snapshot(path: &Path, records: &[UserRecord], sync: bool) -> StoreResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;
    if sync {
        writer.get_ref().sync_all()?;
    }
    Ok(())
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, record: UserRecord) -> StoreResult<()> {
        match self.by_email.entry(record.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(record.email)),
            Entry::Vacant(slot) => {
                slot.insert(record.id);
                self.users.insert(record.id, record);
                metrics::record_account_count(self.users.len());
                Ok(())
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let email = normalize_email(email);
        let Some(id) = self.by_email.get(&email).map(|r| *r.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn load_security(&self, id: Uuid) -> StoreResult<AccountSecurityState> {
        self.users
            .get(&id)
            .map(|r| r.value().security)
            .ok_or(StoreError::NotFound(id))
    }

    async fn save_security(&self, id: Uuid, state: AccountSecurityState) -> StoreResult<()> {
        let mut user = self.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.security = state;
        Ok(())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.users.len())
    }

    async fn flush(&self) -> StoreResult<()> {
        self.save_to_file()
    }
}
