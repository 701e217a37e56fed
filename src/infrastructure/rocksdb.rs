use crate::domain::operation::OperationLogEntry;
use crate::domain::ports::{OperationLog, UserStore};
use crate::domain::user::{UserId, UserProfile};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family for registered user profiles.
pub const CF_USERS: &str = "users";
/// Column Family for the append-only operation log.
pub const CF_OPERATIONS: &str = "operations";

/// A persistent store implementation using RocksDB.
///
/// Holds both the user registry and the operation log in separate Column
/// Families. Operation keys are a big-endian sequence number so iteration
/// order equals append order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    next_seq: Arc<AtomicU64>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist and resumes the
    /// operation sequence after the last stored entry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_users = ColumnFamilyDescriptor::new(CF_USERS, Options::default());
        let cf_operations = ColumnFamilyDescriptor::new(CF_OPERATIONS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_users, cf_operations])?;

        let next_seq = {
            let cf = db
                .cf_handle(CF_OPERATIONS)
                .ok_or_else(|| BotError::internal("Operations column family not found"))?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => decode_seq(&item?.0)? + 1,
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            next_seq: Arc::new(AtomicU64::new(next_seq)),
        })
    }
}

fn decode_seq(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| BotError::internal("Malformed operation key"))?;
    Ok(u64::from_be_bytes(bytes))
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn register(&self, profile: UserProfile) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_USERS)
            .ok_or_else(|| BotError::internal("Users column family not found"))?;

        let key = profile.user_id.to_be_bytes();
        let value = serde_json::to_vec(&profile)?;
        self.db.put_cf(&cf, key, value)?;

        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        let cf = self
            .db
            .cf_handle(CF_USERS)
            .ok_or_else(|| BotError::internal("Users column family not found"))?;

        match self.db.get_cf(&cf, user_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OperationLog for RocksDBStore {
    async fn append(&self, entry: OperationLogEntry) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_OPERATIONS)
            .ok_or_else(|| BotError::internal("Operations column family not found"))?;

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let value = serde_json::to_vec(&entry)?;
        self.db.put_cf(&cf, seq.to_be_bytes(), value)?;

        Ok(())
    }

    async fn all(&self) -> Result<Vec<OperationLogEntry>> {
        let cf = self
            .db
            .cf_handle(CF_OPERATIONS)
            .ok_or_else(|| BotError::internal("Operations column family not found"))?;

        let mut entries = Vec::new();
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);
        for item in iter {
            let (_key, value) = item?;
            entries.push(serde_json::from_slice(&value)?);
        }

        Ok(entries)
    }
}
