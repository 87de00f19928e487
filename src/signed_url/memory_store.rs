use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::storage::{SignedUrlStorage, UsageRecord};
use crate::SignedUrlError;

/// Signed url storage backed by a `HashMap`. Clones share the same map.
///
/// Counters are per process; use a shared backend when more than one
/// process validates links.
#[derive(Debug, Clone, Default)]
pub struct InMemorySignedUrlStorage {
    records: Arc<RwLock<HashMap<String, UsageRecord>>>,
}

impl InMemorySignedUrlStorage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_guard(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<String, UsageRecord>>, SignedUrlError> {
        self.records
            .read()
            .map_err(|_| SignedUrlError::Storage("Lock poisoned".to_owned()))
    }

    fn write_guard(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, UsageRecord>>, SignedUrlError> {
        self.records
            .write()
            .map_err(|_| SignedUrlError::Storage("Lock poisoned".to_owned()))
    }
}

impl SignedUrlStorage for InMemorySignedUrlStorage {
    fn store(&self, identifier: &str, expires: i64, max_usage: u32) -> Result<(), SignedUrlError> {
        self.write_guard()?
            .insert(identifier.to_owned(), UsageRecord::new(expires, max_usage));
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn increment_usage(&self, identifier: &str) -> Result<u32, SignedUrlError> {
        let mut records = self.write_guard()?;
        let record = records
            .get_mut(identifier)
            .ok_or_else(|| SignedUrlError::UnknownIdentifier(identifier.to_owned()))?;
        record.used = record.used.saturating_add(1);
        Ok(record.used)
    }

    fn get(&self, identifier: &str) -> Result<Option<UsageRecord>, SignedUrlError> {
        Ok(self.read_guard()?.get(identifier).copied())
    }

    fn all(&self) -> Result<HashMap<String, UsageRecord>, SignedUrlError> {
        Ok(self.read_guard()?.clone())
    }

    fn delete_expired_before(&self, timestamp: i64) -> Result<u64, SignedUrlError> {
        let mut records = self.write_guard()?;
        let before_count = records.len();
        records.retain(|_, record| !record.is_expired_at(timestamp));
        let removed = before_count.saturating_sub(records.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
