//! cleanup of expired signed url records, run opportunistically on requests.

use super::storage::SignedUrlStorage;
use crate::{Lottery, SignedUrlError};

/// Removes expired signed url records when its lottery wins.
pub struct GarbageCollector;

impl GarbageCollector {
    /// Deletes every record that expired before `now` if `lottery` wins.
    ///
    /// # Returns
    ///
    /// - `Ok(count)` - records removed, `0` when the lottery lost
    /// - `Err(_)` - storage errors
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "signed_url_gc", skip_all, err)
    )]
    pub fn clean(
        storage: &dyn SignedUrlStorage,
        lottery: &Lottery,
        now: i64,
    ) -> Result<u64, SignedUrlError> {
        if !lottery.wins() {
            return Ok(0);
        }

        let removed = storage.delete_expired_before(now)?;

        log::info!(
            target: "warden::signed_url",
            "msg=\"expired signed urls collected\" removed={removed}"
        );

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signed_url::InMemorySignedUrlStorage;

    fn storage() -> InMemorySignedUrlStorage {
        let storage = InMemorySignedUrlStorage::new();
        storage.store("expired", 10, 1).unwrap();
        storage.store("valid", 30, 1).unwrap();
        storage
    }

    #[test]
    fn test_clean_when_lottery_wins() {
        let storage = storage();
        assert_eq!(
            GarbageCollector::clean(&storage, &Lottery::always(), 20).unwrap(),
            1
        );
        assert!(storage.get("expired").unwrap().is_none());
        assert!(storage.get("valid").unwrap().is_some());
    }

    #[test]
    fn test_noop_when_lottery_loses() {
        let storage = storage();
        assert_eq!(
            GarbageCollector::clean(&storage, &Lottery::never(), 20).unwrap(),
            0
        );
        assert_eq!(storage.len(), 2);
    }
}
