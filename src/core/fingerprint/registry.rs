//! Shared record of which scan position owns each digest.

use std::collections::HashMap;
use std::sync::Mutex;

/// The one piece of cross-worker state in the pipeline.
///
/// Workers call [`claim`](Self::claim) concurrently. The registry keeps the
/// lowest scan index seen for each digest, so once every worker has finished
/// the owner is the first-scanned file regardless of completion order.
#[derive(Debug, Default)]
pub struct FingerprintRegistry {
    owners: Mutex<HashMap<u128, usize>>,
}

impl FingerprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `scan_index` holds `digest`.
    ///
    /// Returns `true` if `scan_index` is the owner after this call. A later
    /// claim from a lower index can still take ownership away, so the final
    /// answer comes from [`owner`](Self::owner) after all claims are in.
    pub fn claim(&self, digest: u128, scan_index: usize) -> bool {
        let mut owners = self.owners.lock().unwrap_or_else(|p| p.into_inner());
        let owner = owners.entry(digest).or_insert(scan_index);
        if scan_index < *owner {
            *owner = scan_index;
        }
        *owner == scan_index
    }

    /// Scan index owning `digest`, if any file claimed it
    pub fn owner(&self, digest: u128) -> Option<usize> {
        let owners = self.owners.lock().unwrap_or_else(|p| p.into_inner());
        owners.get(&digest).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn first_claim_owns() {
        let registry = FingerprintRegistry::new();
        assert!(registry.claim(42, 3));
        assert!(!registry.claim(42, 7));
        assert_eq!(registry.owner(42), Some(3));
    }

    #[test]
    fn lower_index_takes_over_regardless_of_arrival_order() {
        let registry = FingerprintRegistry::new();
        registry.claim(42, 9);
        assert!(registry.claim(42, 2));
        assert_eq!(registry.owner(42), Some(2));
    }

    #[test]
    fn concurrent_claims_settle_on_lowest_index() {
        let registry = FingerprintRegistry::new();
        (0..1000usize).into_par_iter().rev().for_each(|i| {
            registry.claim((i % 10) as u128, i);
        });

        assert_eq!(registry.len(), 10);
        for digest in 0..10u128 {
            assert_eq!(registry.owner(digest), Some(digest as usize));
        }
    }
}
