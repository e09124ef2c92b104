//! Profile cache and block list
//!
//! The repository is injected wherever profiles are looked up, so probes and
//! tests see an explicit collaborator rather than process-wide state.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::core::TargetId;
use crate::probe::search::NearbyProfile;

/// Cache and block-list operations consulted by the distance probe
pub trait ProfileRepository: Send + Sync {
    /// Cached profile, if any
    fn get(&self, id: &TargetId) -> Option<NearbyProfile>;

    fn is_blocked(&self, id: &TargetId) -> bool;

    /// Cache a profile seen in search results; existing entries are kept
    fn remember(&self, profile: &NearbyProfile);

    /// First phase of a block: hide the profile locally right away
    fn begin_block(&self, id: &TargetId) -> PendingBlock;

    /// Second phase after the service accepted the block
    fn confirm_block(&self, pending: PendingBlock);

    /// Second phase after the service refused the block: undo the local write
    fn rollback_block(&self, pending: PendingBlock);
}

/// Local state captured by [`ProfileRepository::begin_block`]
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a pending block must be confirmed or rolled back"]
pub struct PendingBlock {
    pub id: TargetId,
    was_blocked: bool,
    evicted: Option<NearbyProfile>,
}

#[derive(Debug, Default)]
struct RepositoryState {
    profiles: HashMap<TargetId, NearbyProfile>,
    blocked: HashSet<TargetId>,
}

/// In-process repository
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    state: RwLock<RepositoryState>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded with an already-known block list
    pub fn with_blocked<I>(blocked: I) -> Self
    where
        I: IntoIterator<Item = TargetId>,
    {
        let repo = Self::default();
        repo.state.write().blocked.extend(blocked);
        repo
    }

    pub fn cached_count(&self) -> usize {
        self.state.read().profiles.len()
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn get(&self, id: &TargetId) -> Option<NearbyProfile> {
        self.state.read().profiles.get(id).cloned()
    }

    fn is_blocked(&self, id: &TargetId) -> bool {
        self.state.read().blocked.contains(id)
    }

    fn remember(&self, profile: &NearbyProfile) {
        let mut state = self.state.write();
        if !state.blocked.contains(&profile.id) {
            state
                .profiles
                .entry(profile.id.clone())
                .or_insert_with(|| profile.clone());
        }
    }

    fn begin_block(&self, id: &TargetId) -> PendingBlock {
        let mut state = self.state.write();
        let was_blocked = !state.blocked.insert(id.clone());
        let evicted = state.profiles.remove(id);
        debug!(target_id = %id, was_blocked, "block pending");

        PendingBlock {
            id: id.clone(),
            was_blocked,
            evicted,
        }
    }

    fn confirm_block(&self, pending: PendingBlock) {
        debug!(target_id = %pending.id, "block confirmed");
    }

    fn rollback_block(&self, pending: PendingBlock) {
        let mut state = self.state.write();
        if !pending.was_blocked {
            state.blocked.remove(&pending.id);
        }
        if let Some(profile) = pending.evicted {
            state.profiles.entry(pending.id.clone()).or_insert(profile);
        }
        debug!(target_id = %pending.id, "block rolled back");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_keeps_first_entry() {
        let repo = InMemoryProfileRepository::new();
        repo.remember(&NearbyProfile::new(1u64, 0.5));
        repo.remember(&NearbyProfile::new(1u64, 0.9));

        assert_eq!(repo.cached_count(), 1);
        assert_eq!(repo.get(&TargetId::from(1u64)).unwrap().distance_km, Some(0.5));
    }

    #[test]
    fn test_blocked_profiles_are_not_cached() {
        let repo = InMemoryProfileRepository::with_blocked([TargetId::from(7u64)]);
        repo.remember(&NearbyProfile::new(7u64, 0.2));

        assert!(repo.is_blocked(&TargetId::from(7u64)));
        assert!(repo.get(&TargetId::from(7u64)).is_none());
    }

    #[test]
    fn test_block_confirm() {
        let repo = InMemoryProfileRepository::new();
        let id = TargetId::from(3u64);
        repo.remember(&NearbyProfile::new(3u64, 1.0));

        let pending = repo.begin_block(&id);
        assert!(repo.is_blocked(&id));
        assert!(repo.get(&id).is_none());

        repo.confirm_block(pending);
        assert!(repo.is_blocked(&id));
        assert!(repo.get(&id).is_none());
    }

    #[test]
    fn test_block_rollback_restores_state() {
        let repo = InMemoryProfileRepository::new();
        let id = TargetId::from(3u64);
        repo.remember(&NearbyProfile::new(3u64, 1.0));

        let pending = repo.begin_block(&id);
        repo.rollback_block(pending);

        assert!(!repo.is_blocked(&id));
        assert_eq!(repo.get(&id), Some(NearbyProfile::new(3u64, 1.0)));
    }

    #[test]
    fn test_rollback_keeps_prior_block() {
        let id = TargetId::from(9u64);
        let repo = InMemoryProfileRepository::with_blocked([id.clone()]);

        let pending = repo.begin_block(&id);
        repo.rollback_block(pending);
        assert!(repo.is_blocked(&id));
    }
}
