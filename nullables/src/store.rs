//! Nullable state store: thread-safe in-memory snapshot for testing.

use std::sync::Mutex;
use xchain_store::{BridgeState, StateStore, StoreError};

/// Keeps the last committed state in memory. Commits can be made to fail on
/// demand to exercise rollback paths.
pub struct NullStateStore {
    committed: Mutex<Option<BridgeState>>,
    /// Commits to let through, then commits to fail.
    fail_plan: Mutex<(u32, u32)>,
    commit_count: Mutex<u64>,
}

impl NullStateStore {
    pub fn new() -> Self {
        Self {
            committed: Mutex::new(None),
            fail_plan: Mutex::new((0, 0)),
            commit_count: Mutex::new(0),
        }
    }

    /// A store that already holds `state`.
    pub fn with_state(state: BridgeState) -> Self {
        let store = Self::new();
        *store.committed.lock().unwrap() = Some(state);
        store
    }

    /// Make the next `n` commits fail with a backend error.
    pub fn fail_next_commits(&self, n: u32) {
        self.fail_commits_after(0, n);
    }

    /// Let `skip` commits succeed, then fail the following `n`.
    pub fn fail_commits_after(&self, skip: u32, n: u32) {
        *self.fail_plan.lock().unwrap() = (skip, n);
    }

    /// The last successfully committed state.
    pub fn committed(&self) -> Option<BridgeState> {
        self.committed.lock().unwrap().clone()
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> u64 {
        *self.commit_count.lock().unwrap()
    }
}

impl Default for NullStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for NullStateStore {
    fn load(&self) -> Result<Option<BridgeState>, StoreError> {
        Ok(self.committed.lock().unwrap().clone())
    }

    fn commit(&self, state: &BridgeState) -> Result<(), StoreError> {
        let mut plan = self.fail_plan.lock().unwrap();
        let current = *plan;
        match current {
            (0, 0) => {}
            (0, failing) => {
                plan.1 = failing - 1;
                return Err(StoreError::Backend("injected commit failure".into()));
            }
            (skip, _) => plan.0 = skip - 1,
        }
        drop(plan);
        *self.committed.lock().unwrap() = Some(state.clone());
        *self.commit_count.lock().unwrap() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xchain_types::AccountName;

    #[test]
    fn commit_then_load() {
        let store = NullStateStore::new();
        assert!(store.load().unwrap().is_none());

        let mut state = BridgeState::new();
        state.reporters.insert(AccountName::new("rep1").unwrap());
        store.commit(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn injected_failure_keeps_previous_state() {
        let store = NullStateStore::with_state(BridgeState::new());
        store.fail_next_commits(1);

        let mut state = BridgeState::new();
        state.reporters.insert(AccountName::new("rep1").unwrap());
        assert!(matches!(store.commit(&state), Err(StoreError::Backend(_))));
        assert_eq!(store.committed(), Some(BridgeState::new()));

        store.commit(&state).unwrap();
        assert_eq!(store.committed(), Some(state));
    }

    #[test]
    fn delayed_failure_skips_first_commits() {
        let store = NullStateStore::new();
        store.fail_commits_after(1, 1);
        let state = BridgeState::new();
        assert!(store.commit(&state).is_ok());
        assert!(store.commit(&state).is_err());
        assert!(store.commit(&state).is_ok());
        assert_eq!(store.commit_count(), 2);
    }
}
