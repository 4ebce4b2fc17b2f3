use std::sync::Arc;

use dashmap::DashMap;
use kinship_core_types::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per user record touched by a transition.
#[derive(Default)]
pub struct UserLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

/// Held for the duration of a two-user transition. Dropping it releases both
/// users and forgets any lock no other task is waiting on.
pub struct PairGuard<'a> {
    owner: &'a UserLocks,
    ids: [UserId; 2],
    first: Option<OwnedMutexGuard<()>>,
    second: Option<OwnedMutexGuard<()>>,
}

impl Drop for PairGuard<'_> {
    fn drop(&mut self) {
        self.second.take();
        self.first.take();
        for id in &self.ids {
            self.owner.release(id);
        }
    }
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: &UserId) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Drops the entry for `id` once the map holds the only handle.
    fn release(&self, id: &UserId) {
        self.locks
            .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Locks both users in ascending id order. `a` and `b` must differ.
    pub async fn lock_pair(&self, a: &UserId, b: &UserId) -> PairGuard<'_> {
        debug_assert_ne!(a, b);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let mut guard = PairGuard {
            owner: self,
            ids: [low.clone(), high.clone()],
            first: None,
            second: None,
        };
        guard.first = Some(self.handle(low).lock_owned().await);
        guard.second = Some(self.handle(high).lock_owned().await);
        guard
    }

    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}
