//! C7 — Resource Pool: bounded reuse of [`WorkerRole`]s across dispatches.
//!
//! Grounded on the provider registry's "no back pointers" discipline
//! (SPEC_FULL.md section B.4): the pool holds roles by value and never
//! stores a reference back into the registry.

use std::collections::HashMap;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::models::WorkerRole;

struct PoolState {
    active: HashMap<Uuid, WorkerRole>,
    available: Vec<WorkerRole>,
}

/// Pool invariant (spec section 8, property #6): after any sequence of
/// checkout/checkin, `active.len() + available.len() <= max_size +
/// in_flight_checkouts`. Every checkout not followed by `cleanup` must be
/// matched by a `checkin`.
pub struct ResourcePool {
    max_size: usize,
    state: Mutex<PoolState>,
}

impl ResourcePool {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            state: Mutex::new(PoolState {
                active: HashMap::new(),
                available: Vec::new(),
            }),
        }
    }

    /// Returns an existing active role with matching identity, else reuses
    /// an available role (rewriting its fields) if pool slack permits, else
    /// constructs `role` fresh. The returned role is marked active.
    pub async fn checkout(&self, role: WorkerRole) -> WorkerRole {
        let mut state = self.state.lock().await;
        let wanted_hash = role.identity_hash();

        if let Some(existing) = state.active.values().find(|r| r.identity_hash() == wanted_hash) {
            return existing.clone();
        }

        if let Some(pos) = state.available.iter().position(|r| r.identity_hash() == wanted_hash) {
            let mut reused = state.available.remove(pos);
            reused.active = true;
            state.active.insert(reused.id, reused.clone());
            return reused;
        }

        let mut minted = role;
        minted.active = true;
        state.active.insert(minted.id, minted.clone());
        minted
    }

    /// Marks `role` inactive and returns it to the available queue. If the
    /// queue is already at `max_size`, the role is discarded instead of
    /// queued (spec section 4.5).
    pub async fn checkin(&self, mut role: WorkerRole) {
        let mut state = self.state.lock().await;
        state.active.remove(&role.id);
        role.active = false;
        if state.available.len() < self.max_size {
            state.available.push(role);
        }
    }

    /// Empties both queues. Bound providers are released implicitly — the
    /// pool never owned a reference into the registry.
    pub async fn cleanup(&self) {
        let mut state = self.state.lock().await;
        state.active.clear();
        state.available.clear();
    }

    /// Drops available (idle) roles down to `max_available`, leaving active
    /// leases untouched. Used by the coordinator's periodic cleanup tick to
    /// shed slack without disturbing in-flight requests (spec section 4.6).
    pub async fn trim_to(&self, max_available: usize) {
        let mut state = self.state.lock().await;
        if state.available.len() > max_available {
            state.available.truncate(max_available);
        }
    }

    pub async fn active_count(&self) -> usize {
        self.state.lock().await.active.len()
    }

    pub async fn available_count(&self) -> usize {
        self.state.lock().await.available.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checkout_of_identical_config_reuses_active_role() {
        let pool = ResourcePool::new(4);
        let a = pool
            .checkout(WorkerRole::new("researcher", "find things").with_providers(["web".to_string()]))
            .await;
        let b = pool
            .checkout(WorkerRole::new("researcher", "find things").with_providers(["web".to_string()]))
            .await;
        assert_eq!(a.id, b.id);
        assert_eq!(pool.active_count().await, 1);
    }

    #[tokio::test]
    async fn checkin_then_checkout_reuses_from_available_queue() {
        let pool = ResourcePool::new(4);
        let role = pool
            .checkout(WorkerRole::new("researcher", "find things").with_providers(["web".to_string()]))
            .await;
        let id = role.id;
        pool.checkin(role).await;
        assert_eq!(pool.active_count().await, 0);
        assert_eq!(pool.available_count().await, 1);

        let reused = pool
            .checkout(WorkerRole::new("researcher", "find things").with_providers(["web".to_string()]))
            .await;
        assert_eq!(reused.id, id);
        assert_eq!(pool.available_count().await, 0);
    }

    #[tokio::test]
    async fn checkin_beyond_capacity_discards_role() {
        let pool = ResourcePool::new(1);
        let r1 = pool.checkout(WorkerRole::new("a", "a")).await;
        let r2 = pool.checkout(WorkerRole::new("b", "b")).await;
        pool.checkin(r1).await;
        pool.checkin(r2).await;
        assert_eq!(pool.available_count().await, 1);
    }

    #[tokio::test]
    async fn cleanup_empties_both_queues() {
        let pool = ResourcePool::new(4);
        let role = pool.checkout(WorkerRole::new("a", "a")).await;
        pool.checkin(role).await;
        pool.cleanup().await;
        assert_eq!(pool.active_count().await, 0);
        assert_eq!(pool.available_count().await, 0);
    }
}
