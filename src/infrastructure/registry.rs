//! User registry - Per-user aggregate handles with single-writer access
//!
//! Each user's progression is guarded by its own mutex, so two entries for
//! the same user serialize while entries for different users proceed in
//! parallel. The registry map itself is behind a read-write lock that is
//! held only long enough to fetch or insert a handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::domain::aggregates::UserProgression;
use crate::domain::value_objects::UserId;

/// Shared handle to one user's progression
pub type UserHandle = Arc<Mutex<UserProgression>>;

/// In-memory registry of user progression aggregates
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: RwLock<HashMap<UserId, UserHandle>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the handle for a user, creating an empty aggregate on first
    /// access
    pub fn handle(&self, user_id: UserId) -> UserHandle {
        if let Ok(users) = self.users.read() {
            if let Some(handle) = users.get(&user_id) {
                return Arc::clone(handle);
            }
        }

        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        // A writer may have raced us between the locks
        Arc::clone(users.entry(user_id).or_insert_with(|| {
            debug!(user_id = %user_id, "Registering new user progression");
            Arc::new(Mutex::new(UserProgression::new(user_id)))
        }))
    }

    /// Insert a pre-built aggregate, replacing any existing handle
    pub fn insert(&self, user: UserProgression) -> UserHandle {
        let handle = Arc::new(Mutex::new(user));
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let user_id = {
            let guard = handle.lock().unwrap_or_else(|e| e.into_inner());
            guard.user_id
        };
        users.insert(user_id, Arc::clone(&handle));
        handle
    }

    /// Run a closure against one user's progression under its lock
    pub fn with_user<R>(&self, user_id: UserId, f: impl FnOnce(&mut UserProgression) -> R) -> R {
        let handle = self.handle(user_id);
        let mut user = handle.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut user)
    }

    pub fn user_count(&self) -> usize {
        self.users
            .read()
            .map(|users| users.len())
            .unwrap_or_default()
    }
}
