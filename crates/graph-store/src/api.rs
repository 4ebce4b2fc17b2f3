use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use kinship_core_types::{User, UserId};

use crate::errors::StoreError;

/// Read side of the friendship graph, the only surface the recommender sees.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<User, StoreError>;

    /// Resolves every id it can; unknown ids are left out of the map.
    async fn get_users(&self, ids: &BTreeSet<UserId>) -> Result<HashMap<UserId, User>, StoreError>;

    /// Users sharing at least one tag with `interests`, minus `exclude`.
    async fn query_by_interest(
        &self,
        exclude: &BTreeSet<UserId>,
        interests: &BTreeSet<String>,
    ) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait GraphWriter: GraphStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    /// Replaces all given records in one step. Every record must already exist.
    async fn put_users(&self, users: Vec<User>) -> Result<(), StoreError>;

    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
}
