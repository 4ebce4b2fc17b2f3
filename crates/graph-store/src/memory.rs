use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kinship_core_types::{User, UserId};
use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
    api::{GraphStore, GraphWriter},
    errors::StoreError,
    metrics,
};

/// Process-local graph store, optionally mirrored to a JSON file.
///
/// All records live behind one lock so a batch written through
/// [`GraphWriter::put_users`] becomes visible to readers at once.
#[derive(Default)]
pub struct InMemoryGraphStore {
    inner: RwLock<HashMap<UserId, User>>,
    storage_path: Option<PathBuf>,
    persist_lock: Mutex<()>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let inner: HashMap<UserId, User> =
            users.into_iter().map(|user| (user.id.clone(), user)).collect();
        metrics::set_user_count(inner.len());
        Self {
            inner: RwLock::new(inner),
            storage_path: None,
            persist_lock: Mutex::new(()),
        }
    }

    pub fn with_persistence(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let users = load_snapshot(&path).map_err(|err| {
            StoreError::unavailable(format!("failed to load {}: {err}", path.display()))
        })?;
        info!(path = %path.display(), users = users.len(), "graph store loaded");
        let mut store = Self::from_users(users);
        store.storage_path = Some(path);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    fn after_write(&self) {
        metrics::record_write();
        metrics::set_user_count(self.len());
        if let Err(err) = self.persist_to_disk() {
            metrics::record_persist_failure();
            warn!(error = %err, "graph store persist failed");
        }
    }

    fn persist_to_disk(&self) -> io::Result<()> {
        let Some(path) = self.storage_path.as_ref() else {
            return Ok(());
        };
        let _guard = self.persist_lock.lock();
        let mut users: Vec<User> = self.inner.read().values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let json = serde_json::to_vec_pretty(&users)
            .map_err(|err| io::Error::new(ErrorKind::Other, format!("{err}")))?;

        // Staged next to the snapshot so the rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&json)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> io::Result<Vec<User>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&bytes)
        .map_err(|err| io::Error::new(ErrorKind::InvalidData, format!("{err}")))
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn get_user(&self, id: &UserId) -> Result<User, StoreError> {
        let found = self.inner.read().get(id).cloned();
        metrics::record_lookup(found.is_some());
        found.ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn get_users(&self, ids: &BTreeSet<UserId>) -> Result<HashMap<UserId, User>, StoreError> {
        let guard = self.inner.read();
        let found: HashMap<UserId, User> = ids
            .iter()
            .filter_map(|id| guard.get(id).map(|user| (id.clone(), user.clone())))
            .collect();
        if found.len() < ids.len() {
            debug!(
                requested = ids.len(),
                resolved = found.len(),
                "batch lookup skipped unknown ids"
            );
        }
        metrics::record_lookup(found.len() == ids.len());
        Ok(found)
    }

    async fn query_by_interest(
        &self,
        exclude: &BTreeSet<UserId>,
        interests: &BTreeSet<String>,
    ) -> Result<Vec<User>, StoreError> {
        if interests.is_empty() {
            return Ok(Vec::new());
        }
        let guard = self.inner.read();
        let mut matches: Vec<User> = guard
            .values()
            .filter(|user| !exclude.contains(&user.id))
            .filter(|user| !user.interests.is_disjoint(interests))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }
}

#[async_trait]
impl GraphWriter for InMemoryGraphStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        {
            let mut guard = self.inner.write();
            if guard.contains_key(&user.id) {
                return Err(StoreError::Conflict { field: "id" });
            }
            if guard.values().any(|existing| existing.username == user.username) {
                return Err(StoreError::Conflict { field: "username" });
            }
            if guard.values().any(|existing| existing.email == user.email) {
                return Err(StoreError::Conflict { field: "email" });
            }
            guard.insert(user.id.clone(), user.clone());
        }
        debug!(user = %user.id, "user inserted");
        self.after_write();
        Ok(user)
    }

    async fn put_users(&self, users: Vec<User>) -> Result<(), StoreError> {
        if users.is_empty() {
            return Ok(());
        }
        {
            let mut guard = self.inner.write();
            if let Some(missing) = users.iter().find(|user| !guard.contains_key(&user.id)) {
                return Err(StoreError::NotFound(missing.id.clone()));
            }
            for user in users {
                guard.insert(user.id.clone(), user);
            }
        }
        self.after_write();
        Ok(())
    }

    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<User>, StoreError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let guard = self.inner.read();
        let mut matches: Vec<User> = guard
            .values()
            .filter(|user| {
                user.username.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.username.cmp(&b.username));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.inner.read().values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, interests: &[&str]) -> User {
        User::new(UserId::from(id), id, format!("{id}@example.com")).with_interests(interests)
    }

    fn ids(values: &[&str]) -> BTreeSet<UserId> {
        values.iter().map(|id| UserId::from(*id)).collect()
    }

    #[tokio::test]
    async fn get_user_reports_missing_id() {
        let store = InMemoryGraphStore::from_users([user("u1", &[])]);

        assert!(store.get_user(&UserId::from("u1")).await.is_ok());
        assert_eq!(
            store.get_user(&UserId::from("ghost")).await,
            Err(StoreError::NotFound(UserId::from("ghost")))
        );
    }

    #[tokio::test]
    async fn get_users_omits_unknown_ids() {
        let store = InMemoryGraphStore::from_users([user("u1", &[]), user("u2", &[])]);

        let found = store.get_users(&ids(&["u1", "u2", "ghost"])).await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.contains_key(&UserId::from("u1")));
        assert!(!found.contains_key(&UserId::from("ghost")));
    }

    #[tokio::test]
    async fn query_by_interest_matches_any_tag_and_honours_exclusions() {
        let store = InMemoryGraphStore::from_users([
            user("u1", &["chess", "hiking"]),
            user("u2", &["hiking"]),
            user("u3", &["cooking"]),
            user("u4", &["chess"]),
        ]);
        let interests = ["chess", "hiking"].iter().map(|s| s.to_string()).collect();

        let matches = store
            .query_by_interest(&ids(&["u1", "u4"]), &interests)
            .await
            .unwrap();

        let matched: Vec<&str> = matches.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(matched, vec!["u2"]);
    }

    #[tokio::test]
    async fn query_by_interest_with_no_tags_is_empty() {
        let store = InMemoryGraphStore::from_users([user("u1", &["chess"])]);

        let matches = store
            .query_by_interest(&BTreeSet::new(), &BTreeSet::new())
            .await
            .unwrap();

        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_username_and_email() {
        let store = InMemoryGraphStore::new();
        store.insert_user(user("u1", &[])).await.unwrap();

        let same_name = User::new(UserId::from("u2"), "u1", "other@example.com");
        let same_email = User::new(UserId::from("u3"), "other", "u1@example.com");

        assert_eq!(
            store.insert_user(same_name).await,
            Err(StoreError::Conflict { field: "username" })
        );
        assert_eq!(
            store.insert_user(same_email).await,
            Err(StoreError::Conflict { field: "email" })
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn put_users_is_all_or_nothing() {
        let store = InMemoryGraphStore::from_users([user("u1", &[])]);
        let mut changed = user("u1", &[]);
        changed.friends.insert(UserId::from("u2"));

        let result = store.put_users(vec![changed, user("u2", &[])]).await;

        assert_eq!(result, Err(StoreError::NotFound(UserId::from("u2"))));
        let stored = store.get_user(&UserId::from("u1")).await.unwrap();
        assert!(stored.friends.is_empty());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_limited() {
        let store = InMemoryGraphStore::from_users([
            User::new(UserId::from("u1"), "Alice", "alice@example.com"),
            User::new(UserId::from("u2"), "alicia", "alicia@example.com"),
            User::new(UserId::from("u3"), "bob", "bob@example.com"),
        ]);

        let found = store.search_users("ALI", 10).await.unwrap();
        assert_eq!(found.len(), 2);

        let limited = store.search_users("ali", 1).await.unwrap();
        assert_eq!(limited.len(), 1);

        assert!(store.search_users("   ", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persistence_round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph").join("users.json");

        {
            let store = InMemoryGraphStore::with_persistence(&path).unwrap();
            store.insert_user(user("u1", &["chess"])).await.unwrap();
        }

        let reloaded = InMemoryGraphStore::with_persistence(&path).unwrap();
        let restored = reloaded.get_user(&UserId::from("u1")).await.unwrap();
        assert!(restored.interests.contains("chess"));
    }

    #[tokio::test]
    async fn snapshot_rewrite_leaves_only_the_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = InMemoryGraphStore::with_persistence(&path).unwrap();

        store.insert_user(user("u1", &[])).await.unwrap();
        store.insert_user(user("u2", &["go"])).await.unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("users.json")]);

        let snapshot: Vec<User> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn corrupt_snapshot_surfaces_as_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, b"not json").unwrap();

        let result = InMemoryGraphStore::with_persistence(&path);

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
