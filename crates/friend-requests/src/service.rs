use std::sync::Arc;

use kinship_core_types::{User, UserId};
use kinship_graph_store::GraphWriter;
use tracing::{debug, info};

use crate::{
    errors::FriendError,
    locks::UserLocks,
    metrics,
    model::{Relation, Transition},
};

/// Owns every mutation of the friendship edges.
///
/// Each transition locks both endpoints, re-reads them, validates the pair
/// state and commits both records in a single batch. `friends` therefore stays
/// symmetric and a pending request never coexists with a friendship.
pub struct FriendRequests<S: ?Sized> {
    store: Arc<S>,
    locks: UserLocks,
}

impl<S> FriendRequests<S>
where
    S: GraphWriter + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: UserLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn relation(&self, a: &UserId, b: &UserId) -> Result<Relation, FriendError> {
        if a == b {
            return Err(FriendError::SelfRelation);
        }
        let first = self.store.get_user(a).await?;
        let second = self.store.get_user(b).await?;
        Ok(Relation::between(&first, &second))
    }

    /// `NoRelation -> PendingFrom(from)`.
    pub async fn send_request(&self, from: &UserId, to: &UserId) -> Result<(), FriendError> {
        self.transition(Transition::Requested, from, to, |sender, recipient| {
            match Relation::between(sender, recipient) {
                Relation::Friends => Err(FriendError::AlreadyFriends),
                Relation::PendingFrom(_) => Err(FriendError::DuplicateRequest),
                Relation::NoRelation => {
                    recipient.friend_requests.push(sender.id.clone());
                    Ok(())
                }
            }
        })
        .await
    }

    /// `PendingFrom(requester) -> Friends`.
    pub async fn accept_request(
        &self,
        recipient: &UserId,
        requester: &UserId,
    ) -> Result<(), FriendError> {
        self.transition(
            Transition::Accepted,
            recipient,
            requester,
            |recipient, requester| {
                take_pending(recipient, &requester.id)?;
                recipient.friends.insert(requester.id.clone());
                requester.friends.insert(recipient.id.clone());
                Ok(())
            },
        )
        .await
    }

    /// `PendingFrom(requester) -> NoRelation`, triggered by the recipient.
    pub async fn decline_request(
        &self,
        recipient: &UserId,
        requester: &UserId,
    ) -> Result<(), FriendError> {
        self.transition(
            Transition::Declined,
            recipient,
            requester,
            |recipient, requester| take_pending(recipient, &requester.id),
        )
        .await
    }

    /// `PendingFrom(requester) -> NoRelation`, triggered by the requester.
    pub async fn cancel_request(
        &self,
        requester: &UserId,
        recipient: &UserId,
    ) -> Result<(), FriendError> {
        self.transition(
            Transition::Cancelled,
            requester,
            recipient,
            |requester, recipient| take_pending(recipient, &requester.id),
        )
        .await
    }

    /// `Friends -> NoRelation`, removing the edge from both sides.
    pub async fn remove_friend(&self, user: &UserId, friend: &UserId) -> Result<(), FriendError> {
        self.transition(Transition::Unfriended, user, friend, |user, friend| {
            if !user.friends.remove(&friend.id) {
                return Err(FriendError::NotFriends);
            }
            friend.friends.remove(&user.id);
            Ok(())
        })
        .await
    }

    async fn transition<F>(
        &self,
        kind: Transition,
        a: &UserId,
        b: &UserId,
        apply: F,
    ) -> Result<(), FriendError>
    where
        F: FnOnce(&mut User, &mut User) -> Result<(), FriendError>,
    {
        if a == b {
            metrics::record_rejection(kind);
            return Err(FriendError::SelfRelation);
        }

        let _guard = self.locks.lock_pair(a, b).await;
        let result = self.commit(a, b, apply).await;

        match &result {
            Ok(()) => {
                metrics::record_transition(kind);
                info!(transition = kind.as_str(), a = %a, b = %b, "friend graph updated");
            }
            Err(err) => {
                metrics::record_rejection(kind);
                debug!(transition = kind.as_str(), a = %a, b = %b, error = %err, "friend transition refused");
            }
        }
        result
    }

    async fn commit<F>(&self, a: &UserId, b: &UserId, apply: F) -> Result<(), FriendError>
    where
        F: FnOnce(&mut User, &mut User) -> Result<(), FriendError>,
    {
        let mut first = self.store.get_user(a).await?;
        let mut second = self.store.get_user(b).await?;
        apply(&mut first, &mut second)?;
        self.store.put_users(vec![first, second]).await?;
        Ok(())
    }
}

fn take_pending(recipient: &mut User, requester: &UserId) -> Result<(), FriendError> {
    if recipient.is_friend(requester) {
        return Err(FriendError::AlreadyFriends);
    }
    let before = recipient.friend_requests.len();
    recipient.friend_requests.retain(|id| id != requester);
    if recipient.friend_requests.len() == before {
        return Err(FriendError::NoPendingRequest);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_graph_store::{GraphStore, InMemoryGraphStore, StoreError};

    fn fixture(ids: &[&str]) -> FriendRequests<InMemoryGraphStore> {
        let store = InMemoryGraphStore::from_users(
            ids.iter()
                .map(|id| User::new(UserId::from(*id), *id, format!("{id}@example.com"))),
        );
        FriendRequests::new(Arc::new(store))
    }

    fn id(value: &str) -> UserId {
        UserId::from(value)
    }

    async fn load(service: &FriendRequests<InMemoryGraphStore>, user: &str) -> User {
        service.store().get_user(&id(user)).await.unwrap()
    }

    #[tokio::test]
    async fn request_then_accept_creates_symmetric_edge() {
        let service = fixture(&["alice", "bob"]);

        service.send_request(&id("alice"), &id("bob")).await.unwrap();
        assert_eq!(
            service.relation(&id("bob"), &id("alice")).await.unwrap(),
            Relation::PendingFrom(id("alice"))
        );
        assert_eq!(load(&service, "bob").await.friend_requests, vec![id("alice")]);

        service.accept_request(&id("bob"), &id("alice")).await.unwrap();

        let alice = load(&service, "alice").await;
        let bob = load(&service, "bob").await;
        assert!(alice.is_friend(&id("bob")));
        assert!(bob.is_friend(&id("alice")));
        assert!(bob.friend_requests.is_empty());
        assert!(alice.friend_requests.is_empty());
        assert_eq!(
            service.relation(&id("alice"), &id("bob")).await.unwrap(),
            Relation::Friends
        );
    }

    #[tokio::test]
    async fn duplicate_and_reverse_requests_are_rejected() {
        let service = fixture(&["alice", "bob"]);
        service.send_request(&id("alice"), &id("bob")).await.unwrap();

        assert_eq!(
            service.send_request(&id("alice"), &id("bob")).await,
            Err(FriendError::DuplicateRequest)
        );
        assert_eq!(
            service.send_request(&id("bob"), &id("alice")).await,
            Err(FriendError::DuplicateRequest)
        );
        assert_eq!(load(&service, "bob").await.friend_requests.len(), 1);
        assert!(load(&service, "alice").await.friend_requests.is_empty());
    }

    #[tokio::test]
    async fn request_between_friends_is_rejected() {
        let service = fixture(&["alice", "bob"]);
        service.send_request(&id("alice"), &id("bob")).await.unwrap();
        service.accept_request(&id("bob"), &id("alice")).await.unwrap();

        assert_eq!(
            service.send_request(&id("bob"), &id("alice")).await,
            Err(FriendError::AlreadyFriends)
        );
        assert_eq!(
            service.accept_request(&id("bob"), &id("alice")).await,
            Err(FriendError::AlreadyFriends)
        );
    }

    #[tokio::test]
    async fn self_relations_are_rejected() {
        let service = fixture(&["alice"]);

        assert_eq!(
            service.send_request(&id("alice"), &id("alice")).await,
            Err(FriendError::SelfRelation)
        );
        assert_eq!(
            service.relation(&id("alice"), &id("alice")).await,
            Err(FriendError::SelfRelation)
        );
    }

    #[tokio::test]
    async fn unknown_users_surface_their_id() {
        let service = fixture(&["alice"]);

        assert_eq!(
            service.send_request(&id("alice"), &id("ghost")).await,
            Err(FriendError::UnknownUser(id("ghost")))
        );
    }

    #[tokio::test]
    async fn accept_without_request_fails() {
        let service = fixture(&["alice", "bob"]);

        assert_eq!(
            service.accept_request(&id("bob"), &id("alice")).await,
            Err(FriendError::NoPendingRequest)
        );
    }

    #[tokio::test]
    async fn decline_and_cancel_return_to_no_relation() {
        let service = fixture(&["alice", "bob", "carol"]);
        service.send_request(&id("alice"), &id("bob")).await.unwrap();
        service.send_request(&id("carol"), &id("bob")).await.unwrap();

        service.decline_request(&id("bob"), &id("alice")).await.unwrap();
        service.cancel_request(&id("carol"), &id("bob")).await.unwrap();

        assert!(load(&service, "bob").await.friend_requests.is_empty());
        assert_eq!(
            service.relation(&id("alice"), &id("bob")).await.unwrap(),
            Relation::NoRelation
        );
        assert_eq!(
            service.cancel_request(&id("carol"), &id("bob")).await,
            Err(FriendError::NoPendingRequest)
        );
    }

    #[tokio::test]
    async fn remove_friend_clears_both_sides() {
        let service = fixture(&["alice", "bob"]);
        service.send_request(&id("alice"), &id("bob")).await.unwrap();
        service.accept_request(&id("bob"), &id("alice")).await.unwrap();

        service.remove_friend(&id("alice"), &id("bob")).await.unwrap();

        assert!(load(&service, "alice").await.friends.is_empty());
        assert!(load(&service, "bob").await.friends.is_empty());
        assert_eq!(
            service.remove_friend(&id("bob"), &id("alice")).await,
            Err(FriendError::NotFriends)
        );
    }

    #[tokio::test]
    async fn concurrent_duplicate_requests_store_one_entry() {
        let service = Arc::new(fixture(&["alice", "bob"]));

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.send_request(&id("alice"), &id("bob")).await })
            })
            .collect();

        let mut accepted = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(load(&service, "bob").await.friend_requests, vec![id("alice")]);
        assert_eq!(service.locks.tracked(), 0);
    }

    #[tokio::test]
    async fn requests_to_unknown_users_leave_no_lock_entries() {
        let service = fixture(&["alice"]);

        for i in 0..1000 {
            let ghost = id(&format!("ghost{i}"));
            let err = service.send_request(&id("alice"), &ghost).await.unwrap_err();
            assert_eq!(err, FriendError::UnknownUser(ghost));
        }

        assert_eq!(service.locks.tracked(), 0);
    }

    #[test]
    fn store_not_found_maps_to_unknown_user() {
        let err: FriendError = StoreError::NotFound(id("x")).into();
        assert_eq!(err, FriendError::UnknownUser(id("x")));
        let err: FriendError = StoreError::unavailable("disk").into();
        assert!(matches!(err, FriendError::Store(StoreError::Unavailable(_))));
    }
}
