use kinship_core_types::UserId;
use kinship_graph_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FriendError {
    #[error("a user cannot befriend themselves")]
    SelfRelation,
    #[error("a friend request between these users is already pending")]
    DuplicateRequest,
    #[error("users are already friends")]
    AlreadyFriends,
    #[error("no pending friend request")]
    NoPendingRequest,
    #[error("users are not friends")]
    NotFriends,
    #[error("user {0} not found")]
    UnknownUser(UserId),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for FriendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => FriendError::UnknownUser(id),
            other => FriendError::Store(other),
        }
    }
}
