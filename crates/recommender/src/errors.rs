use kinship_core_types::UserId;
use kinship_graph_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum RecommendError {
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RecommendError {
    fn from(err: StoreError) -> Self {
        RecommendError::Store(err)
    }
}
