use kinship_core_types::UserId;
use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("{field} already taken")]
    Conflict { field: &'static str },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable(detail.into())
    }
}
