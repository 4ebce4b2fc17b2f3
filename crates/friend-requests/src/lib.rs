pub mod errors;
pub mod locks;
pub mod metrics;
pub mod model;
pub mod service;

pub use errors::FriendError;
pub use model::{Relation, Transition};
pub use service::FriendRequests;
