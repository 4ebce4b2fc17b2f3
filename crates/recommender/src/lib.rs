//! Friend recommendations from graph proximity and shared interests.
//!
//! A candidate earns `mutual_friend` points for every friend of the subject
//! who is also friends with the candidate, and `shared_interest` points for
//! every interest tag it shares with the subject. Self and current friends are
//! never candidates. Results are ranked by descending score, then ascending
//! user id.

pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;

pub use engine::Recommender;
pub use errors::RecommendError;
pub use model::{CandidateUser, ScoreWeights};
