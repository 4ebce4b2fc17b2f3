use kinship_core_types::{User, UserId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MUTUAL_FRIEND_WEIGHT: u64 = 3;
pub const DEFAULT_SHARED_INTEREST_WEIGHT: u64 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Points per distinct subject -> friend -> candidate path.
    pub mutual_friend: u64,
    /// Points per interest tag shared with the subject.
    pub shared_interest: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            mutual_friend: DEFAULT_MUTUAL_FRIEND_WEIGHT,
            shared_interest: DEFAULT_SHARED_INTEREST_WEIGHT,
        }
    }
}

impl ScoreWeights {
    pub fn score(&self, mutual_friends: usize, shared_interests: usize) -> u64 {
        let proximity = (mutual_friends as u64).saturating_mul(self.mutual_friend);
        let overlap = (shared_interests as u64).saturating_mul(self.shared_interest);
        proximity.saturating_add(overlap)
    }
}

/// Recommended user, stripped to what callers may show.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CandidateUser {
    pub id: UserId,
    pub username: String,
    pub interests: Vec<String>,
    pub score: u64,
    pub mutual_friends: usize,
    pub shared_interests: usize,
}

impl CandidateUser {
    pub(crate) fn project(
        user: &User,
        mutual_friends: usize,
        shared_interests: usize,
        score: u64,
    ) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            interests: user.interests.iter().cloned().collect(),
            score,
            mutual_friends,
            shared_interests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_reference_scheme() {
        let weights = ScoreWeights::default();
        assert_eq!(weights.score(2, 0), 6);
        assert_eq!(weights.score(0, 2), 4);
        assert_eq!(weights.score(1, 1), 5);
    }

    #[test]
    fn score_saturates_instead_of_wrapping() {
        let weights = ScoreWeights {
            mutual_friend: u64::MAX,
            shared_interest: 1,
        };
        assert_eq!(weights.score(2, 1), u64::MAX);
    }
}
