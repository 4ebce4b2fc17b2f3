use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use kinship_core_types::{User, UserId};
use kinship_graph_store::{GraphStore, StoreError};
use tracing::{debug, warn};

use crate::{
    errors::RecommendError,
    metrics,
    model::{CandidateUser, ScoreWeights},
};

#[derive(Clone, Copy, Debug, Default)]
struct Tally {
    mutual_friends: usize,
    shared_interests: usize,
}

/// Ranks friend candidates for a subject against a read-only graph snapshot.
///
/// All scratch state is local to one [`Recommender::recommend`] call, so a
/// single instance can serve any number of concurrent callers.
pub struct Recommender<S: ?Sized> {
    store: Arc<S>,
    weights: ScoreWeights,
    max_results: Option<usize>,
}

impl<S> Recommender<S>
where
    S: GraphStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            weights: ScoreWeights::default(),
            max_results: None,
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    pub async fn recommend(&self, subject: &UserId) -> Result<Vec<CandidateUser>, RecommendError> {
        let started = Instant::now();
        let result = self.rank(subject).await;
        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(candidates) => {
                metrics::record_outcome("ok", Some(candidates.len()), elapsed);
                debug!(subject = %subject, candidates = candidates.len(), "recommendations ranked");
            }
            Err(RecommendError::NotFound(_)) => {
                metrics::record_outcome("not_found", None, elapsed);
            }
            Err(err) => {
                metrics::record_outcome("store_error", None, elapsed);
                warn!(subject = %subject, error = %err, "recommendation aborted");
            }
        }
        result
    }

    async fn rank(&self, subject_id: &UserId) -> Result<Vec<CandidateUser>, RecommendError> {
        let subject = match self.store.get_user(subject_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => {
                return Err(RecommendError::NotFound(subject_id.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        let mut excluded = subject.friends.clone();
        excluded.insert(subject.id.clone());

        let (paths, matches) = tokio::try_join!(
            self.proximity_pass(&subject, &excluded),
            self.interest_pass(&subject, &excluded),
        )?;

        let mut tallies: HashMap<UserId, Tally> = HashMap::new();
        for (id, count) in paths {
            tallies.entry(id).or_default().mutual_friends += count;
        }

        let mut records: HashMap<UserId, User> = HashMap::new();
        for candidate in matches {
            if excluded.contains(&candidate.id) {
                continue;
            }
            let shared = subject.shared_interest_count(&candidate);
            if shared == 0 {
                continue;
            }
            tallies.entry(candidate.id.clone()).or_default().shared_interests = shared;
            records.insert(candidate.id.clone(), candidate);
        }

        let scored: Vec<(UserId, Tally, u64)> = tallies
            .into_iter()
            .filter(|(id, _)| !excluded.contains(id))
            .map(|(id, tally)| {
                let score = self
                    .weights
                    .score(tally.mutual_friends, tally.shared_interests);
                (id, tally, score)
            })
            .filter(|(_, _, score)| *score > 0)
            .collect();

        let unresolved: BTreeSet<UserId> = scored
            .iter()
            .filter(|(id, _, _)| !records.contains_key(id))
            .map(|(id, _, _)| id.clone())
            .collect();
        if !unresolved.is_empty() {
            records.extend(self.store.get_users(&unresolved).await?);
        }

        let mut candidates: Vec<CandidateUser> = scored
            .into_iter()
            .filter_map(|(id, tally, score)| match records.get(&id) {
                Some(user) => Some(CandidateUser::project(
                    user,
                    tally.mutual_friends,
                    tally.shared_interests,
                    score,
                )),
                None => {
                    debug!(candidate = %id, "skipping dangling candidate");
                    None
                }
            })
            .collect();

        candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = self.max_results {
            candidates.truncate(limit);
        }
        Ok(candidates)
    }

    /// Counts, per friend-of-friend, how many of the subject's friends lead to it.
    async fn proximity_pass(
        &self,
        subject: &User,
        excluded: &BTreeSet<UserId>,
    ) -> Result<HashMap<UserId, usize>, StoreError> {
        let mut paths: HashMap<UserId, usize> = HashMap::new();
        if subject.friends.is_empty() {
            return Ok(paths);
        }
        let friends = self.store.get_users(&subject.friends).await?;
        for friend in friends.values() {
            for potential in &friend.friends {
                if excluded.contains(potential) {
                    continue;
                }
                *paths.entry(potential.clone()).or_insert(0) += 1;
            }
        }
        Ok(paths)
    }

    async fn interest_pass(
        &self,
        subject: &User,
        excluded: &BTreeSet<UserId>,
    ) -> Result<Vec<User>, StoreError> {
        if subject.interests.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .query_by_interest(excluded, &subject.interests)
            .await
    }
}
