use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub const MIN_USERNAME_LEN: usize = 3;

/// Stable identifier of a user node in the friendship graph.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct UserId(pub String);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum UserValidationError {
    #[error("username must be at least 3 characters")]
    UsernameTooShort,
    #[error("email must not be empty")]
    EmailMissing,
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub interests: BTreeSet<String>,
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub friends: BTreeSet<UserId>,
    /// Inbound pending requests, oldest first.
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub friend_requests: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Unchecked constructor for records restored from storage or fixtures.
    pub fn new(id: UserId, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            interests: BTreeSet::new(),
            friends: BTreeSet::new(),
            friend_requests: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.interests = normalize_interests(interests);
        self
    }

    /// Builds a freshly registered user with no edges.
    pub fn register<I, S>(
        username: &str,
        email: &str,
        interests: I,
    ) -> Result<Self, UserValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let username = username.trim();
        let email = email.trim();
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(UserValidationError::UsernameTooShort);
        }
        if email.is_empty() {
            return Err(UserValidationError::EmailMissing);
        }
        Ok(Self::new(UserId::new(), username, email).with_interests(interests))
    }

    pub fn is_friend(&self, other: &UserId) -> bool {
        self.friends.contains(other)
    }

    pub fn has_request_from(&self, other: &UserId) -> bool {
        self.friend_requests.iter().any(|id| id == other)
    }

    pub fn shared_interest_count(&self, other: &User) -> usize {
        self.interests.intersection(&other.interests).count()
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            interests: self.interests.iter().cloned().collect(),
        }
    }
}

/// Public view of a user handed to callers outside the graph.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub interests: Vec<String>,
}

/// Trims tags, drops empty ones and collapses duplicates.
pub fn normalize_interests<I, S>(interests: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    interests
        .into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
