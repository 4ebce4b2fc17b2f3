use std::fmt;

use kinship_core_types::{User, UserId};
use serde::Serialize;

/// State of an unordered pair of users.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "state", content = "from", rename_all = "snake_case")]
pub enum Relation {
    NoRelation,
    PendingFrom(UserId),
    Friends,
}

impl Relation {
    pub fn between(a: &User, b: &User) -> Self {
        if a.is_friend(&b.id) {
            Relation::Friends
        } else if b.has_request_from(&a.id) {
            Relation::PendingFrom(a.id.clone())
        } else if a.has_request_from(&b.id) {
            Relation::PendingFrom(b.id.clone())
        } else {
            Relation::NoRelation
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::NoRelation => f.write_str("no relation"),
            Relation::PendingFrom(id) => write!(f, "pending from {}", id),
            Relation::Friends => f.write_str("friends"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    Requested,
    Accepted,
    Declined,
    Cancelled,
    Unfriended,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Requested => "requested",
            Transition::Accepted => "accepted",
            Transition::Declined => "declined",
            Transition::Cancelled => "cancelled",
            Transition::Unfriended => "unfriended",
        }
    }
}
