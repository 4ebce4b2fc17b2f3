use lazy_static::lazy_static;
use prometheus::{core::Collector, opts, IntCounterVec, Registry};
use tracing::error;

use crate::model::Transition;

lazy_static! {
    static ref FRIEND_TRANSITIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "kinship_friend_transitions_total",
            "Committed friend graph transitions grouped by kind"
        ),
        &["transition"]
    )
    .unwrap();
    static ref FRIEND_REJECTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "kinship_friend_rejections_total",
            "Friend graph transitions refused grouped by attempted kind"
        ),
        &["transition"]
    )
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register friend request metric");
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    register(registry, FRIEND_TRANSITIONS_TOTAL.clone());
    register(registry, FRIEND_REJECTIONS_TOTAL.clone());
}

pub fn record_transition(transition: Transition) {
    FRIEND_TRANSITIONS_TOTAL
        .with_label_values(&[transition.as_str()])
        .inc();
}

pub fn record_rejection(transition: Transition) {
    FRIEND_REJECTIONS_TOTAL
        .with_label_values(&[transition.as_str()])
        .inc();
}
