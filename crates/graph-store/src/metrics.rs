use lazy_static::lazy_static;
use prometheus::{core::Collector, opts, IntCounter, IntCounterVec, IntGauge, Registry};
use tracing::error;

lazy_static! {
    static ref GRAPH_USERS_TOTAL: IntGauge =
        IntGauge::new("kinship_graph_users_total", "Users held by the graph store").unwrap();
    static ref GRAPH_LOOKUPS_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "kinship_graph_lookups_total",
            "Single and batch user lookups grouped by outcome"
        ),
        &["outcome"]
    )
    .unwrap();
    static ref GRAPH_WRITES_TOTAL: IntCounter = IntCounter::new(
        "kinship_graph_writes_total",
        "Committed user inserts and batch updates",
    )
    .unwrap();
    static ref GRAPH_PERSIST_FAILURES: IntCounter = IntCounter::new(
        "kinship_graph_persist_failures_total",
        "Failed attempts to write the graph snapshot to disk",
    )
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register graph store metric");
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    register(registry, GRAPH_USERS_TOTAL.clone());
    register(registry, GRAPH_LOOKUPS_TOTAL.clone());
    register(registry, GRAPH_WRITES_TOTAL.clone());
    register(registry, GRAPH_PERSIST_FAILURES.clone());
}

pub fn set_user_count(count: usize) {
    GRAPH_USERS_TOTAL.set(count as i64);
}

pub fn record_lookup(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    GRAPH_LOOKUPS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_write() {
    GRAPH_WRITES_TOTAL.inc();
}

pub fn record_persist_failure() {
    GRAPH_PERSIST_FAILURES.inc();
}
