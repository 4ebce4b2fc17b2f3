use lazy_static::lazy_static;
use prometheus::{
    core::Collector, exponential_buckets, opts, Histogram, HistogramOpts, IntCounterVec, Registry,
};
use tracing::error;

lazy_static! {
    static ref RECOMMEND_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "kinship_recommend_requests_total",
            "Recommendation computations grouped by outcome"
        ),
        &["outcome"]
    )
    .unwrap();
    static ref RECOMMEND_CANDIDATES: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "kinship_recommend_candidates",
            "Candidates returned per successful computation",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
    )
    .unwrap();
    static ref RECOMMEND_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "kinship_recommend_duration_seconds",
            "Wall time spent computing recommendations",
        )
        .buckets(exponential_buckets(0.0005, 2.0, 14).unwrap()),
    )
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register recommender metric");
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    register(registry, RECOMMEND_REQUESTS_TOTAL.clone());
    register(registry, RECOMMEND_CANDIDATES.clone());
    register(registry, RECOMMEND_DURATION_SECONDS.clone());
}

pub fn record_outcome(outcome: &str, candidates: Option<usize>, elapsed_secs: f64) {
    RECOMMEND_REQUESTS_TOTAL
        .with_label_values(&[outcome])
        .inc();
    RECOMMEND_DURATION_SECONDS.observe(elapsed_secs);
    if let Some(count) = candidates {
        RECOMMEND_CANDIDATES.observe(count as f64);
    }
}
