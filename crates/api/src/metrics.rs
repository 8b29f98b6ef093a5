use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

pub static WEBHOOK_DELIVERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "webhook_deliveries_total",
        "Webhook deliveries acknowledged, grouped by outcome",
        &["outcome"]
    )
    .expect("webhook deliveries total")
});

pub static WEBHOOK_STORE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "webhook_store_failures_total",
        "Best-effort event writes that failed and were swallowed",
        &["reason"]
    )
    .expect("webhook store failures total")
});

pub static WEBHOOK_FAULTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "webhook_faults_total",
        "Deliveries whose handling faulted and were answered with the plain ack"
    )
    .expect("webhook faults total")
});

pub static EVENT_LIST_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "api_event_list_failures_total",
        "Event listings answered with an empty array because the store failed"
    )
    .expect("event list failures total")
});
