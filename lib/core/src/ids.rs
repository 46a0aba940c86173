// Id and clock helpers shared by every entity type
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use uuid::Uuid;

/// Process-wide node counter, seeded from the wall clock on first use.
static NODE_COUNTER: OnceLock<AtomicU64> = OnceLock::new();

/// Current wall-clock time in milliseconds since the Unix epoch.
#[inline]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Next node id (`node_<n>`). Strictly increasing within the process.
pub fn next_node_id() -> String {
    let counter = NODE_COUNTER.get_or_init(|| AtomicU64::new(now_millis().max(0) as u64));
    format!("node_{}", counter.fetch_add(1, Ordering::Relaxed))
}

pub fn new_edge_id() -> String {
    prefixed("edge")
}

pub fn new_project_id() -> String {
    prefixed("proj")
}

pub fn new_detail_id() -> String {
    prefixed("detail")
}

fn prefixed(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
