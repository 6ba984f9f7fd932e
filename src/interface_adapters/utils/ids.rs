use std::sync::atomic::{AtomicU64, Ordering};

/// Returns a process-unique connection id. Ids start at 1 and are never reused, so a late
/// event from a closed socket can never address a newer connection.
pub fn next_connection_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
