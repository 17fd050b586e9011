//! Shared store key builders.
//!
//! Keys are relative; the store provider applies the configured prefix.

use genqueue_core::types::JobId;

/// FIFO list of queued job ids.
pub fn queue() -> String {
    "prompt_queue".to_string()
}

/// List holding the id the active worker is processing.
pub fn in_flight() -> String {
    "prompt_queue:processing".to_string()
}

/// Hash holding one job record.
pub fn job(job_id: JobId) -> String {
    format!("job:{job_id}")
}

/// Sliding window of admitted inference calls.
pub fn rate_window() -> String {
    "bedrock_requests:window".to_string()
}

/// Single-worker lock flag.
pub fn worker_lock() -> String {
    "queue_processing_lock".to_string()
}
