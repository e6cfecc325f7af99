//! State module for tracking crawl progress
//!
//! This module provides the per-task state machine driven by the crawl
//! session. Each task's state lives only for the duration of its processing
//! step; the final state is copied into the crawl result.

mod task_state;

// Re-export main types
pub use task_state::TaskState;
