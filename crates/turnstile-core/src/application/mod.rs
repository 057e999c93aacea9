/// Flow orchestrator
pub mod orchestrator;

/// Caller-facing request and response types
pub mod responses;
