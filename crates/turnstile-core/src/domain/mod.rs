/// Flow session aggregate
pub mod flow_session;

/// Domain events
pub mod events;

/// Graph model
pub mod graph;

/// Client application bindings
pub mod application;

/// Repository interfaces
pub mod repository;
