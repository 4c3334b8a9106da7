// Analysis Comparison Engine and its HTTP surface.
// The engine is pure; all I/O stays in handlers.rs.

pub mod engine;
pub mod handlers;
pub mod models;
