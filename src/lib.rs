pub mod clean;
pub mod config;
pub mod constants;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod map;
pub mod pipeline;
pub mod report;
pub mod sources;
pub mod types;

// Outbound HTTP plumbing shared by the remote readers
pub mod infra;
