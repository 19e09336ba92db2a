/// Basic application code
pub mod app;
/// Application authentication and access control
pub mod auth;
/// Clients for outside services
pub mod client;
/// Wall-clock abstraction
pub mod clock;
/// Shared application context
pub mod context;
/// Controllers for REST endpoints
pub mod controller;
/// Password hashing
pub mod crypto;
/// Domain objects
pub mod domain;
/// Error enums
pub mod error;
/// Due-reminder evaluation
pub mod evaluator;
/// Persisted records
pub mod model;
/// Replication of stored files to a remote repository
pub mod replication;
/// Repositories
pub mod repo;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
