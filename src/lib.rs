// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Domain layer
pub mod integration;
pub mod pagination;
pub mod service;
pub mod template;

// Application layer
pub mod api;
pub mod server;
