//! Errand: official travel task-letter registry.
//!
//! This crate issues and tracks task letters, the documents that authorize an
//! employee's official travel, and records the completion details an
//! official fills in at the destination.
//!
//! # Architecture
//!
//! Errand follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`task_letter`]: Task-letter records, rules, services, and adapters
//! - [`config`]: TOML configuration with environment overrides
//! - [`telemetry`]: `tracing` subscriber setup

pub mod config;
pub mod task_letter;
pub mod telemetry;
