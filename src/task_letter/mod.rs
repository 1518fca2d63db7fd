//! Task-letter management for Errand.
//!
//! A task letter authorizes an employee's official travel. This module
//! covers issuing letters, amending them, recording the completion details
//! an official fills in at the destination, removing letters, and resolving
//! where exported documents are published. It follows hexagonal
//! architecture:
//!
//! - Domain types and rules in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
