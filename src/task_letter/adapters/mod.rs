//! Adapter implementations for task-letter ports.

pub mod memory;
pub mod postgres;
