//! Unit tests for the task-letter module.
//!
//! Tests are organised by concept: domain values, mutation rules, the
//! lifecycle service, and export addressing.
