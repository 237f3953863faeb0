//! Unit tests for vmfleet CLI
//!
//! These tests use recording stubs of the port traits and run fast without
//! external I/O.

mod executor_service;
mod helpers;
