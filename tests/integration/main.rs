//! Integration tests for the vmfleet CLI binary.
