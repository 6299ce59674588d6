//! Unit tests for the store module.
