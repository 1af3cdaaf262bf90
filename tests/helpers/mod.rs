//! Shared fixtures and setup for the integration tests.

pub mod host_helpers;
pub mod source_fixtures;
