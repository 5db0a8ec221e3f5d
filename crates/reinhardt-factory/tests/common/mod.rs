//! Shared models and fixtures.

pub mod fixtures;
