//! Shared fixtures for unit tests.
//!
//! Modules built here stand in for the framework assemblies a real module references, so
//! tests can resolve dependencies without touching the filesystem.

pub mod factories;
