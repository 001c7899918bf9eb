//! Store integration tests
//!
//! Sessions, configuration files and JSON persistence.

mod persistence;
mod sessions;
