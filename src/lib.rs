//! Tetrion (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this package
//! re-exports them as `tetrion::{core,types}` and hosts the command-line driver.

pub use tetrion_core as core;
pub use tetrion_types as types;
