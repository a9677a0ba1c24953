//! In-memory collaborators for testing collectors.
//!
//! This module provides `MockKstatReader` and `MockExecutor` plus pre-built
//! scenarios, so collectors can be exercised without kstat access or real
//! plugin processes.

mod executor;
mod kstat;
mod scenarios;

pub use executor::MockExecutor;
pub use kstat::MockKstatReader;
