//! Utility functions for the reference repair services
//!
//! This module provides path arithmetic, tree flattening and logging setup
//! used across the codebase.

mod logging;
mod paths;

pub use logging::{init_tracing, AUDIT_TARGET};
pub use paths::{flatten_descendants, join_path, relative_path, resolve_by_path};
