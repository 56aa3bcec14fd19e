//! Shared utilities.

pub mod arrow;
