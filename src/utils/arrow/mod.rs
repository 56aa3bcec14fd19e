//! Arrow data handling utilities
//!
//! Helpers for looking up and viewing columns of Arrow record batches.

pub mod array_utils;

pub use array_utils::{
    distinct_strings, downcast_array, get_column_by_name, get_column_index, key_column,
    numeric_column,
};
