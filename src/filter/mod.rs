//! Row filtering for in-memory tables
//!
//! Filters are expressed as [`Expr`] trees and evaluated against Arrow record
//! batches into boolean masks, which are then applied with
//! [`filter_record_batch`].

pub mod core;
pub mod expr;

pub use self::core::{constant_mask, filter_record_batch};
pub use expr::{Expr, LiteralValue};
