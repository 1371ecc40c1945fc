//! Transformation module.
//!
//! This module handles CSV record to XML transformation:
//! - Columns: per-column grammar and child naming
//! - Array: array literal grammars and token cleaning
//! - Pipeline: the streaming conversion

pub mod array;
pub mod columns;
pub mod pipeline;

pub use array::{clean, parse_array, ArrayParse};
pub use columns::{ColumnSchema, Grammar};
pub use pipeline::*;
