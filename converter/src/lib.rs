//! # PadChest XML - streaming CSV to XML transcoder
//!
//! Converts the PadChest chest x-ray label export (CSV with Python-style
//! list literals inside fields) into hierarchical, indented XML.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌───────────┐   ┌─────────────┐   ┌────────────┐
//! │ CSV file │──▶│ RecordReader │──▶│ split and │──▶│ array parse │──▶│ XmlEmitter │
//! │ (sniffed)│   │ (multi-line) │   │  project  │   │ flat/nested │   │  (<Images>)│
//! └──────────┘   └──────────────┘   └───────────┘   └─────────────┘   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use padchest_xml::{convert_file, Config};
//!
//! let (config, _warnings) = Config::from_env();
//! let summary = convert_file(&config).unwrap();
//! println!("{}", summary.summary());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Defaults and environment overrides
//! - [`logs`] - Console logging
//! - [`models`] - Image, field and array models
//! - [`parser`] - Record reading, field splitting, column projection
//! - [`transform`] - Array grammars, column schema, pipeline
//! - [`xml`] - Streaming XML writer

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod xml;

// =============================================================================
// Re-exports - Errors and configuration
// =============================================================================

pub use config::Config;
pub use error::{ConvertError, ConvertResult, IoStage, ReadError, ReleaseFailure, Stream};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ArrayField, FieldValue, ImageElement, ImageField, SentenceGroup};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    detect_encoding, split_fields, ColumnProjector, LogicalRecord, RecordReader, PADCHEST_COLUMNS,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::array::{clean, parse_array, ArrayParse};
pub use transform::columns::{ColumnSchema, Grammar};
pub use transform::pipeline::{
    build_image, convert, convert_file, write_image, ConversionSummary, Converter, PipelineState,
};

// =============================================================================
// Re-exports - XML
// =============================================================================

pub use xml::XmlEmitter;
