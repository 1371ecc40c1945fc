//! Error types for the CSV to XML conversion.
//!
//! - [`ReadError`] - failures while pulling logical records from the input
//! - [`ConvertError`] - top-level conversion errors returned by the pipeline
//!
//! Every error aborts the whole conversion. There is no per-record recovery.

use std::fmt;
use std::io;

use thiserror::Error;

// =============================================================================
// Streams and stages
// =============================================================================

/// Which of the two scoped streams an I/O failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Input,
    Output,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Input => f.write_str("input"),
            Stream::Output => f.write_str("output"),
        }
    }
}

/// The operation that failed on a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStage {
    Open,
    Read,
    Write,
    Close,
}

impl fmt::Display for IoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoStage::Open => f.write_str("open"),
            IoStage::Read => f.write_str("read"),
            IoStage::Write => f.write_str("write"),
            IoStage::Close => f.write_str("close"),
        }
    }
}

// =============================================================================
// Record reading errors
// =============================================================================

/// Failure while reading a logical record.
#[derive(Debug, Error)]
#[error("Cannot read record starting at line {line}: {source}")]
pub struct ReadError {
    /// 1-based physical line where the failing record started.
    pub line: usize,
    #[source]
    pub source: io::Error,
}

impl ReadError {
    pub fn new(line: usize, source: io::Error) -> Self {
        Self { line, source }
    }
}

// =============================================================================
// Release errors
// =============================================================================

/// A stream that could not be released cleanly.
#[derive(Debug, Error)]
#[error("failed to close {stream}: {source}")]
pub struct ReleaseFailure {
    pub stream: Stream,
    #[source]
    pub source: io::Error,
}

// =============================================================================
// Conversion errors (top-level)
// =============================================================================

/// Top-level conversion error.
///
/// This is the error returned by [`crate::transform::pipeline::convert_file`]
/// and [`crate::transform::pipeline::Converter::run`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Open, read, write or close failure on either stream.
    #[error("Failed to {stage} {stream}: {source}")]
    Io {
        stream: Stream,
        stage: IoStage,
        #[source]
        source: io::Error,
    },

    /// The input has no header record.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The conversion succeeded but releasing one or both streams failed.
    #[error("{}", join_failures(.0))]
    Release(Vec<ReleaseFailure>),
}

impl ConvertError {
    pub fn io(stream: Stream, stage: IoStage, source: io::Error) -> Self {
        ConvertError::Io {
            stream,
            stage,
            source,
        }
    }

    /// Shorthand for write failures on the output stream.
    pub fn write(source: io::Error) -> Self {
        Self::io(Stream::Output, IoStage::Write, source)
    }
}

impl From<ReadError> for ConvertError {
    fn from(err: ReadError) -> Self {
        ConvertError::Io {
            stream: Stream::Input,
            stage: IoStage::Read,
            source: io::Error::new(err.source.kind(), err.to_string()),
        }
    }
}

fn join_failures(failures: &[ReleaseFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for record reading.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
