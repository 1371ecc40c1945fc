//! CSV record parsing for the PadChest export.
//!
//! This is not a general CSV reader. It implements exactly the quoting and
//! splitting rules the export needs:
//!
//! - [`reader`] - logical records spanning several physical lines
//! - [`fields`] - comma splitting at bracket depth zero
//! - [`projection`] - the fixed column subset
//!
//! Input bytes are decoded line by line with an encoding sniffed from the
//! start of the stream (see [`detect_encoding`]).

pub mod fields;
pub mod projection;
pub mod reader;

use std::borrow::Cow;

use encoding_rs::{Encoding, ISO_8859_15, UTF_8, WINDOWS_1252};

use crate::logs::log_warning;

pub use fields::{split_fields, unquote_field};
pub use projection::{padchest_header, ColumnProjector, PADCHEST_COLUMNS};
pub use reader::{LogicalRecord, RecordReader};

/// Bytes inspected when sniffing the input encoding.
pub const SNIFF_LEN: usize = 64 * 1024;

/// Detect the encoding of raw bytes.
///
/// Bytes that are valid UTF-8 (a sequence cut at the end of the sample
/// included) are UTF-8. Anything else is left to chardet, falling back to
/// UTF-8 when the detected charset is unknown or unsupported.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if is_utf8_prefix(bytes) {
        return UTF_8;
    }
    let result = chardet::detect(bytes);
    resolve_encoding(&result.0).unwrap_or(UTF_8)
}

fn is_utf8_prefix(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

/// Resolve an encoding label, normalizing the names chardet reports.
///
/// Records are split on the `\n` byte, so only ASCII-compatible encodings
/// are accepted. Others are reported and resolve to `None`.
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let encoding = match label.trim().to_lowercase().as_str() {
        "" => return None,
        "ascii" | "us-ascii" | "utf-8" | "utf8" => UTF_8,
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => WINDOWS_1252,
        "iso-8859-15" | "latin-9" => ISO_8859_15,
        other => Encoding::for_label(other.as_bytes())?,
    };
    if !encoding.is_ascii_compatible() {
        log_warning(format!(
            "Unsupported input encoding {}: not ASCII-compatible",
            encoding.name()
        ));
        return None;
    }
    Some(encoding)
}

/// Decode one physical line. Malformed sequences are replaced, never fatal.
pub fn decode_line<'a>(
    bytes: &'a [u8],
    encoding: &'static Encoding,
    first_line: bool,
) -> Cow<'a, str> {
    if first_line {
        encoding.decode_with_bom_removal(bytes).0
    } else {
        encoding.decode_without_bom_handling(bytes).0
    }
}
