//! Logical record reader.
//!
//! A logical record ends at the first line end where the double-quote state
//! is back outside. A doubled `""` is a literal quote and does not toggle the
//! state. Physical lines of one record are joined with `\n`.

use std::io::BufRead;

use encoding_rs::Encoding;

use super::{decode_line, detect_encoding, SNIFF_LEN};
use crate::error::{ReadError, ReadResult};

/// One logical CSV record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRecord {
    /// 1-based physical line the record starts on.
    pub line: usize,
    pub text: String,
    /// The input ended inside a quoted span.
    pub unterminated: bool,
}

/// Lazy, non-restartable sequence of logical records.
pub struct RecordReader<R> {
    inner: R,
    encoding: &'static Encoding,
    /// Physical lines consumed so far.
    line: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    /// Reader decoding with a known encoding.
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            line: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Reader whose encoding is sniffed from the buffered start of `inner`.
    ///
    /// Nothing is consumed; the sniffed bytes are read again as records.
    pub fn sniff(mut inner: R) -> ReadResult<Self> {
        let sample = inner.fill_buf().map_err(|e| ReadError::new(1, e))?;
        let sample = &sample[..sample.len().min(SNIFF_LEN)];
        let encoding = detect_encoding(sample);
        Ok(Self::new(inner, encoding))
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Physical lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// Read the next logical record, `None` at end of input.
    pub fn next_record(&mut self) -> ReadResult<Option<LogicalRecord>> {
        if self.done {
            return Ok(None);
        }

        let start = self.line + 1;
        let mut text = String::new();
        let mut started = false;
        let mut in_quotes = false;

        loop {
            self.buf.clear();
            let read = match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(read) => read,
                Err(e) => {
                    self.done = true;
                    return Err(ReadError::new(start, e));
                }
            };
            if read == 0 {
                self.done = true;
                break;
            }
            self.line += 1;

            let decoded = decode_line(trim_line_end(&self.buf), self.encoding, self.line == 1);
            if started {
                text.push('\n');
            }
            text.push_str(&decoded);
            started = true;

            if toggles_quote_state(&decoded) {
                in_quotes = !in_quotes;
            }
            if !in_quotes {
                return Ok(Some(LogicalRecord {
                    line: start,
                    text,
                    unterminated: false,
                }));
            }
        }

        if !started {
            return Ok(None);
        }
        // Dangling quoted span at end of input: hand back what we have
        Ok(Some(LogicalRecord {
            line: start,
            text,
            unterminated: true,
        }))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = ReadResult<LogicalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn trim_line_end(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// Whether the line contains an odd number of unescaped double quotes.
fn toggles_quote_state(line: &str) -> bool {
    let mut toggles = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '"' {
            continue;
        }
        if chars.peek() == Some(&'"') {
            chars.next();
            continue;
        }
        toggles = !toggles;
    }
    toggles
}
