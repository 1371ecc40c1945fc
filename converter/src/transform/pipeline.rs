//! Streaming CSV to XML conversion.
//!
//! One pass over the input: the header is read and projected once, then
//! every record is split, projected, parsed and written before the next one
//! is read. Memory use is bounded by one record.
//!
//! ```text
//! Start -> HeaderRead -> InRecord* -> Done
//!   \__________\____________\_______-> Failed
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use padchest_xml::{convert_file, Config};
//!
//! let config = Config::default().with_paths(Some("labels.csv".into()), Some("labels.xml".into()));
//! let summary = convert_file(&config)?;
//! println!("{}", summary.summary());
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::array::{clean, parse_array};
use super::columns::{is_xml_name, ColumnSchema, LABEL_TAG, LOCALIZATION_TAG};
use crate::config::Config;
use crate::error::{ConvertError, ConvertResult, IoStage, ReleaseFailure, Stream};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::{ArrayField, FieldValue, ImageElement};
use crate::parser::{
    padchest_header, resolve_encoding, split_fields, ColumnProjector, LogicalRecord, RecordReader,
    SNIFF_LEN,
};
use crate::xml::XmlEmitter;

/// Root element of the document.
pub const ROOT_ELEMENT: &str = "Images";

/// One element per CSV record.
pub const IMAGE_ELEMENT: &str = "image";

/// Attribute carrying the cleaned column 0 value.
pub const ID_ATTRIBUTE: &str = "Identifiant";

/// Where the conversion currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineState {
    Start,
    HeaderRead,
    InRecord,
    Done,
    Failed,
}

/// Counters collected during a conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    /// `<image>` elements written.
    pub records: usize,
    pub leaf_fields: usize,
    pub array_fields: usize,
    /// Children written by flat array fields.
    pub array_items: usize,
    pub sentences: usize,
    /// Array tokens dropped because they cleaned to empty.
    pub suppressed_tokens: usize,
    /// Blank records between data records.
    pub skipped_blank: usize,
    pub encoding: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ConversionSummary {
    fn new(encoding: &str) -> Self {
        Self {
            records: 0,
            leaf_fields: 0,
            array_fields: 0,
            array_items: 0,
            sentences: 0,
            suppressed_tokens: 0,
            skipped_blank: 0,
            encoding: encoding.to_string(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    fn record(&mut self, image: &ImageElement, suppressed: usize) {
        self.records += 1;
        self.suppressed_tokens += suppressed;
        for field in &image.fields {
            match &field.value {
                FieldValue::Scalar(_) => self.leaf_fields += 1,
                FieldValue::Array(array) => {
                    self.array_fields += 1;
                    match array {
                        ArrayField::Empty => {}
                        ArrayField::Flat(tokens) => self.array_items += tokens.len(),
                        ArrayField::Nested(groups) => self.sentences += groups.len(),
                    }
                }
            }
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "Converted {} images: {} leaf fields, {} array fields ({} items, {} sentences), {} suppressed tokens",
            self.records,
            self.leaf_fields,
            self.array_fields,
            self.array_items,
            self.sentences,
            self.suppressed_tokens
        )
    }
}

/// Single-use driver of one conversion.
pub struct Converter<R, W: Write> {
    reader: RecordReader<R>,
    xml: XmlEmitter<W>,
    projector: ColumnProjector,
    schema: ColumnSchema,
    /// Header the projection should yield; mismatches are only reported.
    expected_header: Option<Vec<String>>,
    dtd_path: String,
    progress_interval: usize,
    header: Vec<String>,
    state: PipelineState,
    summary: ConversionSummary,
}

impl<R: BufRead, W: Write> Converter<R, W> {
    /// Converter with the PadChest projection and column schema.
    pub fn new(reader: RecordReader<R>, output: W, config: &Config) -> Self {
        let summary = ConversionSummary::new(reader.encoding().name());
        Self {
            reader,
            xml: XmlEmitter::new(output),
            projector: ColumnProjector::padchest(),
            schema: ColumnSchema::padchest(),
            expected_header: Some(padchest_header().into_iter().map(String::from).collect()),
            dtd_path: config.dtd_path.clone(),
            progress_interval: config.progress_interval,
            header: Vec::new(),
            state: PipelineState::Start,
            summary,
        }
    }

    /// Use another column subset. No header layout is expected then.
    pub fn with_projector(mut self, projector: ColumnProjector) -> Self {
        self.projector = projector;
        self.expected_header = None;
        self
    }

    pub fn with_schema(mut self, schema: ColumnSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Projected header, empty until the header has been read.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Give back the output sink, as far as it was written.
    pub fn into_output(self) -> W {
        self.xml.into_inner()
    }

    /// Convert the whole input. Any error aborts and leaves the state `Failed`.
    pub fn run(&mut self) -> ConvertResult<ConversionSummary> {
        self.summary.started_at = Utc::now();
        match self.drive() {
            Ok(()) => {
                self.state = PipelineState::Done;
                self.summary.finished_at = Some(Utc::now());
                Ok(self.summary.clone())
            }
            Err(err) => {
                self.state = PipelineState::Failed;
                Err(err)
            }
        }
    }

    fn drive(&mut self) -> ConvertResult<()> {
        self.read_header()?;

        while let Some(record) = self.reader.next_record()? {
            self.convert_record(record)?;
        }

        self.xml.exit().map_err(ConvertError::write)?;
        self.xml.flush().map_err(ConvertError::write)
    }

    fn read_header(&mut self) -> ConvertResult<()> {
        let record = self
            .reader
            .next_record()?
            .ok_or_else(|| ConvertError::MalformedInput("missing header record".to_string()))?;
        if record.text.trim().is_empty() {
            return Err(ConvertError::MalformedInput(format!(
                "header record at line {} is empty",
                record.line
            )));
        }

        self.header = self.projector.project(split_fields(&record.text));
        self.report_header();
        self.state = PipelineState::HeaderRead;

        self.xml
            .declaration(ROOT_ELEMENT, &self.dtd_path)
            .map_err(ConvertError::write)?;
        self.xml.enter(ROOT_ELEMENT).map_err(ConvertError::write)
    }

    fn report_header(&self) {
        log_info(format!("📋 Projected {} columns:", self.header.len()));
        for (i, name) in self.header.iter().enumerate() {
            log_info_indent(format!("[{:2}] {}", i, name), 1);
            // Column 0 only feeds the attribute
            if i > 0 && !is_xml_name(name) {
                log_warning(format!("Column '{}' is not a valid XML element name", name));
            }
        }

        if let Some(expected) = &self.expected_header {
            if &self.header != expected {
                log_warning(format!(
                    "Header differs from the PadChest layout (expected {}, found {})",
                    expected.join(","),
                    self.header.join(",")
                ));
            }
        }
    }

    fn convert_record(&mut self, record: LogicalRecord) -> ConvertResult<()> {
        self.state = PipelineState::InRecord;

        if record.text.trim().is_empty() {
            self.summary.skipped_blank += 1;
            return Ok(());
        }
        if record.unterminated {
            log_warning(format!(
                "Record at line {} ends inside a quoted field; converting it as-is",
                record.line
            ));
        }

        let fields = self.projector.project(split_fields(&record.text));
        let (image, suppressed) = build_image(&self.header, &self.schema, fields);
        write_image(&mut self.xml, &self.schema, &image).map_err(ConvertError::write)?;
        self.summary.record(&image, suppressed);

        if self.progress_interval > 0 && self.summary.records % self.progress_interval == 0 {
            log_info(format!("Converted {} records", self.summary.records));
        }
        Ok(())
    }
}

/// Build the `<image>` for one projected record.
///
/// Returns the element and the number of array tokens that were suppressed.
/// Leaf fields are skipped only when literally empty, so a leaf `None`
/// stays as text while an array token `None` is dropped.
pub fn build_image(
    header: &[String],
    schema: &ColumnSchema,
    fields: Vec<String>,
) -> (ImageElement, usize) {
    let mut fields = fields.into_iter();
    let identifier = fields.next().map(|id| clean(&id)).unwrap_or_default();
    let mut image = ImageElement::new(identifier);
    let mut suppressed = 0;

    for (name, raw) in header.iter().skip(1).zip(fields) {
        if !raw.contains('[') {
            if !raw.is_empty() {
                image.push(name.as_str(), FieldValue::Scalar(raw));
            }
            continue;
        }

        let parsed = parse_array(&raw, schema.grammar(name));
        suppressed += parsed.suppressed;
        image.push(name.as_str(), FieldValue::Array(parsed.field));
    }

    (image, suppressed)
}

/// Write one `<image>` element and its children.
pub fn write_image<W: Write>(
    xml: &mut XmlEmitter<W>,
    schema: &ColumnSchema,
    image: &ImageElement,
) -> std::io::Result<()> {
    xml.enter_with_attribute(IMAGE_ELEMENT, ID_ATTRIBUTE, &image.identifier)?;

    for field in &image.fields {
        match &field.value {
            FieldValue::Scalar(value) => xml.leaf(&field.name, value)?,
            FieldValue::Array(array) => {
                xml.enter(&field.name)?;
                let child = schema.child_tag(&field.name);
                match array {
                    ArrayField::Empty => {}
                    ArrayField::Flat(tokens) => {
                        for token in tokens {
                            xml.leaf(&child, token)?;
                        }
                    }
                    ArrayField::Nested(groups) => {
                        for group in groups {
                            xml.enter(&child)?;
                            xml.leaf(LABEL_TAG, &group.label)?;
                            for localization in &group.localizations {
                                xml.leaf(LOCALIZATION_TAG, localization)?;
                            }
                            xml.exit()?;
                        }
                    }
                }
                xml.exit()?;
            }
        }
    }

    xml.exit()
}

/// Convert from any buffered reader to any writer.
///
/// The input encoding is taken from `config.input_encoding` or sniffed from
/// the buffered start of `input`.
pub fn convert<R: BufRead, W: Write>(
    input: R,
    output: W,
    config: &Config,
) -> ConvertResult<ConversionSummary> {
    let reader = open_reader(input, config.input_encoding.as_deref())?;
    log_success(format!("Input encoding: {}", reader.encoding().name()));
    Converter::new(reader, output, config).run()
}

/// Convert `config.input_path` into `config.output_path`, overwriting it.
///
/// Both files are released on every path. When the conversion itself
/// failed, release failures are logged and the conversion error is returned.
pub fn convert_file(config: &Config) -> ConvertResult<ConversionSummary> {
    log_info(format!("📄 Converting: {}", config.input_path.display()));

    let input = File::open(&config.input_path)
        .map_err(|e| ConvertError::io(Stream::Input, IoStage::Open, e))?;
    let output = File::create(&config.output_path)
        .map_err(|e| ConvertError::io(Stream::Output, IoStage::Open, e))?;
    let mut writer = BufWriter::new(output);

    // The input handle is moved in and closed when `convert` returns
    let outcome = convert(BufReader::with_capacity(SNIFF_LEN, input), &mut writer, config);
    let released = release_output(writer);

    match (outcome, released) {
        (Ok(summary), Ok(())) => {
            log_success(format!("💾 Output written to: {}", config.output_path.display()));
            Ok(summary)
        }
        (Ok(_), Err(failure)) => Err(ConvertError::Release(vec![failure])),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(failure)) => {
            log_error(failure.to_string());
            Err(err)
        }
    }
}

fn open_reader<R: BufRead>(input: R, forced: Option<&str>) -> ConvertResult<RecordReader<R>> {
    if let Some(label) = forced {
        match resolve_encoding(label) {
            Some(encoding) => return Ok(RecordReader::new(input, encoding)),
            None => log_warning(format!(
                "Unknown or unsupported input encoding '{}', detecting instead",
                label
            )),
        }
    }
    Ok(RecordReader::sniff(input)?)
}

/// Flush buffered output and push it to disk.
fn release_output(writer: BufWriter<File>) -> Result<(), ReleaseFailure> {
    let file = writer.into_inner().map_err(|e| ReleaseFailure {
        stream: Stream::Output,
        source: e.into_error(),
    })?;
    file.sync_all().map_err(|e| ReleaseFailure {
        stream: Stream::Output,
        source: e,
    })
}
