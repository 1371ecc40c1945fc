//! Converter configuration.
//!
//! Built-in defaults match the PadChest export layout. The binary loads a
//! `.env` file first, then [`Config::from_env`] overlays the
//! `PADCHEST_XML_*` variables and the positional arguments replace the paths.

use std::path::PathBuf;

use crate::logs::LogFormat;

/// Default CSV input, relative to the working directory.
pub const DEFAULT_INPUT_PATH: &str = "data/PADCHEST_chest_x_ray_images_labels_160K_01.02.19.csv";

/// Default XML output, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "data/PADCHEST_chest_x_ray_images_labels_160K_01.02.19.xml";

/// DTD referenced by the DOCTYPE, relative to the produced XML file.
pub const DEFAULT_DTD_PATH: &str = "../structures/images.dtd";

/// Records between two progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000;

pub const ENV_DTD: &str = "PADCHEST_XML_DTD";
pub const ENV_ENCODING: &str = "PADCHEST_XML_ENCODING";
pub const ENV_PROGRESS: &str = "PADCHEST_XML_PROGRESS";
pub const ENV_LOG_FORMAT: &str = "PADCHEST_XML_LOG_FORMAT";

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// System identifier written into the DOCTYPE.
    pub dtd_path: String,
    /// Forced input encoding label; `None` sniffs the input.
    pub input_encoding: Option<String>,
    /// Log a progress line every N records; 0 disables progress lines.
    pub progress_interval: usize,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            dtd_path: DEFAULT_DTD_PATH.to_string(),
            input_encoding: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Defaults overlaid with the process environment.
    ///
    /// Returns the warnings for ignored values so they can be logged once
    /// the configured log format is in place.
    pub fn from_env() -> (Self, Vec<String>) {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values looked up by variable name.
    ///
    /// Invalid values are ignored and described in the returned warnings.
    pub fn overlay<F>(mut self, lookup: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        if let Some(dtd) = lookup(ENV_DTD).filter(|v| !v.trim().is_empty()) {
            self.dtd_path = dtd.trim().to_string();
        }

        if let Some(label) = lookup(ENV_ENCODING).filter(|v| !v.trim().is_empty()) {
            self.input_encoding = Some(label.trim().to_string());
        }

        if let Some(raw) = lookup(ENV_PROGRESS) {
            match raw.trim().parse::<usize>() {
                Ok(interval) => self.progress_interval = interval,
                Err(_) => warnings.push(format!(
                    "Ignoring {}='{}': not a record count",
                    ENV_PROGRESS, raw
                )),
            }
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            match LogFormat::parse(&raw) {
                Some(format) => self.log_format = format,
                None => warnings.push(format!(
                    "Ignoring {}='{}': expected text or json",
                    ENV_LOG_FORMAT, raw
                )),
            }
        }

        (self, warnings)
    }

    /// Replace the input and/or output path.
    pub fn with_paths(mut self, input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        if let Some(input) = input {
            self.input_path = input;
        }
        if let Some(output) = output {
            self.output_path = output;
        }
        self
    }
}
