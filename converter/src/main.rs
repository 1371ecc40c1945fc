//! PadChest XML CLI - convert the PadChest label CSV to XML
//!
//! ```bash
//! padchest-xml                          # built-in default paths
//! padchest-xml labels.csv               # custom input, default output
//! padchest-xml labels.csv labels.xml    # custom input and output
//! ```
//!
//! Settings beyond the paths come from `PADCHEST_XML_*` environment
//! variables, optionally set in a `.env` file.

use std::path::PathBuf;

use clap::Parser;
use padchest_xml::logs::{log_error, log_success, log_warning, LOGGER};
use padchest_xml::{convert_file, Config};

#[derive(Parser)]
#[command(name = "padchest-xml", version)]
#[command(about = "Convert the PadChest label CSV into hierarchical XML", long_about = None)]
struct Cli {
    /// Input CSV file
    input: Option<PathBuf>,

    /// Output XML file (overwritten)
    output: Option<PathBuf>,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let (config, warnings) = Config::from_env();
    LOGGER.set_format(config.log_format);
    for warning in warnings {
        log_warning(warning);
    }
    let config = config.with_paths(cli.input, cli.output);

    match convert_file(&config) {
        Ok(summary) => {
            log_success(summary.summary());
            if let Some(elapsed) = summary.elapsed() {
                log_success(format!("✨ Done in {} ms", elapsed.num_milliseconds()));
            }
        }
        Err(e) => {
            log_error(format!("Conversion failed: {}", e));
            log_error("Output file is incomplete and must not be used");
            std::process::exit(1);
        }
    }
}
