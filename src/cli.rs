use std::path::PathBuf;

use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "bpa-predict", version)]
#[command(about = "Run model prediction (JSON output)")]
pub struct Cli {
    /// Input CSV file path
    pub csv: PathBuf,

    /// Optional path to a model file (overrides the bundled model).
    /// An empty value means no override.
    #[arg(short, long, value_parser = OsStringValueParser::new().map(PathBuf::from))]
    pub model: Option<PathBuf>,
}
