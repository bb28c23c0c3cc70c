//! Command-line BPA/UPA classifier.
//!
//! Reads a feature table, finds the bundled random-forest model across the
//! usual installation layouts, predicts, and reports a single-line JSON
//! envelope for a host application to parse.

pub mod app;
pub mod cli;
pub mod data;
pub mod envelope;
pub mod error;
pub mod model;
pub mod paths;

pub use app::{predict_label, run, run_with};
pub use envelope::Envelope;
pub use error::{ErrorKind, RunError};
