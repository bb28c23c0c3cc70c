//! Single-line JSON result envelope written for the host application.
//!
//! Success goes to stdout with exit code 0; failure goes to stderr with exit
//! code 2. The two streams are never mixed.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::RunError;
use crate::model::Label;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success {
        success: bool,
        results: Label,
    },
    Failure {
        success: bool,
        error: String,
        traceback: String,
    },
}

impl Envelope {
    pub fn success(label: Label) -> Self {
        Envelope::Success {
            success: true,
            results: label,
        }
    }

    /// Build the failure envelope: the error message plus the error's
    /// cause chain as the traceback.
    pub fn failure(err: RunError) -> Self {
        Envelope::Failure {
            success: false,
            error: err.message(),
            traceback: traceback(&err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }

    /// Serialize as one line of JSON, newline-terminated.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Write the envelope to `out` and flush.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.to_json_line()?.as_bytes())?;
        out.flush()
    }

    /// Write to stdout on success, stderr on failure.
    pub fn emit(&self) -> io::Result<()> {
        if self.is_success() {
            self.write_to(&mut io::stdout().lock())
        } else {
            self.write_to(&mut io::stderr().lock())
        }
    }
}

/// The error followed by its numbered causes. No stack frames are included:
/// a backtrace taken here would only show the reporting site.
fn traceback(err: &RunError) -> String {
    let mut out = format!("Error: {err}");
    let causes: Vec<_> = anyhow::Chain::new(err).skip(1).collect();
    if !causes.is_empty() {
        out.push_str("\n\nCaused by:");
        for (i, cause) in causes.iter().enumerate() {
            out.push_str(&format!("\n    {i}: {cause}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::codec::ModelError;

    #[test]
    fn success_shape() {
        let env = Envelope::success(Label::Bpa);
        assert_eq!(
            env.to_json_line().unwrap(),
            "{\"success\":true,\"results\":\"BPA\"}\n"
        );
        assert_eq!(env.exit_code(), 0);
    }

    #[test]
    fn failure_shape_and_trace() {
        let env = Envelope::failure(RunError::ModelLoad {
            attempted: vec!["/x/m.bin".into()],
            source: ModelError::BadMagic,
        });
        assert_eq!(env.exit_code(), 2);

        let line = env.to_json_line().unwrap();
        assert_eq!(line.matches('\n').count(), 1);

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("/x/m.bin"));
        let trace = value["traceback"].as_str().unwrap();
        assert!(trace.contains("Caused by"));
        assert!(trace.contains("bad magic bytes"));
    }

    #[test]
    fn traceback_numbers_every_cause() {
        use anyhow::Context;

        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("bad quote"));
        let err = inner
            .context("CSV row 3")
            .context("reading feature table in.csv")
            .unwrap_err();
        let Envelope::Failure {
            error, traceback, ..
        } = Envelope::failure(RunError::Data(err))
        else {
            panic!("expected a failure envelope");
        };
        assert_eq!(error, "reading feature table in.csv: CSV row 3: bad quote");
        assert_eq!(
            traceback,
            "Error: reading feature table in.csv\n\nCaused by:\n    0: CSV row 3\n    1: bad quote"
        );
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let env = Envelope::failure(RunError::InputNotFound("数据.csv".into()));
        assert!(env.to_json_line().unwrap().contains("数据.csv"));
    }

    #[test]
    fn write_to_buffer() {
        let mut buf = Vec::new();
        Envelope::success(Label::Upa).write_to(&mut buf).unwrap();
        assert_eq!(buf, b"{\"success\":true,\"results\":\"UPA\"}\n");
    }
}
