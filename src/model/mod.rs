//! Classifier capability and the class-code label table.

pub mod codec;
pub mod forest;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::data::model::FeatureTable;

pub use forest::{DecisionTree, Node, RandomForest};

/// Anything that maps every row of a feature table to a class code.
pub trait Classifier {
    /// Predict one class code per row of `table`, in row order.
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, PredictError>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, PredictError> {
        (**self).predict(table)
    }
}

/// Failures raised while turning a feature table into predictions.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("feature '{0}' seen at fit time is missing from the input")]
    MissingFeature(String),

    #[error("feature '{0}' was not seen at fit time")]
    UnexpectedFeature(String),

    #[error("input has {found} features, but the model expects {expected}")]
    FeatureCount { expected: usize, found: usize },

    #[error("could not convert value '{value}' in column '{column}' (row {row}) to float")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("model produced no predictions")]
    EmptyOutput,
}

// ---------------------------------------------------------------------------
// Label table
// ---------------------------------------------------------------------------

/// Human-readable category for a class code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    #[serde(rename = "BPA")]
    Bpa,
    #[serde(rename = "UPA")]
    Upa,
}

impl Label {
    /// Fixed two-class mapping: `0 → BPA`, `1 → UPA`. Anything else is unmapped.
    pub fn from_class_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Label::Bpa),
            1 => Some(Label::Upa),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Bpa => "BPA",
            Label::Upa => "UPA",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_table_is_two_class() {
        assert_eq!(Label::from_class_code(0), Some(Label::Bpa));
        assert_eq!(Label::from_class_code(1), Some(Label::Upa));
        assert_eq!(Label::from_class_code(2), None);
        assert_eq!(Label::from_class_code(-1), None);
    }

    #[test]
    fn label_serializes_as_code_name() {
        assert_eq!(serde_json::to_string(&Label::Upa).unwrap(), "\"UPA\"");
        assert_eq!(Label::Bpa.to_string(), "BPA");
    }
}
