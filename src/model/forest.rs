//! Random-forest classifier over dense numeric features.
//!
//! Trees are stored as flat node arrays with the root at index 0. A split
//! sends a row left when `x[feature] <= threshold`. Leaves carry one weight
//! per class; each tree votes with its normalised leaf weights and the forest
//! picks the class with the highest mean probability.

use serde::{Deserialize, Serialize};

use super::{Classifier, PredictError};
use crate::data::model::FeatureTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        weights: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    /// Walk from the root to a leaf and return its class weights.
    ///
    /// Assumes the tree passed [`RandomForest::validate`].
    fn leaf_weights(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { weights } => return weights,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Number of input features.
    pub n_features: usize,
    /// Column names seen at fit time. Empty means positional input.
    pub feature_names: Vec<String>,
    /// Class codes, in the order of leaf weights.
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Check structural invariants so prediction cannot index out of bounds
    /// or loop forever.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("model has no classes".into());
        }
        if self.trees.is_empty() {
            return Err("model has no trees".into());
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != self.n_features {
            return Err(format!(
                "model lists {} feature names for {} features",
                self.feature_names.len(),
                self.n_features
            ));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {t} has no nodes"));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.n_features {
                            return Err(format!(
                                "tree {t} node {i} splits on feature {feature} of {}",
                                self.n_features
                            ));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(format!(
                                    "tree {t} node {i} has invalid child index {child}"
                                ));
                            }
                        }
                    }
                    Node::Leaf { weights } => {
                        if weights.len() != self.classes.len() {
                            return Err(format!(
                                "tree {t} leaf {i} has {} weights for {} classes",
                                weights.len(),
                                self.classes.len()
                            ));
                        }
                        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                            return Err(format!(
                                "tree {t} leaf {i} has a negative or non-finite weight"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Mean class probabilities for one dense row.
    pub fn predict_proba_row(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let weights = tree.leaf_weights(row);
            let total: f64 = weights.iter().sum();
            if total > 0.0 {
                for (p, w) in proba.iter_mut().zip(weights) {
                    *p += w / total;
                }
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    /// Arrange the table's columns into dense rows in fit-time feature order.
    fn design_matrix(&self, table: &FeatureTable) -> Result<Vec<Vec<f64>>, PredictError> {
        let order: Vec<usize> = if self.feature_names.is_empty() {
            if table.columns.len() != self.n_features {
                return Err(PredictError::FeatureCount {
                    expected: self.n_features,
                    found: table.columns.len(),
                });
            }
            (0..self.n_features).collect()
        } else {
            if let Some(extra) = table
                .columns
                .iter()
                .find(|c| !self.feature_names.contains(c))
            {
                return Err(PredictError::UnexpectedFeature(extra.clone()));
            }
            self.feature_names
                .iter()
                .map(|name| {
                    table
                        .column_index(name)
                        .ok_or_else(|| PredictError::MissingFeature(name.clone()))
                })
                .collect::<Result<_, _>>()?
        };

        table
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                order
                    .iter()
                    .map(|&c| {
                        row[c].as_f64().ok_or_else(|| PredictError::NonNumeric {
                            row: r,
                            column: table.columns[c].clone(),
                            value: row[c].to_string(),
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

impl Classifier for RandomForest {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, PredictError> {
        let matrix = self.design_matrix(table)?;
        Ok(matrix
            .iter()
            .map(|row| {
                let proba = self.predict_proba_row(row);
                // First maximum wins on ties.
                let best = proba
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, p)| if *p > proba[best] { i } else { best });
                self.classes[best]
            })
            .collect())
    }
}
