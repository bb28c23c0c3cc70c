//! Binary model file format.
//!
//! ```text
//! ┌──────────────────────┬─────────┬──────────────────────────────┐
//! │ magic "RFMODEL\0" (8) │ ver (1) │ bincode(RandomForest) payload │
//! └──────────────────────┴─────────┴──────────────────────────────┘
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::forest::RandomForest;

/// Magic bytes identifying a model file.
pub const MAGIC: &[u8; 8] = b"RFMODEL\0";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_SIZE: usize = MAGIC.len() + 1;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read model file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a model file (bad magic bytes)")]
    BadMagic,

    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    #[error("corrupt model payload: {0}")]
    Decode(#[from] bincode::Error),

    #[error("invalid model: {0}")]
    Invalid(String),
}

/// Serialize a forest into the on-disk format.
pub fn encode(forest: &RandomForest) -> Result<Vec<u8>, ModelError> {
    let payload = bincode::serialize(forest)?;
    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(FORMAT_VERSION);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parse and validate a forest from on-disk bytes.
pub fn decode(bytes: &[u8]) -> Result<RandomForest, ModelError> {
    if bytes.len() < HEADER_SIZE || &bytes[..MAGIC.len()] != MAGIC {
        return Err(ModelError::BadMagic);
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(ModelError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }
    let forest: RandomForest = bincode::deserialize(&bytes[HEADER_SIZE..])?;
    forest.validate().map_err(ModelError::Invalid)?;
    Ok(forest)
}

/// Load a model from disk. A missing file is reported as [`ModelError::NotFound`].
pub fn load_model(path: &Path) -> Result<RandomForest, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes)
}

/// Write a model to disk, creating parent directories as needed.
pub fn save_model(path: &Path, forest: &RandomForest) -> Result<(), ModelError> {
    let io_err = |source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, encode(forest)?).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::forest::{DecisionTree, Node};

    fn tiny() -> RandomForest {
        RandomForest {
            n_features: 1,
            feature_names: vec!["f0".into()],
            classes: vec![0, 1],
            trees: vec![DecisionTree {
                nodes: vec![Node::Leaf {
                    weights: vec![1.0, 0.0],
                }],
            }],
        }
    }

    #[test]
    fn save_then_load_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").join("RF_binary_v1.pickle");
        save_model(&path, &tiny()).unwrap();
        assert_eq!(load_model(&path).unwrap(), tiny());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.pickle");
        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
        assert!(err.to_string().contains("absent.pickle"));
    }

    #[test]
    fn rejects_foreign_bytes() {
        assert!(matches!(decode(b"\x80\x04\x95pickle"), Err(ModelError::BadMagic)));
        assert!(matches!(decode(b""), Err(ModelError::BadMagic)));
    }

    #[test]
    fn rejects_future_version() {
        let mut bytes = encode(&tiny()).unwrap();
        bytes[MAGIC.len()] = FORMAT_VERSION + 1;
        assert!(matches!(
            decode(&bytes),
            Err(ModelError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let bytes = encode(&tiny()).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() - 4]),
            Err(ModelError::Decode(_))
        ));
    }

    #[test]
    fn rejects_structurally_invalid_forest() {
        let mut forest = tiny();
        forest.classes.clear();
        let bytes = encode(&forest).unwrap();
        assert!(matches!(decode(&bytes), Err(ModelError::Invalid(_))));
    }
}
