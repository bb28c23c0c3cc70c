//! One prediction run: check input, locate model, load features, predict.

use std::path::Path;

use crate::cli::Cli;
use crate::data::filter::drop_incomplete_rows;
use crate::data::loader;
use crate::data::model::FeatureTable;
use crate::error::RunError;
use crate::model::codec::{self, ModelError};
use crate::model::{Classifier, Label, PredictError};
use crate::paths::{resolve_model_path, SearchRoots, DEFAULT_MODEL_NAMES};

/// Run with the bundled random-forest model format.
pub fn run(cli: &Cli, roots: &SearchRoots) -> Result<Label, RunError> {
    run_with(cli, roots, codec::load_model)
}

/// Run with a caller-supplied model loader.
pub fn run_with<C, L>(cli: &Cli, roots: &SearchRoots, load: L) -> Result<Label, RunError>
where
    C: Classifier,
    L: FnOnce(&Path) -> Result<C, ModelError>,
{
    if !cli.csv.exists() {
        return Err(RunError::InputNotFound(cli.csv.clone()));
    }

    let location = resolve_model_path(cli.model.as_deref(), roots.dirs(), DEFAULT_MODEL_NAMES);
    if location.found {
        log::info!("using model {}", location.path.display());
    } else {
        log::warn!(
            "no model found after {} attempts, falling back to {}",
            location.attempted.len(),
            location.path.display()
        );
    }

    let table = loader::load_file(&cli.csv)?;
    let (table, dropped) = drop_incomplete_rows(table);
    log::debug!("dropped {dropped} incomplete rows, {} remain", table.len());
    if table.is_empty() {
        return Err(RunError::NoCompleteRows);
    }

    let model = load(&location.path).map_err(|source| RunError::ModelLoad {
        attempted: location.attempted,
        source,
    })?;

    predict_label(&model, &table)
}

/// Score every row and map the first class code to its label.
pub fn predict_label<C: Classifier + ?Sized>(
    model: &C,
    table: &FeatureTable,
) -> Result<Label, RunError> {
    let codes = model.predict(table)?;
    let first = *codes.first().ok_or(PredictError::EmptyOutput)?;
    if codes.len() > 1 {
        log::debug!("discarding {} predictions after the first", codes.len() - 1);
    }
    Label::from_class_code(first).ok_or(RunError::UnknownClass(first))
}
