//! JSON persistence for [`NaiveBayesModel`].
//!
//! Models are written to a temporary file in the destination directory and
//! renamed into place, so readers never observe a partially written model.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use crate::error::{NbError, Result};
use crate::model::NaiveBayesModel;

/// Serialises the model to a JSON string.
pub fn model_json(model: &NaiveBayesModel, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(model)?
    } else {
        serde_json::to_string(model)?
    };
    Ok(json)
}

/// Atomically persists the model as JSON at `path`.
pub fn save_model<P: AsRef<Path>>(model: &NaiveBayesModel, path: P, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| NbError::io(err, Some(parent.to_path_buf())))?;

    let temp = NamedTempFile::new_in(parent)
        .map_err(|err| NbError::io(err, Some(parent.to_path_buf())))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        if pretty {
            serde_json::to_writer_pretty(&mut writer, model)?;
        } else {
            serde_json::to_writer(&mut writer, model)?;
        }
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|err| NbError::io(err, Some(temp.path().to_path_buf())))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|err| NbError::io(err, Some(temp.path().to_path_buf())))?;
    temp.persist(path)
        .map_err(|err| NbError::io(err.error, Some(path.to_path_buf())))?;

    debug!(
        "saved model with {} categories and vocabulary {} to {}",
        model.categories().len(),
        model.vocabulary_size(),
        path.display()
    );
    Ok(())
}

/// Loads a model from `path` and checks its invariants.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<NaiveBayesModel> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| NbError::io(err, Some(path.to_path_buf())))?;
    let model: NaiveBayesModel = serde_json::from_reader(BufReader::new(file))?;
    model.validate()?;
    debug!(
        "loaded model with {} categories from {}",
        model.categories().len(),
        path.display()
    );
    Ok(model)
}
