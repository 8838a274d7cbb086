//! Predictor persistence.
//!
//! Predictors are written as pretty JSON (`.json`) or as bincode (`.bin`).
//! Both formats keep every node field, so a reloaded predictor returns the
//! same predictions as the one that was saved.

use crate::core::error::{GbdtError, Result};
use crate::prediction::TreePredictor;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// On-disk predictor format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorFormat {
    Json,
    Bincode,
}

impl PredictorFormat {
    /// Format implied by the file extension of `path`
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(PredictorFormat::Json),
            Some("bin") => Ok(PredictorFormat::Bincode),
            other => Err(GbdtError::serialization(format!(
                "unsupported predictor file extension {:?}, use .json or .bin",
                other.unwrap_or("")
            ))),
        }
    }
}

/// Save `predictor` to `path`, choosing the format from the extension.
pub fn save_predictor<P: AsRef<Path>>(predictor: &TreePredictor, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = PredictorFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);

    match format {
        PredictorFormat::Json => serde_json::to_writer_pretty(&mut writer, predictor)?,
        PredictorFormat::Bincode => bincode::serialize_into(&mut writer, predictor)?,
    }
    writer.flush()?;

    log::debug!(
        "Saved predictor with {} nodes to {}",
        predictor.n_nodes(),
        path.display()
    );
    Ok(())
}

/// Load a predictor saved by [`save_predictor`].
pub fn load_predictor<P: AsRef<Path>>(path: P) -> Result<TreePredictor> {
    let path = path.as_ref();
    let format = PredictorFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);

    let predictor: TreePredictor = match format {
        PredictorFormat::Json => serde_json::from_reader(reader)?,
        PredictorFormat::Bincode => bincode::deserialize_from(reader)?,
    };

    log::debug!(
        "Loaded predictor with {} nodes from {}",
        predictor.n_nodes(),
        path.display()
    );
    Ok(predictor)
}
