use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage an error surfaced in. Attached by the training loop and the
/// app layer so a failure report names where the run died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Forward,
    Backprop,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Forward => "forward",
            Stage::Backprop => "backprop",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("shape mismatch in {op}: {}x{} vs {}x{}", .left.0, .left.1, .right.0, .right.1)]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot load dataset from {}: {reason}", .path.display())]
    DataLoad { path: PathBuf, reason: String },

    #[error("cannot load weights from {}: {reason}", .path.display())]
    WeightLoad { path: PathBuf, reason: String },

    #[error("label {0} is outside 0..=9")]
    InvalidLabel(usize),

    #[error("row {row}: {reason}")]
    InvalidObservation { row: usize, reason: String },

    #[error("dataset contains no observations")]
    EmptyDataset,

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Tags the error with the stage it came from. Already-tagged errors keep
    /// their innermost stage.
    pub fn at(self, stage: Stage) -> Error {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage { stage, source: Box::new(other) },
        }
    }

    /// Stage this error was tagged with, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
