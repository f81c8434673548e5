use crate::species::PidSpecies;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Unsupported PID species for TPC post-calibration: {0}")]
    UnsupportedSpecies(PidSpecies),

    #[error("Track cuts ({track_cuts}) and pair cuts ({pair_cuts}) must have the same length")]
    CutCardinality { track_cuts: usize, pair_cuts: usize },

    #[error("Calibration Fetch Error: {0}")]
    CalibrationFetch(String),

    #[error("Inference Error: {0}")]
    Inference(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),
}

pub type TrResult<T> = Result<T, TriggerError>;
