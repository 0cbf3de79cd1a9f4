use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or comparing tracker results.
#[derive(Error, Debug)]
pub enum Error {
    #[error("result file not found: {}", .0.display())]
    MissingResultFile(PathBuf),

    #[error("malformed result in {}: {reason}", .path.display())]
    MalformedResult { path: PathBuf, reason: String },

    #[error("unsupported result format in {}: {reason}", .path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("series lengths differ: baseline has {baseline}, experimental has {experimental}")]
    LengthMismatch { baseline: usize, experimental: usize },

    #[error("ground truth has {ground_truth} frames but the tracker reported {tracked}")]
    GroundTruthMismatch { ground_truth: usize, tracked: usize },

    #[error("key '{0}' is present in the baseline but missing from the experimental results")]
    MissingKey(String),

    #[error("cannot summarize an empty series")]
    EmptySeries,

    #[error("tracker '{0}' does not appear in the results")]
    UnknownTracker(String),

    #[error("no configuration file found in {} (looked for {candidates})", .dir.display())]
    ConfigNotFound { dir: PathBuf, candidates: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for flatfoot operations
pub type Result<T> = std::result::Result<T, Error>;
