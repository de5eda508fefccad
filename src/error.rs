use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All recoverable failure conditions surfaced by this crate.
///
/// Every variant is a local, catchable condition reported to the caller;
/// nothing in the core terminates the process or hands back a sentinel
/// value that later arithmetic could dereference.
#[derive(Error, Debug)]
pub enum Error {
    /// A matrix operation was invoked with incompatible shapes.
    #[error("dimension mismatch in {op}: left is {left_rows}x{left_cols}, right is {right_rows}x{right_cols}")]
    DimensionMismatch {
        op: &'static str,
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    /// A network was built with inconsistent layer/activation counts.
    #[error("invalid network configuration: {0}")]
    Configuration(String),

    /// A persisted matrix file has a malformed header or wrong token count.
    #[error("malformed matrix text: {0}")]
    Format(String),

    /// A reloaded weight/bias collection is missing or internally inconsistent.
    #[error("persisted network is unusable: {0}")]
    Persistence(String),

    /// The training loop was run without a dataset.
    #[error("no training data: the trainer has no dataset or the dataset is empty")]
    NoTrainingData,

    /// Underlying filesystem error during save/load.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON snapshot could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
