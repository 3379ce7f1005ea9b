//! Error taxonomy.
//!
//! Each collaborator gets its own `thiserror` enum, the way the original
//! crate split `AirError` / `SrsSetupError` / `VerifySchedError` across
//! modules; [`VerifierError`] aggregates them at the boundary a caller
//! actually needs (CLI `main`, or a per-sample `Result`).

use thiserror::Error;

/// Errors raised while parsing an SVM model file.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed model header: {0}")]
    Header(String),
    #[error("unrecognized kernel {0:?}")]
    UnsupportedKernel(String),
    #[error("unsupported classifier type {0:?} (only \"ovo\" is implemented)")]
    UnsupportedClassifier(String),
    #[error("expected {expected} numbers in {what}, found {got}")]
    ShortRead {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("could not parse number at token {index}: {text:?}")]
    BadNumber { index: usize, text: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing a CSV dataset file.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("malformed dataset header, expected \"# <rows> <cols>\", found {0:?}")]
    Header(String),
    #[error("row {row}: expected {expected} columns, found {got}")]
    RowShape {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("row {row}: could not parse feature {col}: {text:?}")]
    BadNumber { row: usize, col: usize, text: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing a tier file.
#[derive(Debug, Error)]
pub enum TierError {
    #[error("expected {expected} integers ({space_size} tier ids + {space_size} OH flags), found {got}")]
    ShortRead {
        expected: usize,
        space_size: usize,
        got: usize,
    },
    #[error("tier ids must be non-decreasing, but coordinate {index} has id {got} after {prev}")]
    NotMonotone { index: usize, prev: u32, got: u32 },
    #[error("could not parse integer at token {index}: {text:?}")]
    BadNumber { index: usize, text: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing a perturbation (CLI args or FROM_FILE stream).
#[derive(Debug, Error)]
pub enum PerturbationError {
    #[error("unrecognized perturbation kind {0:?}")]
    UnsupportedPerturbation(String),
    #[error("perturbation {kind} requires {expected} argument(s), got {got}")]
    MissingArgs {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("malformed bound token {0:?}, expected \"[l;u]\"")]
    BadBound(String),
    #[error("perturbation file line {line}: expected {expected} bounds, found {got}")]
    RowShape {
        line: usize,
        expected: usize,
        got: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Violation of the one-hot-tier invariant: a coordinate's initial value is
/// not exactly 0, exactly 1, or the symmetric `[0,1]`.
#[derive(Debug, Error)]
#[error("coordinate {index} in tier {tier_id} has initial value {value} (expected 0, 1, or [0,1])")]
pub struct OneHotConstraintError {
    pub index: usize,
    pub tier_id: u32,
    pub value: f64,
}

/// Failure of a directed-rounding primitive.
#[derive(Debug, Error)]
#[error("numeric error: {0}")]
pub struct NumericError(pub String);

/// Top-level error, aggregating every collaborator's error type.
///
/// `UsageError` / `ParseError` / `AllocationError` are fatal to the whole
/// run; the rest are fatal only to the sample being processed (the CLI
/// binary catches them, logs a warning, and continues).
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("usage error: {0}")]
    Usage(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Tier(#[from] TierError),
    #[error(transparent)]
    Perturbation(#[from] PerturbationError),
    #[error(transparent)]
    OneHot(#[from] OneHotConstraintError),
    #[error(transparent)]
    Numeric(#[from] NumericError),
    #[error("allocation error: {0}")]
    Allocation(String),
    #[error("internal soundness violation: {0}")]
    SoundnessViolation(String),
}
