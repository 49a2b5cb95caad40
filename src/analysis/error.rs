//! Error taxonomy for analysis runs.

use thiserror::Error;

use crate::document::UnsupportedFormatError;
use crate::gateway::AllProvidersExhausted;

use super::Stage;

/// A provider returned syntactically or semantically invalid stage content.
///
/// Fatal: the transport succeeded, so retrying the same prompt against the
/// same response shape is futile without prompt or provider changes.
#[derive(Debug, Clone, Error)]
#[error("{stage} stage returned invalid content: {message}")]
pub struct StageParseError {
    pub stage: Stage,
    pub message: String,
}

impl StageParseError {
    pub(crate) fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Any failure that aborts an analysis run.
///
/// The caller receives success or one of these; never a partial report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Every provider failed for one stage call.
    #[error(transparent)]
    Providers(#[from] AllProvidersExhausted),

    /// A stage response could not be parsed into its expected shape.
    #[error(transparent)]
    Parse(#[from] StageParseError),

    /// The extraction collaborator rejected the input file; passed through
    /// unchanged.
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),
}
