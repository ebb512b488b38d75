use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("no fields found in the rule template")]
    EmptySchema,
}

/// Reasons a run refuses to start. Nothing is processed when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("no fields found in the rule template")]
    EmptySchema,
    #[error("api key is missing")]
    MissingCredential,
    #[error("input and output files must both be set")]
    MissingPaths,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("cannot read input table: {0}")]
    UnreadableInput(String),
    #[error("output file {0} is open in another program; close it first")]
    WriteLocked(String),
    #[error("cannot write output: {0}")]
    OutputUnwritable(String),
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error("failed to start worker runtime: {0}")]
    Runtime(String),
}

impl From<SchemaError> for StartError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::EmptySchema => StartError::EmptySchema,
        }
    }
}
