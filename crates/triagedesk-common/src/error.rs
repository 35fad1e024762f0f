use thiserror::Error;

use crate::patient::PatientId;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(PatientId),

    #[error("Duplicate patient id: {0}")]
    DuplicatePatient(PatientId),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
