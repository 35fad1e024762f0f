//! triagedesk-common: Shared types and errors used across all Triagedesk crates.

pub mod error;
pub mod patient;
pub mod verdict;
pub mod profile;
pub mod confidence;

// Re-export commonly used types
pub use error::{Result, TriageError};
pub use patient::{IntakeRequest, PatientId, PatientRecord, RawVitals, Vitals};
pub use profile::Profile;
pub use verdict::{Tier, TriageVerdict, VerdictSource};
