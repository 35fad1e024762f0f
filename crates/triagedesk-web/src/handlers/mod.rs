pub mod health;
pub mod queue;
pub mod patients;
pub mod prompt;
pub mod triage;
