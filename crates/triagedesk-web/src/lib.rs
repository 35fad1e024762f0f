//! triagedesk-web: Reception desk service for Triagedesk.
//! Provides:
//!   - Patient intake, re-triage, mark-as-seen and profile reassignment
//!   - Ordered queue view with wait-time escalation
//!   - Live queue events over SSE
//!   - The LLM-backed classification endpoint (POST /triage)

pub mod config;
pub mod desk;
pub mod error;
pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
pub mod ticker;
