//! Triage engine behind the MindCare support companion.
//!
//! Free text is routed to a response category by ordered keyword rules, with crisis
//! language always taking precedence, and questionnaire answers are scored into severity
//! bands. Both engines are pure; chat and assessment progress live in caller-owned
//! sessions that the [`triage::SupportService`] stores through a repository seam.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod triage;
