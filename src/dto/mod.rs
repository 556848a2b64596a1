use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Admin request and response bodies.
pub mod admin;
/// Health check payload.
pub mod health;
/// Public showcase status.
pub mod phase;
/// Read-only public responses.
pub mod public;
/// SSE event payloads.
pub mod sse;
/// Validation helpers for admin DTOs.
pub mod validation;
/// Winners socket messages.
pub mod ws;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Current wall-clock time as RFC 3339.
pub fn now_rfc3339() -> String {
    format_system_time(SystemTime::now())
}
