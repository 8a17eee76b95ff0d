//! Log setup and license audit events.
//!
//! Issuance and verification outcomes are logged as structured events inside
//! a `license_event` span so they can be filtered and retained for audit.
//! Rejections carry the error kind only; the token itself is never logged.

use std::str::FromStr;

use tracing::{error, info, info_span, warn, Level};

use crate::config::LoggingConfig;
use crate::errors::LicenseError;

/// License lifecycle event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseEvent {
    /// A token was signed
    Issued,
    /// A presented token verified
    Verified,
    /// A presented token was rejected
    Rejected,
    /// Issuance was refused before signing
    IssueFailed,
}

impl std::fmt::Display for LicenseEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LicenseEvent::Issued => "issued",
            LicenseEvent::Verified => "verified",
            LicenseEvent::Rejected => "rejected",
            LicenseEvent::IssueFailed => "issue_failed",
        };
        write!(f, "{}", s)
    }
}

/// Log a license event.
///
/// # Arguments
///
/// * `event` - The type of license event
/// * `subject` - The subject the event concerns, when known
/// * `details` - Optional additional details about the event
pub fn log_license_event(event: LicenseEvent, subject: Option<&str>, details: Option<&str>) {
    let span = info_span!(
        "license_event",
        event = %event,
        subject = subject.unwrap_or("-"),
    );
    let _enter = span.enter();

    match event {
        LicenseEvent::Rejected | LicenseEvent::IssueFailed => {
            if let Some(d) = details {
                warn!(reason = %d, "License event occurred");
            } else {
                warn!("License event occurred");
            }
        }
        _ => {
            if let Some(d) = details {
                info!(details = %d, "License event occurred");
            } else {
                info!("License event occurred");
            }
        }
    }
}

/// Log a failed verification.
///
/// Token failures are audit events with the failure kind as the reason.
/// Anything else is a fault on this side and is logged as an error.
pub fn log_rejection(err: &LicenseError) {
    if err.is_rejection() {
        log_license_event(LicenseEvent::Rejected, None, Some(err.kind()));
    } else {
        error!(kind = err.kind(), error = %err, "License verification failed");
    }
}

/// Install the global fmt subscriber according to `config`.
///
/// Logs go to stderr. Does nothing when logging is disabled or a subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }

    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
