//! Security audit logging
//!
//! Structured audit events for logins, rejected sessions, access-control
//! denials and record creation. All events are logged at INFO level with
//! the "audit" target so they can be routed separately from application
//! logs.
//!
//! # Example
//!
//! ```ignore
//! use gradebook_api::audit::{audit_log, AuditEvent};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     user_id: 3,
//!     role: Role::Student,
//!     ip_address: Some("192.168.1.1".to_string()),
//!     user_agent: None,
//! });
//! ```
//!
//! Author: hephaex@gmail.com

use axum::http::HeaderMap;
use chrono::Utc;
use gradebook_core::{RecordId, Role};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Security audit events
///
/// Events never carry passwords, hashes or token material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful login
    LoginSuccess {
        user_id: RecordId,
        role: Role,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Failed login attempt
    LoginFailure {
        email: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Missing, malformed, invalid or expired session token
    InvalidToken {
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Authenticated user lacking the role for an operation
    AccessDenied {
        user_id: RecordId,
        role: Role,
        operation: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Course, enrollment or grade written
    RecordCreated {
        actor_id: RecordId,
        record_type: String,
        record_id: RecordId,
    },
}

impl AuditEvent {
    fn summary(&self) -> &'static str {
        match self {
            AuditEvent::LoginSuccess { .. } => "Login successful",
            AuditEvent::LoginFailure { .. } => "Login failed",
            AuditEvent::InvalidToken { .. } => "Invalid session token",
            AuditEvent::AccessDenied { .. } => "Access denied",
            AuditEvent::RecordCreated { .. } => "Record created",
        }
    }
}

/// Log a security audit event with structured fields
///
/// The event is serialized to JSON for log aggregators, e.g.
///
/// ```json
/// {"event_type":"access_denied","user_id":3,"role":"student","operation":"create_course", ...}
/// ```
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::LoginSuccess {
            user_id,
            role,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                role = %role,
                ip_address = ?ip_address,
                "{}", event.summary()
            );
        }
        AuditEvent::LoginFailure {
            email,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                email = %email,
                reason = %reason,
                ip_address = ?ip_address,
                "{}", event.summary()
            );
        }
        AuditEvent::InvalidToken {
            reason, ip_address, ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                reason = %reason,
                ip_address = ?ip_address,
                "{}", event.summary()
            );
        }
        AuditEvent::AccessDenied {
            user_id,
            role,
            operation,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                role = %role,
                operation = %operation,
                ip_address = ?ip_address,
                "{}", event.summary()
            );
        }
        AuditEvent::RecordCreated {
            actor_id,
            record_type,
            record_id,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                actor_id = %actor_id,
                record_type = %record_type,
                record_id = %record_id,
                "{}", event.summary()
            );
        }
    }
}

/// Client metadata attached to audit events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// Extract the client IP address from proxy headers
///
/// Prefers the first entry of `X-Forwarded-For`, then `X-Real-IP`.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract the user agent string
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
