//! Generic message and response envelope contracts.
//!
//! Every concrete message family in this crate builds on these: an event-type
//! tag identifying the family, the `Message` trait over the shared
//! serialization contract, and the response envelope that concrete responses
//! compose instead of inheriting.

use modex_core::{Dict, Serializable};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

// ============================================================================
// EVENT TYPE TAG
// ============================================================================

/// Tag identifying which message family a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageEventType {
    DatasetManagement,
    EvaluationRequest,
    /// Placeholder for messages whose family could not be determined.
    Invalid,
}

impl MessageEventType {
    /// Wire name for this event type.
    pub fn name(&self) -> &'static str {
        match self {
            MessageEventType::DatasetManagement => "DATASET_MANAGEMENT",
            MessageEventType::EvaluationRequest => "EVALUATION_REQUEST",
            MessageEventType::Invalid => "INVALID",
        }
    }

    /// Resolve an event type from its wire name, ignoring case. Unknown names
    /// resolve to `Invalid`.
    pub fn get_for_name(name_str: &str) -> Self {
        let cleaned = name_str.trim().to_uppercase();
        [
            MessageEventType::DatasetManagement,
            MessageEventType::EvaluationRequest,
        ]
        .into_iter()
        .find(|t| t.name() == cleaned)
        .unwrap_or(MessageEventType::Invalid)
    }
}

impl fmt::Display for MessageEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// MESSAGE TRAITS
// ============================================================================

/// A message exchanged with a modex service.
pub trait Message: Serializable {
    /// The event-type tag for this message's family.
    fn event_type(&self) -> MessageEventType;
}

/// A message carrying a session credential from an externally initiated
/// (session-authenticated) dialog.
pub trait SessionAuthenticated {
    fn session_secret(&self) -> &str;
}

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

/// Generic response scaffolding composed by every concrete response type.
///
/// Carries the outcome flag, a short reason tag, an optional longer message,
/// and the response payload the concrete type exposes typed accessors over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub reason: String,
    pub message: String,
    pub data: Dict,
}

impl ResponseEnvelope {
    pub fn new(success: bool, reason: impl Into<String>, data: Dict) -> Self {
        Self {
            success,
            reason: reason.into(),
            message: String::new(),
            data,
        }
    }
}

impl Serializable for ResponseEnvelope {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert("success".to_string(), json!(self.success));
        serial.insert("reason".to_string(), json!(self.reason));
        serial.insert("message".to_string(), json!(self.message));
        serial.insert("data".to_string(), serde_json::Value::Object(self.data.clone()));
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        let success = obj.get("success")?.as_bool()?;
        let reason = obj.get("reason")?.as_str()?.to_string();
        let message = match obj.get("message") {
            Some(v) => v.as_str()?.to_string(),
            None => String::new(),
        };
        let data = match obj.get("data") {
            Some(v) => v.as_object()?.clone(),
            None => Dict::new(),
        };
        Some(Self {
            success,
            reason,
            message,
            data,
        })
    }
}
