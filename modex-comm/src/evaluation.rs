//! Requests forwarded to the evaluation orchestration service.
//!
//! A sibling family to the dataset messages, addressed by free-form action
//! strings rather than the closed action catalog. Each request type owns a
//! fixed action string and a factory that only accepts input declaring that
//! exact string; mismatches yield `None` rather than being forwarded to a
//! different subtype.

use crate::message::{Message, MessageEventType, ResponseEnvelope};
use modex_core::{Dict, Serializable};
use serde_json::{json, Value};

const KEY_ACTION: &str = "action";
const KEY_ACTION_PARAMETERS: &str = "action_parameters";
const KEY_INSTRUCTIONS: &str = "instructions";
const KEY_EVALUATION_NAME: &str = "evaluation_name";

/// A request addressed to the evaluation service.
pub trait EvaluationRequest: Message {
    /// Fixed action string labeling this request type on the wire.
    const ACTION: &'static str;

    fn action(&self) -> &'static str {
        Self::ACTION
    }
}

/// Extract the parameter map of an evaluation request: either the nested
/// `action_parameters` object or, failing that, the flat top-level keys
/// minus the action discriminator.
fn extract_parameters(obj: &Dict) -> Option<Dict> {
    match obj.get(KEY_ACTION_PARAMETERS) {
        Some(nested) => Some(nested.as_object()?.clone()),
        None => {
            let mut parameters = obj.clone();
            parameters.remove(KEY_ACTION);
            Some(parameters)
        }
    }
}

// ============================================================================
// CONNECT
// ============================================================================

/// Request used to communicate through a chained connection to the
/// evaluation service. Carries an arbitrary mapping of named parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationConnectionRequest {
    parameters: Dict,
}

impl EvaluationConnectionRequest {
    pub fn new(parameters: Dict) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &Dict {
        &self.parameters
    }
}

impl EvaluationRequest for EvaluationConnectionRequest {
    const ACTION: &'static str = "connect";
}

impl Serializable for EvaluationConnectionRequest {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert(KEY_ACTION.to_string(), json!(Self::ACTION));
        if !self.parameters.is_empty() {
            serial.insert(
                KEY_ACTION_PARAMETERS.to_string(),
                Value::Object(self.parameters.clone()),
            );
        }
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        if obj.get(KEY_ACTION)?.as_str()? != Self::ACTION {
            return None;
        }
        Some(Self::new(extract_parameters(obj)?))
    }
}

impl Message for EvaluationConnectionRequest {
    fn event_type(&self) -> MessageEventType {
        MessageEventType::EvaluationRequest
    }
}

// ============================================================================
// LAUNCH
// ============================================================================

/// Request to start a named evaluation.
///
/// `instructions` may arrive as a plain string or as a structured JSON
/// document; documents are normalized to a pretty-printed string at
/// construction. Extra parameters beyond the two mandatory fields are
/// preserved and re-emitted on serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct StartEvaluationRequest {
    instructions: String,
    evaluation_name: String,
    parameters: Dict,
}

impl StartEvaluationRequest {
    /// Construct from an instructions value (string or object), a non-empty
    /// evaluation name, and free-form extra parameters. Returns `None` when
    /// either mandatory field is absent, empty, or of the wrong shape.
    pub fn new(
        instructions: &Value,
        evaluation_name: impl Into<String>,
        parameters: Dict,
    ) -> Option<Self> {
        let evaluation_name = evaluation_name.into();
        if evaluation_name.is_empty() {
            return None;
        }
        let instructions = match instructions {
            Value::String(text) if !text.is_empty() => text.clone(),
            Value::Object(doc) if !doc.is_empty() => {
                serde_json::to_string_pretty(doc).ok()?
            }
            _ => return None,
        };
        let mut parameters = parameters;
        parameters.remove(KEY_INSTRUCTIONS);
        parameters.remove(KEY_EVALUATION_NAME);
        Some(Self {
            instructions,
            evaluation_name,
            parameters,
        })
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn evaluation_name(&self) -> &str {
        &self.evaluation_name
    }

    pub fn parameters(&self) -> &Dict {
        &self.parameters
    }
}

impl EvaluationRequest for StartEvaluationRequest {
    const ACTION: &'static str = "launch";
}

impl Serializable for StartEvaluationRequest {
    fn to_dict(&self) -> Dict {
        let mut action_parameters = self.parameters.clone();
        action_parameters.insert(
            KEY_EVALUATION_NAME.to_string(),
            json!(self.evaluation_name),
        );
        action_parameters.insert(KEY_INSTRUCTIONS.to_string(), json!(self.instructions));

        let mut serial = Dict::new();
        serial.insert(KEY_ACTION.to_string(), json!(Self::ACTION));
        serial.insert(
            KEY_ACTION_PARAMETERS.to_string(),
            Value::Object(action_parameters),
        );
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        // A differing declared action is someone else's input; an absent one
        // is tolerated for this type.
        if let Some(declared) = obj.get(KEY_ACTION) {
            if declared.as_str() != Some(Self::ACTION) {
                return None;
            }
        }
        let parameters = extract_parameters(obj)?;
        let instructions = parameters.get(KEY_INSTRUCTIONS)?.clone();
        let evaluation_name = parameters.get(KEY_EVALUATION_NAME)?.as_str()?.to_string();
        Self::new(&instructions, evaluation_name, parameters)
    }
}

impl Message for StartEvaluationRequest {
    fn event_type(&self) -> MessageEventType {
        MessageEventType::EvaluationRequest
    }
}

// ============================================================================
// SAVE / FIND
// ============================================================================

/// Request to save an evaluation definition for later use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaveEvaluationRequest {
    parameters: Dict,
}

impl SaveEvaluationRequest {
    pub fn new(parameters: Dict) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &Dict {
        &self.parameters
    }
}

impl EvaluationRequest for SaveEvaluationRequest {
    const ACTION: &'static str = "save";
}

impl Serializable for SaveEvaluationRequest {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert(KEY_ACTION.to_string(), json!(Self::ACTION));
        if !self.parameters.is_empty() {
            serial.insert(
                KEY_ACTION_PARAMETERS.to_string(),
                Value::Object(self.parameters.clone()),
            );
        }
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        if obj.get(KEY_ACTION)?.as_str()? != Self::ACTION {
            return None;
        }
        Some(Self::new(extract_parameters(obj)?))
    }
}

impl Message for SaveEvaluationRequest {
    fn event_type(&self) -> MessageEventType {
        MessageEventType::EvaluationRequest
    }
}

/// Request to locate previously saved or executed evaluations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindEvaluationRequest {
    parameters: Dict,
}

impl FindEvaluationRequest {
    pub fn new(parameters: Dict) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &Dict {
        &self.parameters
    }
}

impl EvaluationRequest for FindEvaluationRequest {
    const ACTION: &'static str = "find";
}

impl Serializable for FindEvaluationRequest {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert(KEY_ACTION.to_string(), json!(Self::ACTION));
        if !self.parameters.is_empty() {
            serial.insert(
                KEY_ACTION_PARAMETERS.to_string(),
                Value::Object(self.parameters.clone()),
            );
        }
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        if obj.get(KEY_ACTION)?.as_str()? != Self::ACTION {
            return None;
        }
        Some(Self::new(extract_parameters(obj)?))
    }
}

impl Message for FindEvaluationRequest {
    fn event_type(&self) -> MessageEventType {
        MessageEventType::EvaluationRequest
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

macro_rules! evaluation_response {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(pub ResponseEnvelope);

        impl Serializable for $name {
            fn to_dict(&self) -> Dict {
                self.0.to_dict()
            }

            fn from_dict(obj: &Dict) -> Option<Self> {
                ResponseEnvelope::from_dict(obj).map(Self)
            }
        }
    };
}

evaluation_response!(
    /// Response to an `EvaluationConnectionRequest`.
    EvaluationConnectionRequestResponse
);
evaluation_response!(
    /// Response to a `StartEvaluationRequest`.
    StartEvaluationResponse
);
evaluation_response!(
    /// Response to a `SaveEvaluationRequest`.
    SaveEvaluationResponse
);
evaluation_response!(
    /// Response to a `FindEvaluationRequest`.
    FindEvaluationResponse
);
