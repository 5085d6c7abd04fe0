//! Session-authenticated variants of the dataset management pair.
//!
//! These are the publicly initiated forms: the same business content as the
//! base types plus a session credential. Hashes and equality deliberately do
//! not consider the credential or the two accumulation lists, so an
//! authenticated and a non-authenticated message with identical business
//! content compare equal.

use crate::action::ManagementAction;
use crate::dataset::{deserialize_variant, DatasetManagementMessage, DatasetManagementResponse};
use crate::error::MessageValidationError;
use crate::message::{Message, MessageEventType, SessionAuthenticated};
use crate::query::DatasetQuery;
use modex_core::{DataCategory, DataDomain, DataFormat, DataRequirement, Dict, Serializable};
use serde_json::{json, Value};
use std::hash::{Hash, Hasher};

const KEY_DATA_REQUIREMENTS: &str = "data_requirements";
const KEY_OUTPUT_FORMATS: &str = "output_formats";
const KEY_SESSION_SECRET: &str = "session_secret";

// ============================================================================
// MESSAGE
// ============================================================================

/// Session-authenticated extension of `DatasetManagementMessage`.
///
/// The requirement and output-format lists default to empty and are
/// append-only after construction (e.g. while accumulating implied
/// requirements). Single-writer discipline is assumed; concurrent mutation of
/// one instance is the caller's problem to serialize.
#[derive(Debug, Clone)]
pub struct MaasDatasetManagementMessage {
    message: DatasetManagementMessage,
    session_secret: String,
    data_requirements: Vec<DataRequirement>,
    output_formats: Vec<DataFormat>,
}

impl MaasDatasetManagementMessage {
    /// Construct directly from message fields plus the session credential,
    /// under the same action requirements as the base type.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_secret: impl Into<String>,
        action: ManagementAction,
        dataset_name: Option<String>,
        read_only: bool,
        category: Option<DataCategory>,
        domain: Option<DataDomain>,
        data_location: Option<String>,
        pending_data: bool,
        query: Option<DatasetQuery>,
    ) -> Result<Self, MessageValidationError> {
        let message = DatasetManagementMessage::new(
            action,
            dataset_name,
            read_only,
            category,
            domain,
            data_location,
            pending_data,
            query,
        )?;
        Ok(Self::factory_create(message, session_secret))
    }

    /// Lift an already validated base message into the authenticated variant.
    pub fn factory_create(
        message: DatasetManagementMessage,
        session_secret: impl Into<String>,
    ) -> Self {
        Self {
            message,
            session_secret: session_secret.into(),
            data_requirements: Vec::new(),
            output_formats: Vec::new(),
        }
    }

    /// The underlying business-content message.
    pub fn message(&self) -> &DatasetManagementMessage {
        &self.message
    }

    pub fn action(&self) -> ManagementAction {
        self.message.action()
    }

    pub fn dataset_name(&self) -> Option<&str> {
        self.message.dataset_name()
    }

    /// All explicit and implied data requirements accumulated for this
    /// request. Defaults to empty.
    pub fn data_requirements(&self) -> &[DataRequirement] {
        &self.data_requirements
    }

    /// Append access to the requirement list.
    pub fn data_requirements_mut(&mut self) -> &mut Vec<DataRequirement> {
        &mut self.data_requirements
    }

    /// Formats of each required output dataset for the requested task.
    /// Defaults to empty.
    pub fn output_formats(&self) -> &[DataFormat] {
        &self.output_formats
    }

    /// Append access to the output-format list.
    pub fn output_formats_mut(&mut self) -> &mut Vec<DataFormat> {
        &mut self.output_formats
    }
}

impl SessionAuthenticated for MaasDatasetManagementMessage {
    fn session_secret(&self) -> &str {
        &self.session_secret
    }
}

// Equality and hash cover business content only; the credential and the two
// lists are excluded, including across the base/authenticated type boundary.
impl PartialEq for MaasDatasetManagementMessage {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

impl Eq for MaasDatasetManagementMessage {}

impl PartialEq<DatasetManagementMessage> for MaasDatasetManagementMessage {
    fn eq(&self, other: &DatasetManagementMessage) -> bool {
        &self.message == other
    }
}

impl PartialEq<MaasDatasetManagementMessage> for DatasetManagementMessage {
    fn eq(&self, other: &MaasDatasetManagementMessage) -> bool {
        self == &other.message
    }
}

impl Hash for MaasDatasetManagementMessage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message.hash(state);
    }
}

impl Serializable for MaasDatasetManagementMessage {
    fn to_dict(&self) -> Dict {
        let mut serial = self.message.to_dict();
        serial.insert(KEY_SESSION_SECRET.to_string(), json!(self.session_secret));
        if !self.data_requirements.is_empty() {
            let requirements: Vec<Value> = self
                .data_requirements
                .iter()
                .map(|r| Value::Object(r.to_dict()))
                .collect();
            serial.insert(KEY_DATA_REQUIREMENTS.to_string(), Value::Array(requirements));
        }
        if !self.output_formats.is_empty() {
            let formats: Vec<Value> = self
                .output_formats
                .iter()
                .map(|f| json!(f.name()))
                .collect();
            serial.insert(KEY_OUTPUT_FORMATS.to_string(), Value::Array(formats));
        }
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        // The secret rides the extras side-channel so the shared base routine
        // can thread it through without understanding it. A payload missing
        // the key fails here even though the base type would accept it.
        let secret = match obj.get(KEY_SESSION_SECRET) {
            Some(value) => value.clone(),
            None => {
                tracing::debug!("rejecting session-authenticated message without session_secret");
                return None;
            }
        };
        let mut extras = Dict::new();
        extras.insert(KEY_SESSION_SECRET.to_string(), secret);

        let mut message = deserialize_variant(obj, &extras, |base, extras| {
            let secret = extras.get(KEY_SESSION_SECRET)?.as_str()?;
            Some(Self::factory_create(base, secret))
        })?;

        if let Some(entries) = obj.get(KEY_DATA_REQUIREMENTS) {
            for entry in entries.as_array()? {
                message
                    .data_requirements
                    .push(DataRequirement::from_dict(entry.as_object()?)?);
            }
        }
        if let Some(entries) = obj.get(KEY_OUTPUT_FORMATS) {
            for entry in entries.as_array()? {
                message
                    .output_formats
                    .push(DataFormat::get_for_name(entry.as_str()?)?);
            }
        }
        Some(message)
    }
}

impl Message for MaasDatasetManagementMessage {
    fn event_type(&self) -> MessageEventType {
        MessageEventType::DatasetManagement
    }
}

// ============================================================================
// RESPONSE
// ============================================================================

/// Analog of `DatasetManagementResponse` for the session-authenticated
/// message type.
#[derive(Debug, Clone, PartialEq)]
pub struct MaasDatasetManagementResponse {
    inner: DatasetManagementResponse,
}

impl MaasDatasetManagementResponse {
    /// Create an instance from the non-session response, converting through
    /// the wire representation.
    pub fn factory_create(response: &DatasetManagementResponse) -> Option<Self> {
        Self::from_dict(&response.to_dict())
    }

    pub fn inner(&self) -> &DatasetManagementResponse {
        &self.inner
    }

    pub fn action(&self) -> ManagementAction {
        self.inner.action()
    }

    pub fn is_awaiting(&self) -> bool {
        self.inner.is_awaiting()
    }

    pub fn data_id(&self) -> Option<&str> {
        self.inner.data_id()
    }

    pub fn dataset_name(&self) -> Option<&str> {
        self.inner.dataset_name()
    }
}

impl From<DatasetManagementResponse> for MaasDatasetManagementResponse {
    fn from(inner: DatasetManagementResponse) -> Self {
        Self { inner }
    }
}

impl Serializable for MaasDatasetManagementResponse {
    fn to_dict(&self) -> Dict {
        self.inner.to_dict()
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        DatasetManagementResponse::from_dict(obj).map(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryType;
    use std::collections::hash_map::DefaultHasher;

    fn make_base_message() -> DatasetManagementMessage {
        DatasetManagementMessage::new(
            ManagementAction::Query,
            Some("aorc-jan-2022".to_string()),
            true,
            None,
            None,
            None,
            false,
            Some(DatasetQuery::new(QueryType::GetValues)),
        )
        .unwrap()
    }

    fn make_requirement() -> DataRequirement {
        let domain = DataDomain::new(DataFormat::NgenOutput, Vec::new(), Vec::new());
        DataRequirement::new(domain, true, DataCategory::Forcing)
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equality_ignores_session_layer() {
        let base = make_base_message();
        let mut a = MaasDatasetManagementMessage::factory_create(base.clone(), "secret-1");
        let b = MaasDatasetManagementMessage::factory_create(base.clone(), "secret-2");
        a.data_requirements_mut().push(make_requirement());
        a.output_formats_mut().push(DataFormat::NgenOutput);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a, base);
        assert_eq!(base, a);
        assert_eq!(hash_of(&a), hash_of(&base));
    }

    #[test]
    fn test_wire_roundtrip_with_lists() {
        let mut message =
            MaasDatasetManagementMessage::factory_create(make_base_message(), "secret-abc");
        message.data_requirements_mut().push(make_requirement());
        message.output_formats_mut().push(DataFormat::NgenOutput);

        let restored = MaasDatasetManagementMessage::from_dict(&message.to_dict()).unwrap();
        assert_eq!(restored.session_secret(), "secret-abc");
        assert_eq!(restored.data_requirements(), message.data_requirements());
        assert_eq!(restored.output_formats(), message.output_formats());
        assert_eq!(restored, message);
    }

    #[test]
    fn test_empty_lists_not_serialized() {
        let message = MaasDatasetManagementMessage::factory_create(make_base_message(), "s");
        let serial = message.to_dict();
        assert!(!serial.contains_key("data_requirements"));
        assert!(!serial.contains_key("output_formats"));
    }

    #[test]
    fn test_missing_secret_fails_only_authenticated_type() {
        let serial = make_base_message().to_dict();
        // The base type accepts this payload; the authenticated type must not.
        assert!(DatasetManagementMessage::from_dict(&serial).is_some());
        assert!(MaasDatasetManagementMessage::from_dict(&serial).is_none());
    }

    #[test]
    fn test_bad_requirement_entry_rejects_whole_message() {
        let mut message =
            MaasDatasetManagementMessage::factory_create(make_base_message(), "secret");
        message.data_requirements_mut().push(make_requirement());
        let mut serial = message.to_dict();
        serial.insert("data_requirements".to_string(), json!([{"bogus": true}]));
        assert!(MaasDatasetManagementMessage::from_dict(&serial).is_none());
    }

    #[test]
    fn test_response_factory_create() {
        let base = DatasetManagementResponse::new(
            true,
            "Query Complete",
            Some(ManagementAction::Query),
            false,
            Some("data-1".to_string()),
            Some("aorc-jan-2022".to_string()),
            None,
        )
        .unwrap();
        let maas = MaasDatasetManagementResponse::factory_create(&base).unwrap();
        assert_eq!(maas.action(), ManagementAction::Query);
        assert_eq!(maas.data_id(), Some("data-1"));
        assert_eq!(maas.to_dict(), base.to_dict());
    }
}
