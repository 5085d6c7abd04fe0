//! Dataset management request/response pair.
//!
//! `DatasetManagementMessage` is the request envelope for every dataset
//! action; which of its fields are mandatory depends on the action's
//! capability flags, enforced at construction so no partially valid instance
//! is ever observable. Wire-facing deserialization is total: malformed input
//! yields `None`, never an error.

use crate::action::ManagementAction;
use crate::error::{MessageValidationError, ResponseValidationError};
use crate::message::{Message, MessageEventType, ResponseEnvelope};
use crate::query::DatasetQuery;
use modex_core::{DataCategory, DataDomain, Dict, Serializable};
use serde_json::{json, Value};

pub(crate) const KEY_ACTION: &str = "action";
pub(crate) const KEY_CATEGORY: &str = "category";
pub(crate) const KEY_DATA_DOMAIN: &str = "data_domain";
pub(crate) const KEY_DATA_LOCATION: &str = "data_location";
pub(crate) const KEY_DATASET_NAME: &str = "dataset_name";
pub(crate) const KEY_PENDING_DATA: &str = "pending_data";
pub(crate) const KEY_QUERY: &str = "query";
pub(crate) const KEY_READ_ONLY: &str = "read_only";

const DATA_KEY_DATA_ID: &str = "data_id";
const DATA_KEY_ITEM_NAME: &str = "item_name";
const DATA_KEY_QUERY_RESULTS: &str = "query_results";
const DATA_KEY_IS_AWAITING: &str = "is_awaiting";

// ============================================================================
// MESSAGE
// ============================================================================

/// Message initiating an action related to dataset management.
///
/// Immutable after construction. Equality and hashing cover all business
/// fields; session-layer additions in the authenticated variant are
/// deliberately excluded (see `MaasDatasetManagementMessage`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetManagementMessage {
    action: ManagementAction,
    dataset_name: Option<String>,
    read_only: bool,
    category: Option<DataCategory>,
    domain: Option<DataDomain>,
    data_location: Option<String>,
    pending_data: bool,
    query: Option<DatasetQuery>,
}

impl DatasetManagementMessage {
    /// Construct a message, enforcing the action's field requirements.
    ///
    /// Each unmet requirement fails with its own variant so callers can tell
    /// which one was violated. No other field combination is rejected: a
    /// query may accompany any action, not only `Query`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        action: ManagementAction,
        dataset_name: Option<String>,
        read_only: bool,
        category: Option<DataCategory>,
        domain: Option<DataDomain>,
        data_location: Option<String>,
        pending_data: bool,
        query: Option<DatasetQuery>,
    ) -> Result<Self, MessageValidationError> {
        if dataset_name.is_none() && action.requires_dataset_name() {
            return Err(MessageValidationError::MissingDatasetName { action });
        }
        if category.is_none() && action.requires_data_category() {
            return Err(MessageValidationError::MissingDataCategory { action });
        }
        if domain.is_none() && action.requires_data_domain() {
            return Err(MessageValidationError::MissingDataDomain { action });
        }
        Ok(Self {
            action,
            dataset_name,
            read_only,
            category,
            domain,
            data_location,
            pending_data,
            query,
        })
    }

    /// The action this message embodies or requests.
    pub fn action(&self) -> ManagementAction {
        self.action
    }

    /// The name of the involved dataset, if applicable.
    pub fn dataset_name(&self) -> Option<&str> {
        self.dataset_name.as_deref()
    }

    /// Whether the dataset involved is, should be, or must be (depending on
    /// action) read-only.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The category of the involved data, if applicable.
    pub fn data_category(&self) -> Option<DataCategory> {
        self.category
    }

    /// The domain of the involved data, if applicable.
    pub fn data_domain(&self) -> Option<&DataDomain> {
        self.domain.as_ref()
    }

    /// Location/file/object for acted-upon data, if any.
    pub fn data_location(&self) -> Option<&str> {
        self.data_location.as_deref()
    }

    /// Whether the sender has data pending transmission after this message.
    /// Typically set during `Create` when there is already data to add to the
    /// newly created dataset.
    pub fn is_pending_data(&self) -> bool {
        self.pending_data
    }

    pub fn query(&self) -> Option<&DatasetQuery> {
        self.query.as_ref()
    }
}

impl Serializable for DatasetManagementMessage {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert(KEY_ACTION.to_string(), json!(self.action.name()));
        serial.insert(KEY_READ_ONLY.to_string(), json!(self.read_only));
        serial.insert(KEY_PENDING_DATA.to_string(), json!(self.pending_data));
        if let Some(name) = &self.dataset_name {
            serial.insert(KEY_DATASET_NAME.to_string(), json!(name));
        }
        if let Some(category) = self.category {
            serial.insert(KEY_CATEGORY.to_string(), json!(category.name()));
        }
        if let Some(location) = &self.data_location {
            serial.insert(KEY_DATA_LOCATION.to_string(), json!(location));
        }
        if let Some(domain) = &self.domain {
            serial.insert(KEY_DATA_DOMAIN.to_string(), Value::Object(domain.to_dict()));
        }
        if let Some(query) = &self.query {
            serial.insert(KEY_QUERY.to_string(), Value::Object(query.to_dict()));
        }
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        deserialize_variant(obj, &Dict::new(), |base, _extras| Some(base))
    }
}

impl Message for DatasetManagementMessage {
    fn event_type(&self) -> MessageEventType {
        MessageEventType::DatasetManagement
    }
}

// ============================================================================
// SHARED DESERIALIZATION ROUTINE
// ============================================================================

/// Shared wire-deserialization routine behind every dataset message variant.
///
/// One validation implementation, many producible concrete types: the caller
/// supplies a `build` function turning the validated base message into the
/// concrete target, plus an `extras` side-channel of named values the base
/// logic threads through without interpreting (the session variant passes its
/// secret this way). Any failure at any step yields `None`.
pub(crate) fn deserialize_variant<T>(
    obj: &Dict,
    extras: &Dict,
    build: impl FnOnce(DatasetManagementMessage, &Dict) -> Option<T>,
) -> Option<T> {
    let declared = obj.get(KEY_ACTION)?.as_str()?;
    let action = ManagementAction::get_for_name(declared);
    // Lookup is case-insensitive, but the declared string must round-trip to
    // the exact wire name; near-miss spellings are rejected.
    if declared != action.name() {
        tracing::debug!(action = declared, "rejecting message with unparseable action string");
        return None;
    }

    let dataset_name = match obj.get(KEY_DATASET_NAME) {
        Some(v) => Some(v.as_str()?.to_string()),
        None => None,
    };
    let category = match obj.get(KEY_CATEGORY) {
        Some(v) => Some(DataCategory::get_for_name(v.as_str()?)?),
        None => None,
    };
    let data_location = match obj.get(KEY_DATA_LOCATION) {
        Some(v) => Some(v.as_str()?.to_string()),
        None => None,
    };
    let domain = match obj.get(KEY_DATA_DOMAIN) {
        Some(v) => Some(DataDomain::from_dict(v.as_object()?)?),
        None => None,
    };
    let query = match obj.get(KEY_QUERY) {
        Some(v) => Some(DatasetQuery::from_dict(v.as_object()?)?),
        None => None,
    };
    let read_only = obj.get(KEY_READ_ONLY)?.as_bool()?;
    let pending_data = obj
        .get(KEY_PENDING_DATA)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let base = match DatasetManagementMessage::new(
        action,
        dataset_name,
        read_only,
        category,
        domain,
        data_location,
        pending_data,
        query,
    ) {
        Ok(message) => message,
        Err(error) => {
            tracing::debug!(%action, %error, "rejecting message failing action requirements");
            return None;
        }
    };
    build(base, extras)
}

// ============================================================================
// RESPONSE
// ============================================================================

/// Response to a `DatasetManagementMessage`.
///
/// Composes the generic response envelope; the dataset-specific values
/// (action, awaiting flag, data id, names, query results) live in the
/// envelope's payload and are exposed through typed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetManagementResponse {
    envelope: ResponseEnvelope,
}

impl DatasetManagementResponse {
    /// Construct a response, reconciling the explicit `action` against any
    /// action string already embedded in `data`.
    ///
    /// A conflicting pair fails with `ActionConflict`; if no explicit action
    /// is given, the embedded string must itself resolve cleanly through the
    /// catalog or construction fails with `NoValidAction`. The awaiting flag
    /// and, when provided, data id and dataset name are normalized into the
    /// payload so serialization always carries them.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        success: bool,
        reason: impl Into<String>,
        action: Option<ManagementAction>,
        is_awaiting: bool,
        data_id: Option<String>,
        dataset_name: Option<String>,
        data: Option<Dict>,
    ) -> Result<Self, ResponseValidationError> {
        let mut data = data.unwrap_or_default();
        match action {
            Some(action) => {
                if let Some(embedded) = data.get(KEY_ACTION).and_then(Value::as_str) {
                    if embedded != action.name() {
                        return Err(ResponseValidationError::ActionConflict {
                            explicit: action.name().to_string(),
                            embedded: embedded.to_string(),
                        });
                    }
                }
                data.insert(KEY_ACTION.to_string(), json!(action.name()));
            }
            None => {
                let embedded = data
                    .get(KEY_ACTION)
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                if !embedded_action_is_valid(&embedded) {
                    return Err(ResponseValidationError::NoValidAction { given: embedded });
                }
            }
        }
        data.insert(DATA_KEY_IS_AWAITING.to_string(), json!(is_awaiting));
        if let Some(data_id) = data_id {
            data.insert(DATA_KEY_DATA_ID.to_string(), json!(data_id));
        }
        if let Some(dataset_name) = dataset_name {
            data.insert(KEY_DATASET_NAME.to_string(), json!(dataset_name));
        }
        Ok(Self {
            envelope: ResponseEnvelope::new(success, reason, data),
        })
    }

    pub fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }

    pub fn success(&self) -> bool {
        self.envelope.success
    }

    pub fn reason(&self) -> &str {
        &self.envelope.reason
    }

    /// The action of the request this responds to. Total: absent or
    /// malformed payload values resolve to `Unknown`.
    pub fn action(&self) -> ManagementAction {
        match self.envelope.data.get(KEY_ACTION).and_then(Value::as_str) {
            Some(name) => ManagementAction::get_for_name(name),
            None => ManagementAction::Unknown,
        }
    }

    /// Whether the responder, beyond success, is expecting follow-up
    /// messages in the same dialog (e.g. awaiting data upload after a
    /// successful `Create`).
    pub fn is_awaiting(&self) -> bool {
        self.envelope
            .data
            .get(DATA_KEY_IS_AWAITING)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// When available, the 'data_id' of the related dataset.
    pub fn data_id(&self) -> Option<&str> {
        self.envelope.data.get(DATA_KEY_DATA_ID).and_then(Value::as_str)
    }

    /// When available, the name of the relevant dataset.
    pub fn dataset_name(&self) -> Option<&str> {
        self.envelope.data.get(KEY_DATASET_NAME).and_then(Value::as_str)
    }

    /// When available, the name of the relevant dataset item/object/file.
    pub fn item_name(&self) -> Option<&str> {
        self.envelope.data.get(DATA_KEY_ITEM_NAME).and_then(Value::as_str)
    }

    /// Query results payload, when present. Best-effort: an absent key is
    /// simply `None`, never an error.
    pub fn query_results(&self) -> Option<&Dict> {
        self.envelope
            .data
            .get(DATA_KEY_QUERY_RESULTS)
            .and_then(Value::as_object)
    }
}

/// Whether an action string embedded in response data resolves back to a
/// catalog value consistently with itself (case-insensitive).
fn embedded_action_is_valid(embedded: &str) -> bool {
    embedded.trim().to_uppercase() == ManagementAction::get_for_name(embedded).name()
}

impl Serializable for DatasetManagementResponse {
    fn to_dict(&self) -> Dict {
        self.envelope.to_dict()
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        let envelope = ResponseEnvelope::from_dict(obj)?;
        let embedded = envelope
            .data
            .get(KEY_ACTION)
            .and_then(Value::as_str)
            .unwrap_or("");
        if !embedded_action_is_valid(embedded) {
            tracing::debug!(action = embedded, "rejecting response without a valid action");
            return None;
        }
        Some(Self { envelope })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryType;
    use modex_core::DataFormat;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn make_domain() -> DataDomain {
        DataDomain::new(DataFormat::AorcCsv, Vec::new(), Vec::new())
    }

    fn make_create_message() -> DatasetManagementMessage {
        DatasetManagementMessage::new(
            ManagementAction::Create,
            Some("aorc-jan-2022".to_string()),
            false,
            Some(DataCategory::Forcing),
            Some(make_domain()),
            None,
            true,
            None,
        )
        .unwrap()
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_name_requirement_enforced() {
        for action in [
            ManagementAction::Create,
            ManagementAction::AddData,
            ManagementAction::Delete,
            ManagementAction::Query,
        ] {
            let result = DatasetManagementMessage::new(
                action,
                None,
                false,
                Some(DataCategory::Forcing),
                Some(make_domain()),
                None,
                false,
                None,
            );
            assert_eq!(
                result.unwrap_err(),
                MessageValidationError::MissingDatasetName { action }
            );
        }
    }

    #[test]
    fn test_category_requirement_enforced() {
        let result = DatasetManagementMessage::new(
            ManagementAction::Search,
            None,
            false,
            None,
            None,
            None,
            false,
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            MessageValidationError::MissingDataCategory {
                action: ManagementAction::Search
            }
        );
    }

    #[test]
    fn test_domain_requirement_enforced() {
        let result = DatasetManagementMessage::new(
            ManagementAction::Create,
            Some("ds".to_string()),
            false,
            Some(DataCategory::Forcing),
            None,
            None,
            false,
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            MessageValidationError::MissingDataDomain {
                action: ManagementAction::Create
            }
        );
    }

    #[test]
    fn test_query_allowed_on_any_action() {
        // Permissive by design: a query may accompany actions other than Query.
        let message = DatasetManagementMessage::new(
            ManagementAction::Delete,
            Some("ds".to_string()),
            false,
            None,
            None,
            None,
            false,
            Some(DatasetQuery::new(QueryType::ListFiles)),
        )
        .unwrap();
        assert!(message.query().is_some());
    }

    #[test]
    fn test_wire_roundtrip() {
        let message = make_create_message();
        let restored = DatasetManagementMessage::from_dict(&message.to_dict()).unwrap();
        assert_eq!(message, restored);
        assert_eq!(hash_of(&message), hash_of(&restored));
    }

    #[test]
    fn test_serialization_idempotent() {
        let message = make_create_message();
        let first = message.to_dict();
        let again = DatasetManagementMessage::from_dict(&first).unwrap().to_dict();
        assert_eq!(first, again);
    }

    #[test]
    fn test_factory_rejects_near_miss_action() {
        let mut serial = make_create_message().to_dict();
        // Lookup alone would resolve this, but the round-trip gate must not.
        serial.insert(KEY_ACTION.to_string(), json!("Create"));
        assert!(DatasetManagementMessage::from_dict(&serial).is_none());
    }

    #[test]
    fn test_factory_rejects_unknown_action() {
        let mut serial = make_create_message().to_dict();
        serial.insert(KEY_ACTION.to_string(), json!("not-a-real-action"));
        assert!(DatasetManagementMessage::from_dict(&serial).is_none());
    }

    #[test]
    fn test_factory_rejects_missing_read_only() {
        let mut serial = make_create_message().to_dict();
        serial.remove(KEY_READ_ONLY);
        assert!(DatasetManagementMessage::from_dict(&serial).is_none());
    }

    #[test]
    fn test_factory_rejects_bad_nested_category() {
        let mut serial = make_create_message().to_dict();
        serial.insert(KEY_CATEGORY.to_string(), json!("NOT_A_CATEGORY"));
        assert!(DatasetManagementMessage::from_dict(&serial).is_none());
    }

    #[test]
    fn test_factory_tolerates_missing_pending_data() {
        let mut serial = make_create_message().to_dict();
        serial.remove(KEY_PENDING_DATA);
        let restored = DatasetManagementMessage::from_dict(&serial).unwrap();
        assert!(!restored.is_pending_data());
    }

    #[test]
    fn test_response_action_conflict() {
        let mut data = Dict::new();
        data.insert(KEY_ACTION.to_string(), json!("DELETE"));
        let result = DatasetManagementResponse::new(
            true,
            "Dataset Created",
            Some(ManagementAction::Create),
            false,
            None,
            None,
            Some(data),
        );
        assert_eq!(
            result.unwrap_err(),
            ResponseValidationError::ActionConflict {
                explicit: "CREATE".to_string(),
                embedded: "DELETE".to_string(),
            }
        );
    }

    #[test]
    fn test_response_embedded_action_accepted() {
        let mut data = Dict::new();
        data.insert(KEY_ACTION.to_string(), json!("CREATE"));
        let response =
            DatasetManagementResponse::new(true, "Dataset Created", None, false, None, None, Some(data))
                .unwrap();
        assert_eq!(response.action(), ManagementAction::Create);
    }

    #[test]
    fn test_response_no_valid_action() {
        let mut data = Dict::new();
        data.insert(KEY_ACTION.to_string(), json!("bogus"));
        let result =
            DatasetManagementResponse::new(true, "reason", None, false, None, None, Some(data));
        assert_eq!(
            result.unwrap_err(),
            ResponseValidationError::NoValidAction {
                given: "bogus".to_string()
            }
        );

        let result = DatasetManagementResponse::new(true, "reason", None, false, None, None, None);
        assert!(matches!(
            result,
            Err(ResponseValidationError::NoValidAction { .. })
        ));
    }

    #[test]
    fn test_response_normalizes_payload() {
        let response = DatasetManagementResponse::new(
            true,
            "Dataset Created",
            Some(ManagementAction::Create),
            true,
            Some("data-9000".to_string()),
            Some("aorc-jan-2022".to_string()),
            None,
        )
        .unwrap();
        assert!(response.is_awaiting());
        assert_eq!(response.data_id(), Some("data-9000"));
        assert_eq!(response.dataset_name(), Some("aorc-jan-2022"));
        assert_eq!(response.item_name(), None);
        assert!(response.query_results().is_none());

        let serial = response.to_dict();
        let data = serial.get("data").unwrap().as_object().unwrap();
        assert_eq!(data.get("is_awaiting"), Some(&json!(true)));
        assert_eq!(data.get("data_id"), Some(&json!("data-9000")));
    }

    #[test]
    fn test_response_wire_roundtrip() {
        let response = DatasetManagementResponse::new(
            true,
            "Query Complete",
            Some(ManagementAction::Query),
            false,
            None,
            Some("ds".to_string()),
            None,
        )
        .unwrap();
        let restored = DatasetManagementResponse::from_dict(&response.to_dict()).unwrap();
        assert_eq!(response, restored);
    }

    #[test]
    fn test_response_from_dict_rejects_invalid_embedded_action() {
        let mut data = Dict::new();
        data.insert(KEY_ACTION.to_string(), json!("nope"));
        let envelope = ResponseEnvelope::new(true, "reason", data);
        assert!(DatasetManagementResponse::from_dict(&envelope.to_dict()).is_none());
    }

    fn arb_message() -> impl Strategy<Value = DatasetManagementMessage> {
        let actions = vec![
            ManagementAction::Unknown,
            ManagementAction::Create,
            ManagementAction::AddData,
            ManagementAction::RemoveData,
            ManagementAction::Delete,
            ManagementAction::Search,
            ManagementAction::Query,
            ManagementAction::CloseAwaiting,
            ManagementAction::ListAll,
            ManagementAction::RequestData,
        ];
        (
            proptest::sample::select(actions),
            proptest::option::of("[a-z][a-z0-9-]{0,11}"),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            proptest::option::of("[a-z0-9/._-]{1,16}"),
            any::<bool>(),
            proptest::option::of(proptest::sample::select(vec![
                QueryType::ListFiles,
                QueryType::GetValues,
                QueryType::GetMinValue,
            ])),
        )
            .prop_map(
                |(action, name, read_only, with_category, with_domain, location, pending, query)| {
                    let dataset_name = if action.requires_dataset_name() {
                        Some(name.unwrap_or_else(|| "ds".to_string()))
                    } else {
                        name
                    };
                    let category = if action.requires_data_category() || with_category {
                        Some(DataCategory::Forcing)
                    } else {
                        None
                    };
                    let domain = if action.requires_data_domain() || with_domain {
                        Some(make_domain())
                    } else {
                        None
                    };
                    DatasetManagementMessage::new(
                        action,
                        dataset_name,
                        read_only,
                        category,
                        domain,
                        location,
                        pending,
                        query.map(DatasetQuery::new),
                    )
                    .unwrap()
                },
            )
    }

    proptest! {
        #[test]
        fn prop_wire_roundtrip(message in arb_message()) {
            let restored = DatasetManagementMessage::from_dict(&message.to_dict()).unwrap();
            prop_assert_eq!(&message, &restored);
            prop_assert_eq!(message.to_dict(), restored.to_dict());
        }
    }
}
