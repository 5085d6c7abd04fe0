//! Dataset query descriptors attached to `QUERY` messages.

use modex_core::{Dict, Serializable};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Kind of query that can be posed against a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    ListFiles,
    GetCategory,
    GetFormat,
    GetIndices,
    GetDataFields,
    GetValues,
    GetMinValue,
    GetMaxValue,
}

const ALL_QUERY_TYPES: [QueryType; 8] = [
    QueryType::ListFiles,
    QueryType::GetCategory,
    QueryType::GetFormat,
    QueryType::GetIndices,
    QueryType::GetDataFields,
    QueryType::GetValues,
    QueryType::GetMinValue,
    QueryType::GetMaxValue,
];

impl QueryType {
    /// Wire name for this query kind.
    pub fn name(&self) -> &'static str {
        match self {
            QueryType::ListFiles => "LIST_FILES",
            QueryType::GetCategory => "GET_CATEGORY",
            QueryType::GetFormat => "GET_FORMAT",
            QueryType::GetIndices => "GET_INDICES",
            QueryType::GetDataFields => "GET_DATA_FIELDS",
            QueryType::GetValues => "GET_VALUES",
            QueryType::GetMinValue => "GET_MIN_VALUE",
            QueryType::GetMaxValue => "GET_MAX_VALUE",
        }
    }

    /// Resolve a query kind from its wire name, ignoring case and surrounding
    /// whitespace, defaulting to `ListFiles`.
    ///
    /// Note the default differs from the action catalog's `Unknown` fallback.
    /// The two policies are independent and must not be conflated.
    pub fn get_for_name(name_str: &str) -> Self {
        let cleaned = name_str.trim().to_uppercase();
        ALL_QUERY_TYPES
            .into_iter()
            .find(|q| q.name() == cleaned)
            .unwrap_or(QueryType::ListFiles)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Query descriptor carried by a dataset management message.
///
/// Identity is the query kind alone; two queries of the same kind are equal
/// and hash identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetQuery {
    pub query_type: QueryType,
}

impl DatasetQuery {
    pub fn new(query_type: QueryType) -> Self {
        Self { query_type }
    }
}

impl Serializable for DatasetQuery {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert("query_type".to_string(), json!(self.query_type.name()));
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        let name = obj.get("query_type")?.as_str()?;
        Some(Self::new(QueryType::get_for_name(name)))
    }
}
