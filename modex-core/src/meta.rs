//! Opaque metadata value types consumed by the message protocol layer.
//!
//! These are the category/format/domain/requirement descriptors that dataset
//! messages carry. The protocol layer treats them as black boxes: it resolves
//! them by name or inflates them from a dict, and re-serializes them
//! unchanged.

use crate::serial::{Dict, Serializable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CLOSED-SET ENUMS
// ============================================================================

/// High-level category of a dataset's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataCategory {
    Forcing,
    Observation,
    Output,
    Config,
    Hydrofabric,
}

impl DataCategory {
    /// Wire name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            DataCategory::Forcing => "FORCING",
            DataCategory::Observation => "OBSERVATION",
            DataCategory::Output => "OUTPUT",
            DataCategory::Config => "CONFIG",
            DataCategory::Hydrofabric => "HYDROFABRIC",
        }
    }

    /// Resolve a category from its wire name, ignoring case and surrounding
    /// whitespace. Unknown names resolve to `None`.
    pub fn get_for_name(name_str: &str) -> Option<Self> {
        let cleaned = name_str.trim().to_uppercase();
        [
            DataCategory::Forcing,
            DataCategory::Observation,
            DataCategory::Output,
            DataCategory::Config,
            DataCategory::Hydrofabric,
        ]
        .into_iter()
        .find(|c| c.name() == cleaned)
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DataCategory {
    type Err = UnrecognizedNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::get_for_name(s).ok_or_else(|| UnrecognizedNameError(s.to_string()))
    }
}

/// Concrete serialized format of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    AorcCsv,
    NetcdfForcingCanonical,
    NetcdfAorcDefault,
    NgenOutput,
    NgenRealizationConfig,
    BmiConfig,
}

impl DataFormat {
    /// Wire name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            DataFormat::AorcCsv => "AORC_CSV",
            DataFormat::NetcdfForcingCanonical => "NETCDF_FORCING_CANONICAL",
            DataFormat::NetcdfAorcDefault => "NETCDF_AORC_DEFAULT",
            DataFormat::NgenOutput => "NGEN_OUTPUT",
            DataFormat::NgenRealizationConfig => "NGEN_REALIZATION_CONFIG",
            DataFormat::BmiConfig => "BMI_CONFIG",
        }
    }

    /// Resolve a format from its wire name, ignoring case and surrounding
    /// whitespace. Unknown names resolve to `None`.
    pub fn get_for_name(name_str: &str) -> Option<Self> {
        let cleaned = name_str.trim().to_uppercase();
        [
            DataFormat::AorcCsv,
            DataFormat::NetcdfForcingCanonical,
            DataFormat::NetcdfAorcDefault,
            DataFormat::NgenOutput,
            DataFormat::NgenRealizationConfig,
            DataFormat::BmiConfig,
        ]
        .into_iter()
        .find(|f| f.name() == cleaned)
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DataFormat {
    type Err = UnrecognizedNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::get_for_name(s).ok_or_else(|| UnrecognizedNameError(s.to_string()))
    }
}

/// Error when parsing an unrecognized metadata name string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedNameError(pub String);

impl fmt::Display for UnrecognizedNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unrecognized metadata name: {}", self.0)
    }
}

impl std::error::Error for UnrecognizedNameError {}

// ============================================================================
// DOMAIN RESTRICTIONS
// ============================================================================

/// Restriction of a continuous domain variable to an inclusive time range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContinuousRestriction {
    pub variable: String,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Serializable for ContinuousRestriction {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert("variable".to_string(), json!(self.variable));
        serial.insert("begin".to_string(), json!(self.begin.to_rfc3339()));
        serial.insert("end".to_string(), json!(self.end.to_rfc3339()));
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        let variable = obj.get("variable")?.as_str()?.to_string();
        let begin = DateTime::parse_from_rfc3339(obj.get("begin")?.as_str()?).ok()?;
        let end = DateTime::parse_from_rfc3339(obj.get("end")?.as_str()?).ok()?;
        Some(Self {
            variable,
            begin: begin.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        })
    }
}

/// Restriction of a discrete domain variable to an explicit set of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteRestriction {
    pub variable: String,
    pub values: Vec<String>,
}

impl Serializable for DiscreteRestriction {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert("variable".to_string(), json!(self.variable));
        serial.insert("values".to_string(), json!(self.values));
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        let variable = obj.get("variable")?.as_str()?.to_string();
        let values = obj
            .get("values")?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { variable, values })
    }
}

// ============================================================================
// DATA DOMAIN
// ============================================================================

/// The domain a dataset covers: its format plus the restrictions that pin
/// down which slice of that format's index space the data spans.
///
/// Restriction maps are keyed by variable name. BTreeMap keeps iteration
/// and serialization order deterministic so domains hash and compare stably.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataDomain {
    data_format: DataFormat,
    continuous_restrictions: BTreeMap<String, ContinuousRestriction>,
    discrete_restrictions: BTreeMap<String, DiscreteRestriction>,
}

impl DataDomain {
    pub fn new(
        data_format: DataFormat,
        continuous: impl IntoIterator<Item = ContinuousRestriction>,
        discrete: impl IntoIterator<Item = DiscreteRestriction>,
    ) -> Self {
        Self {
            data_format,
            continuous_restrictions: continuous
                .into_iter()
                .map(|r| (r.variable.clone(), r))
                .collect(),
            discrete_restrictions: discrete
                .into_iter()
                .map(|r| (r.variable.clone(), r))
                .collect(),
        }
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }

    pub fn continuous_restrictions(&self) -> &BTreeMap<String, ContinuousRestriction> {
        &self.continuous_restrictions
    }

    pub fn discrete_restrictions(&self) -> &BTreeMap<String, DiscreteRestriction> {
        &self.discrete_restrictions
    }
}

impl Serializable for DataDomain {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert("data_format".to_string(), json!(self.data_format.name()));
        if !self.continuous_restrictions.is_empty() {
            let continuous: Vec<Value> = self
                .continuous_restrictions
                .values()
                .map(|r| Value::Object(r.to_dict()))
                .collect();
            serial.insert("continuous".to_string(), Value::Array(continuous));
        }
        if !self.discrete_restrictions.is_empty() {
            let discrete: Vec<Value> = self
                .discrete_restrictions
                .values()
                .map(|r| Value::Object(r.to_dict()))
                .collect();
            serial.insert("discrete".to_string(), Value::Array(discrete));
        }
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        let data_format = DataFormat::get_for_name(obj.get("data_format")?.as_str()?)?;
        let mut continuous = Vec::new();
        if let Some(entries) = obj.get("continuous") {
            for entry in entries.as_array()? {
                continuous.push(ContinuousRestriction::from_dict(entry.as_object()?)?);
            }
        }
        let mut discrete = Vec::new();
        if let Some(entries) = obj.get("discrete") {
            for entry in entries.as_array()? {
                discrete.push(DiscreteRestriction::from_dict(entry.as_object()?)?);
            }
        }
        Some(Self::new(data_format, continuous, discrete))
    }
}

// ============================================================================
// DATA REQUIREMENT
// ============================================================================

/// A requirement that some task input or output be satisfied by a dataset
/// covering a particular domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataRequirement {
    pub domain: DataDomain,
    pub is_input: bool,
    pub category: DataCategory,
    pub size: Option<u64>,
    /// Name of the dataset already known to fulfill this requirement, if any.
    pub fulfilled_by: Option<String>,
}

impl DataRequirement {
    pub fn new(domain: DataDomain, is_input: bool, category: DataCategory) -> Self {
        Self {
            domain,
            is_input,
            category,
            size: None,
            fulfilled_by: None,
        }
    }
}

impl Serializable for DataRequirement {
    fn to_dict(&self) -> Dict {
        let mut serial = Dict::new();
        serial.insert("domain".to_string(), Value::Object(self.domain.to_dict()));
        serial.insert("is_input".to_string(), json!(self.is_input));
        serial.insert("category".to_string(), json!(self.category.name()));
        if let Some(size) = self.size {
            serial.insert("size".to_string(), json!(size));
        }
        if let Some(fulfilled_by) = &self.fulfilled_by {
            serial.insert("fulfilled_by".to_string(), json!(fulfilled_by));
        }
        serial
    }

    fn from_dict(obj: &Dict) -> Option<Self> {
        let domain = DataDomain::from_dict(obj.get("domain")?.as_object()?)?;
        let is_input = obj.get("is_input")?.as_bool()?;
        let category = DataCategory::get_for_name(obj.get("category")?.as_str()?)?;
        let size = match obj.get("size") {
            Some(v) => Some(v.as_u64()?),
            None => None,
        };
        let fulfilled_by = match obj.get("fulfilled_by") {
            Some(v) => Some(v.as_str()?.to_string()),
            None => None,
        };
        Some(Self {
            domain,
            is_input,
            category,
            size,
            fulfilled_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_domain() -> DataDomain {
        let begin = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2022, 1, 31, 0, 0, 0).unwrap();
        DataDomain::new(
            DataFormat::AorcCsv,
            [ContinuousRestriction {
                variable: "time".to_string(),
                begin,
                end,
            }],
            [DiscreteRestriction {
                variable: "catchment_id".to_string(),
                values: vec!["cat-67".to_string(), "cat-88".to_string()],
            }],
        )
    }

    #[test]
    fn test_category_lookup_case_insensitive() {
        assert_eq!(
            DataCategory::get_for_name("forcing"),
            Some(DataCategory::Forcing)
        );
        assert_eq!(
            DataCategory::get_for_name(" OUTPUT "),
            Some(DataCategory::Output)
        );
        assert_eq!(DataCategory::get_for_name("bogus"), None);
    }

    #[test]
    fn test_format_lookup() {
        assert_eq!(
            DataFormat::get_for_name("aorc_csv"),
            Some(DataFormat::AorcCsv)
        );
        assert_eq!(DataFormat::get_for_name("not-a-format"), None);
    }

    #[test]
    fn test_domain_roundtrip() {
        let domain = make_domain();
        let restored = DataDomain::from_dict(&domain.to_dict()).unwrap();
        assert_eq!(domain, restored);
    }

    #[test]
    fn test_domain_rejects_unknown_format() {
        let mut serial = make_domain().to_dict();
        serial.insert("data_format".to_string(), json!("NOT_A_FORMAT"));
        assert!(DataDomain::from_dict(&serial).is_none());
    }

    #[test]
    fn test_requirement_roundtrip() {
        let mut req = DataRequirement::new(make_domain(), true, DataCategory::Forcing);
        req.size = Some(2048);
        req.fulfilled_by = Some("aorc-jan-2022".to_string());
        let restored = DataRequirement::from_dict(&req.to_dict()).unwrap();
        assert_eq!(req, restored);
    }

    #[test]
    fn test_requirement_optional_fields_omitted() {
        let req = DataRequirement::new(make_domain(), false, DataCategory::Output);
        let serial = req.to_dict();
        assert!(!serial.contains_key("size"));
        assert!(!serial.contains_key("fulfilled_by"));
        let restored = DataRequirement::from_dict(&serial).unwrap();
        assert_eq!(restored.size, None);
        assert_eq!(restored.fulfilled_by, None);
    }
}
