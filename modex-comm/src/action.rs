//! The catalog of dataset management actions.
//!
//! Each action carries fixed capability flags declaring which message fields
//! are mandatory for it. The catalog is the single source of truth consulted
//! both when constructing outgoing messages and when vetting the action
//! string of incoming wire data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An action that can be requested of the dataset management service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagementAction {
    /// Placeholder for when the actual action is not known, generally
    /// representing an error such as a bad parse.
    Unknown,
    /// Create a new dataset.
    Create,
    /// Add data to an existing dataset.
    AddData,
    /// Remove data from an existing dataset.
    RemoveData,
    /// Delete an existing dataset.
    Delete,
    /// Search for datasets satisfying certain conditions.
    Search,
    /// Query for information about a dataset (e.g., covered time period).
    Query,
    /// Close an ongoing multi-message dialog.
    CloseAwaiting,
    /// Like `Search`, but list all datasets.
    ListAll,
    /// Request data from a dataset, expecting a response detailing how.
    RequestData,
}

/// All catalog values, in uid order.
const ALL_ACTIONS: [ManagementAction; 10] = [
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

impl ManagementAction {
    /// Stable integer identity for this action.
    pub fn uid(&self) -> i32 {
        match self {
            ManagementAction::Unknown => -1,
            ManagementAction::Create => 1,
            ManagementAction::AddData => 2,
            ManagementAction::RemoveData => 3,
            ManagementAction::Delete => 4,
            ManagementAction::Search => 5,
            ManagementAction::Query => 6,
            ManagementAction::CloseAwaiting => 7,
            ManagementAction::ListAll => 8,
            ManagementAction::RequestData => 9,
        }
    }

    /// Wire name for this action.
    pub fn name(&self) -> &'static str {
        match self {
            ManagementAction::Unknown => "UNKNOWN",
            ManagementAction::Create => "CREATE",
            ManagementAction::AddData => "ADD_DATA",
            ManagementAction::RemoveData => "REMOVE_DATA",
            ManagementAction::Delete => "DELETE",
            ManagementAction::Search => "SEARCH",
            ManagementAction::Query => "QUERY",
            ManagementAction::CloseAwaiting => "CLOSE_AWAITING",
            ManagementAction::ListAll => "LIST_ALL",
            ManagementAction::RequestData => "REQUEST_DATA",
        }
    }

    /// Whether this action requires a dataset name to be valid.
    ///
    /// Certain actions, e.g. `Create`, cannot be performed without the name
    /// of the dataset involved, while others such as `Search` inherently do
    /// not need one.
    pub fn requires_dataset_name(&self) -> bool {
        matches!(
            self,
            ManagementAction::Create
                | ManagementAction::AddData
                | ManagementAction::RemoveData
                | ManagementAction::Delete
                | ManagementAction::Query
                | ManagementAction::RequestData
        )
    }

    /// Whether this action requires a data category to be valid.
    pub fn requires_data_category(&self) -> bool {
        matches!(self, ManagementAction::Create | ManagementAction::Search)
    }

    /// Whether this action requires a data domain to be valid.
    pub fn requires_data_domain(&self) -> bool {
        matches!(self, ManagementAction::Create)
    }

    /// Resolve an action from its wire name, ignoring case and surrounding
    /// whitespace. Total: unrecognized names resolve to `Unknown`, which
    /// carries no field requirements.
    pub fn get_for_name(name_str: &str) -> Self {
        let cleaned = name_str.trim().to_uppercase();
        ALL_ACTIONS
            .into_iter()
            .find(|a| a.name() == cleaned)
            .unwrap_or(ManagementAction::Unknown)
    }
}

impl fmt::Display for ManagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ManagementAction {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::get_for_name(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(
            ManagementAction::get_for_name("create"),
            ManagementAction::Create
        );
        assert_eq!(
            ManagementAction::get_for_name("CREATE"),
            ManagementAction::Create
        );
        assert_eq!(
            ManagementAction::get_for_name("Create"),
            ManagementAction::Create
        );
        assert_eq!(
            ManagementAction::get_for_name("  close_awaiting "),
            ManagementAction::CloseAwaiting
        );
    }

    #[test]
    fn test_lookup_total_defaults_to_unknown() {
        assert_eq!(
            ManagementAction::get_for_name("not-a-real-action"),
            ManagementAction::Unknown
        );
        assert_eq!(ManagementAction::get_for_name(""), ManagementAction::Unknown);
    }

    #[test]
    fn test_unknown_carries_no_requirements() {
        let unknown = ManagementAction::Unknown;
        assert!(!unknown.requires_dataset_name());
        assert!(!unknown.requires_data_category());
        assert!(!unknown.requires_data_domain());
    }

    #[test]
    fn test_create_requires_everything() {
        let create = ManagementAction::Create;
        assert!(create.requires_dataset_name());
        assert!(create.requires_data_category());
        assert!(create.requires_data_domain());
    }

    #[test]
    fn test_search_requires_category_only() {
        let search = ManagementAction::Search;
        assert!(!search.requires_dataset_name());
        assert!(search.requires_data_category());
        assert!(!search.requires_data_domain());
    }

    #[test]
    fn test_name_roundtrip() {
        for action in ALL_ACTIONS {
            assert_eq!(ManagementAction::get_for_name(action.name()), action);
        }
    }

    #[test]
    fn test_uids_distinct() {
        let mut uids: Vec<i32> = ALL_ACTIONS.iter().map(|a| a.uid()).collect();
        uids.sort();
        uids.dedup();
        assert_eq!(uids.len(), ALL_ACTIONS.len());
    }
}
