//! Validation errors for message and response construction.
//!
//! These surface programmer-facing contract violations. Wire-facing
//! deserialization never returns them; it collapses every failure to `None`.

use crate::action::ManagementAction;
use thiserror::Error;

/// Errors raised when constructing a dataset management message whose action
/// demands fields that were not supplied. One variant per violated
/// requirement so callers can tell them apart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageValidationError {
    #[error("Cannot create {action} message without a dataset name")]
    MissingDatasetName { action: ManagementAction },

    #[error("Cannot create {action} message without a data category")]
    MissingDataCategory { action: ManagementAction },

    #[error("Cannot create {action} message without a data domain")]
    MissingDataDomain { action: ManagementAction },
}

/// Errors raised when constructing a dataset management response whose action
/// cannot be reconciled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResponseValidationError {
    #[error("Response initialized with {explicit} action param, but {embedded} action in initial data")]
    ActionConflict { explicit: String, embedded: String },

    #[error("No valid action param or within response data (received only '{given}')")]
    NoValidAction { given: String },
}
