//! modex comm - typed request/response message protocol.
//!
//! The message layer exchanged between clients and the modex dataset
//! management and evaluation orchestration services, carried as JSON over an
//! otherwise opaque transport. This crate produces and validates message
//! structures; it does not send them. Transport framing, response routing,
//! and retry policy live elsewhere.
//!
//! Two error regimes apply throughout and must not be blurred:
//! construction from explicit parameters fails loudly with an attributable
//! error per violated precondition, while deserialization of untrusted wire
//! data is total and signals every failure as `None`.

pub mod action;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod message;
pub mod query;
pub mod session;

pub use action::ManagementAction;
pub use dataset::{DatasetManagementMessage, DatasetManagementResponse};
pub use error::{MessageValidationError, ResponseValidationError};
pub use evaluation::{
    EvaluationConnectionRequest, EvaluationConnectionRequestResponse, EvaluationRequest,
    FindEvaluationRequest, FindEvaluationResponse, SaveEvaluationRequest, SaveEvaluationResponse,
    StartEvaluationRequest, StartEvaluationResponse,
};
pub use message::{Message, MessageEventType, ResponseEnvelope, SessionAuthenticated};
pub use query::{DatasetQuery, QueryType};
pub use session::{MaasDatasetManagementMessage, MaasDatasetManagementResponse};
