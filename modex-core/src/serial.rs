//! Serialization contract shared by every wire-facing modex type.

use serde_json::{Map, Value};

/// JSON object type used as the wire representation of every message and
/// value object. The default serde_json map is BTreeMap-backed, so key order
/// is deterministic and repeated serializations are byte-for-byte stable.
pub type Dict = Map<String, Value>;

/// Symmetric dict round-trip for wire-facing types.
///
/// `from_dict` is total over untrusted input: any structural problem yields
/// `None` rather than an error. Implementors guarantee that
/// `from_dict(&x.to_dict())` reproduces `x`.
pub trait Serializable {
    /// Serialize to a JSON object keyed by this type's wire keys.
    fn to_dict(&self) -> Dict;

    /// Serialize to a compact JSON string.
    fn to_json(&self) -> String {
        Value::Object(self.to_dict()).to_string()
    }

    /// Inflate from a JSON object, if the representation is valid.
    fn from_dict(obj: &Dict) -> Option<Self>
    where
        Self: Sized;
}
