//! Record trait for typed collections.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for types stored as documents in a [`super::TypedCollection`].
///
/// Records serialize to a JSON object with `serde_json`; the object is the
/// stored document. `record_id` names the document and must not change
/// over the record's lifetime.
///
/// # Example
///
/// ```rust
/// use graphdoc_core::Record;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Note {
///     id: String,
///     body: String,
/// }
///
/// impl Record for Note {
///     fn record_id(&self) -> &str {
///         &self.id
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned {
    /// Returns the record's stable identifier.
    fn record_id(&self) -> &str;
}
