//! Document collections.
//!
//! [`Collection`] stores JSON object documents under string ids and
//! answers filter queries. [`TypedCollection`] layers `serde` records on
//! top via the [`Record`] trait.

mod document;
mod record;
mod typed;

pub use document::{Collection, Document};
pub use record::Record;
pub use typed::TypedCollection;

pub(crate) use document::{validate_document, validate_id};
