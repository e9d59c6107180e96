//! # GraphDoc Testkit
//!
//! Test utilities for GraphDoc.
//!
//! This crate provides:
//! - Test fixtures for in-memory and file-backed stores
//! - Property-based test generators using proptest
//! - A model-checking harness for collections
//! - A scripted [`SemanticMatcher`](graphdoc_core::SemanticMatcher) for fuzzy relate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graphdoc_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_temp_store(|store| {
//!         let users = store.collection("users");
//!         // ... test operations
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod matcher;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::matcher::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use matcher::*;
