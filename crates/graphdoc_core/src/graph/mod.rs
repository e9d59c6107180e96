//! Typed graph layer.
//!
//! A [`Graph`] keeps five collections in its [`Store`]:
//!
//! | Collection      | Record           |
//! |-----------------|------------------|
//! | `nouns`         | [`Noun`]         |
//! | `verbs`         | [`Verb`]         |
//! | `things`        | [`Thing`]        |
//! | `actions`       | [`Action`]       |
//! | `relationships` | [`Relationship`] |
//!
//! Mutations of things and relationships append [`Action`]s to the audit
//! log. Each composite write (the record, then its action) runs as
//! separate statements; a failure between them leaves the record
//! without its action.

mod actions;
mod fuzzy;
mod relationships;
mod schema;
mod things;
mod traverse;

pub use actions::{Action, ActionEntry, Actions};
pub use fuzzy::{FuzzyOptions, FuzzyRelation, SemanticMatcher, SimilarMatch};
pub use relationships::{RelateOptions, Relationship, Relationships};
pub use schema::{CascadeKind, Noun, NounDefinition, Nouns, Verb, VerbDefinition, Verbs};
pub use things::{Thing, Things};

use crate::collection::TypedCollection;
use crate::error::CoreResult;
use crate::ids::IdGenerator;
use crate::store::Store;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Collection holding [`Noun`]s.
pub const NOUNS: &str = "nouns";
/// Collection holding [`Verb`]s.
pub const VERBS: &str = "verbs";
/// Collection holding [`Thing`]s.
pub const THINGS: &str = "things";
/// Collection holding [`Action`]s.
pub const ACTIONS: &str = "actions";
/// Collection holding [`Relationship`]s.
pub const RELATIONSHIPS: &str = "relationships";

/// Record counts of a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Defined nouns.
    pub nouns: u64,
    /// Defined verbs.
    pub verbs: u64,
    /// Stored things.
    pub things: u64,
    /// Logged actions.
    pub actions: u64,
    /// Stored relationships.
    pub relationships: u64,
}

/// The graph of one storage unit.
///
/// # Example
///
/// ```rust,ignore
/// use graphdoc_core::{Graph, RelateOptions};
/// use serde_json::json;
///
/// let graph = Graph::open_in_memory()?;
/// let ada = graph.things().create("User", json!({"name": "Ada"}), None)?;
/// let acme = graph.things().create("Company", json!({"name": "Acme"}), None)?;
/// graph.relationships().relate(&ada.id, "worksAt", &acme.id, RelateOptions::new())?;
///
/// assert_eq!(graph.traverse(&ada.id, "worksAt")?, vec![acme]);
/// ```
pub struct Graph {
    pub(crate) store: Store,
    pub(crate) ids: IdGenerator,
    pub(crate) nouns: TypedCollection<Noun>,
    pub(crate) verbs: TypedCollection<Verb>,
    pub(crate) things: TypedCollection<Thing>,
    pub(crate) actions: TypedCollection<Action>,
    pub(crate) relationships: TypedCollection<Relationship>,
    pub(crate) noun_cache: RwLock<HashMap<String, Noun>>,
    pub(crate) verb_cache: RwLock<HashMap<String, Verb>>,
    pub(crate) matcher: Option<Arc<dyn SemanticMatcher>>,
}

impl Graph {
    /// Builds a graph over a store.
    pub fn new(store: Store) -> Self {
        Self {
            ids: IdGenerator::new(),
            nouns: store.typed_collection(NOUNS),
            verbs: store.typed_collection(VERBS),
            things: store.typed_collection(THINGS),
            actions: store.typed_collection(ACTIONS),
            relationships: store.typed_collection(RELATIONSHIPS),
            noun_cache: RwLock::new(HashMap::new()),
            verb_cache: RwLock::new(HashMap::new()),
            matcher: None,
            store,
        }
    }

    /// Builds a graph over a private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    pub fn open_in_memory() -> CoreResult<Self> {
        Ok(Self::new(Store::open_in_memory()?))
    }

    /// Injects the similarity search used by [`Graph::fuzzy_relate`].
    #[must_use]
    pub fn with_matcher(mut self, matcher: Arc<dyn SemanticMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Returns true if a matcher is configured.
    pub fn has_matcher(&self) -> bool {
        self.matcher.is_some()
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Noun registry.
    pub fn nouns(&self) -> Nouns<'_> {
        Nouns { graph: self }
    }

    /// Verb registry.
    pub fn verbs(&self) -> Verbs<'_> {
        Verbs { graph: self }
    }

    /// Entity store.
    pub fn things(&self) -> Things<'_> {
        Things { graph: self }
    }

    /// Audit log.
    pub fn actions(&self) -> Actions<'_> {
        Actions { graph: self }
    }

    /// Edge store.
    pub fn relationships(&self) -> Relationships<'_> {
        Relationships { graph: self }
    }

    /// Counts the records of every graph collection.
    pub fn stats(&self) -> CoreResult<GraphStats> {
        use crate::query::Filter;

        let all = Filter::all();
        Ok(GraphStats {
            nouns: self.nouns.count(&all)?,
            verbs: self.verbs.count(&all)?,
            things: self.things.count(&all)?,
            actions: self.actions.count(&all)?,
            relationships: self.relationships.count(&all)?,
        })
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("store", &self.store)
            .field("has_matcher", &self.matcher.is_some())
            .finish_non_exhaustive()
    }
}
