//! Directed typed edges between things.

use crate::collection::{validate_id, Record};
use crate::error::CoreResult;
use crate::graph::actions::ActionEntry;
use crate::graph::schema::CascadeKind;
use crate::graph::Graph;
use crate::ids::now_millis;
use crate::query::{Filter, QueryOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A directed edge `from -[verb]-> to`.
///
/// Endpoints are plain ids. Edges are removed when either endpoint thing
/// is deleted through [`Things::delete`](crate::graph::Things::delete);
/// traversal skips endpoints that no longer exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Record id (`rel_...`).
    pub id: String,
    /// Source thing id.
    pub from: String,
    /// Verb name.
    pub verb: String,
    /// Target thing id.
    pub to: String,
    /// Cascade kind of this edge.
    pub cascade: CascadeKind,
    /// Edge payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Milliseconds since the epoch.
    pub created_at: i64,
}

impl Record for Relationship {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Options for [`Relationships::relate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelateOptions {
    /// Cascade kind, `Direct` when unset.
    pub cascade: CascadeKind,
    /// Edge payload.
    pub data: Option<Value>,
}

impl RelateOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cascade kind.
    #[must_use]
    pub const fn cascade(mut self, cascade: CascadeKind) -> Self {
        self.cascade = cascade;
        self
    }

    /// Sets the edge payload.
    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Edge store. Obtained from [`Graph::relationships`].
#[derive(Debug, Clone, Copy)]
pub struct Relationships<'g> {
    pub(crate) graph: &'g Graph,
}

impl Relationships<'_> {
    /// Creates an edge and logs an action named after the verb.
    ///
    /// Duplicate edges are allowed; each call adds a new one.
    pub fn relate(
        &self,
        from: &str,
        verb: &str,
        to: &str,
        options: RelateOptions,
    ) -> CoreResult<Relationship> {
        validate_id(from)?;
        validate_id(verb)?;
        validate_id(to)?;

        let relationship = Relationship {
            id: self.graph.ids.next("rel"),
            from: from.to_string(),
            verb: verb.to_string(),
            to: to.to_string(),
            cascade: options.cascade,
            data: options.data,
            created_at: now_millis(),
        };
        self.graph.relationships.put(&relationship)?;
        self.graph.actions().log(
            ActionEntry::new(verb)
                .from(from)
                .to(to)
                .maybe_data(relationship.data.clone()),
        )?;

        tracing::info!(
            relationship = %relationship.id,
            from,
            verb,
            to,
            cascade = %relationship.cascade,
            "related"
        );
        Ok(relationship)
    }

    /// Removes every `from -[verb]-> to` edge and logs an `un<verb>`
    /// action. Returns whether any edge existed.
    pub fn unrelate(&self, from: &str, verb: &str, to: &str) -> CoreResult<bool> {
        let filter = Filter::and(vec![
            Filter::eq("from", from),
            Filter::eq("verb", verb),
            Filter::eq("to", to),
        ]);
        let removed = self.graph.relationships.delete_where(&filter)?;
        self.graph
            .actions()
            .log(ActionEntry::new(format!("un{verb}")).from(from).to(to))?;

        tracing::info!(from, verb, to, removed, "unrelated");
        Ok(removed > 0)
    }

    /// Gets an edge by id.
    pub fn get(&self, id: &str) -> CoreResult<Option<Relationship>> {
        self.graph.relationships.get(id)
    }

    /// Edges leaving `from`, optionally only those with `verb`, in
    /// creation order.
    pub fn relations_from(&self, from: &str, verb: Option<&str>) -> CoreResult<Vec<Relationship>> {
        self.endpoint("from", from, verb)
    }

    /// Edges arriving at `to`, optionally only those with `verb`, in
    /// creation order.
    pub fn relations_to(&self, to: &str, verb: Option<&str>) -> CoreResult<Vec<Relationship>> {
        self.endpoint("to", to, verb)
    }

    /// Counts every edge.
    pub fn count(&self) -> CoreResult<u64> {
        self.graph.relationships.count(&Filter::all())
    }

    fn endpoint(&self, end: &str, id: &str, verb: Option<&str>) -> CoreResult<Vec<Relationship>> {
        let mut clauses = vec![Filter::eq(end, id)];
        if let Some(verb) = verb {
            clauses.push(Filter::eq("verb", verb));
        }
        self.graph
            .relationships
            .find(&Filter::and(clauses), &QueryOptions::new())
    }
}
