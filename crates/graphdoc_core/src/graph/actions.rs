//! Append-only audit log.

use crate::collection::Record;
use crate::error::CoreResult;
use crate::graph::Graph;
use crate::ids::now_millis;
use crate::query::{Filter, QueryOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An immutable record of an event affecting the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Record id (`act_...`).
    pub id: String,
    /// What happened: `created`, `updated`, `deleted`, a relationship
    /// verb, or `un` + a relationship verb.
    pub verb: String,
    /// Source thing, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Target thing, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Event payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Actor responsible for the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Milliseconds since the epoch.
    pub at: i64,
}

impl Record for Action {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Builder for [`Actions::log`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionEntry {
    verb: String,
    from: Option<String>,
    to: Option<String>,
    data: Option<Value>,
    by: Option<String>,
}

impl ActionEntry {
    /// Starts an entry for `verb`.
    #[must_use]
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            ..Self::default()
        }
    }

    /// Sets the source.
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the target.
    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the payload if one is given.
    #[must_use]
    pub fn maybe_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Sets the actor.
    #[must_use]
    pub fn by(mut self, by: impl Into<String>) -> Self {
        self.by = Some(by.into());
        self
    }
}

/// The audit log. Obtained from [`Graph::actions`].
///
/// Actions are only ever appended; this layer never changes or removes
/// them.
#[derive(Debug, Clone, Copy)]
pub struct Actions<'g> {
    pub(crate) graph: &'g Graph,
}

impl Actions<'_> {
    /// Appends an action stamped with a fresh id and the current time.
    pub fn log(&self, entry: ActionEntry) -> CoreResult<Action> {
        let action = Action {
            id: self.graph.ids.next("act"),
            verb: entry.verb,
            from: entry.from,
            to: entry.to,
            data: entry.data,
            by: entry.by,
            at: now_millis(),
        };
        self.graph.actions.put(&action)?;
        tracing::trace!(action = %action.id, verb = %action.verb, "logged action");
        Ok(action)
    }

    /// Gets an action by id.
    pub fn get(&self, id: &str) -> CoreResult<Option<Action>> {
        self.graph.actions.get(id)
    }

    /// Returns the actions matching a JSON filter, in append order unless sorted.
    pub fn find(&self, filter: &Value, options: &QueryOptions) -> CoreResult<Vec<Action>> {
        let filter = Filter::parse(filter, self.graph.store.config().strict_filters)?;
        self.graph.actions.find(&filter, options)
    }

    /// Returns every action whose `from` or `to` is `id`, in append order.
    pub fn for_thing(&self, id: &str) -> CoreResult<Vec<Action>> {
        let filter = Filter::or(vec![Filter::eq("from", id), Filter::eq("to", id)]);
        self.graph.actions.find(&filter, &QueryOptions::new())
    }

    /// Counts the actions matching a JSON filter. `Value::Null` counts all.
    pub fn count(&self, filter: &Value) -> CoreResult<u64> {
        let filter = Filter::parse(filter, self.graph.store.config().strict_filters)?;
        self.graph.actions.count(&filter)
    }
}
