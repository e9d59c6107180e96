//! Versioned graph entities.

use crate::collection::{validate_document, validate_id, Record};
use crate::error::{CoreError, CoreResult};
use crate::graph::actions::ActionEntry;
use crate::graph::Graph;
use crate::ids::now_millis;
use crate::query::{Filter, QueryOptions};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed, versioned entity.
///
/// `version` starts at 1 and grows by one per update. `created_at` never
/// changes after creation; `updated_at` never moves backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    /// Record id, `lowercase(type)_<sortable suffix>` unless supplied.
    pub id: String,
    /// Noun name.
    #[serde(rename = "type")]
    pub thing_type: String,
    /// Payload.
    pub data: Map<String, Value>,
    /// Revision counter.
    pub version: u64,
    /// Milliseconds since the epoch at creation.
    pub created_at: i64,
    /// Milliseconds since the epoch at the latest change.
    pub updated_at: i64,
}

impl Record for Thing {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Entity store. Obtained from [`Graph::things`].
#[derive(Debug, Clone, Copy)]
pub struct Things<'g> {
    pub(crate) graph: &'g Graph,
}

impl Things<'_> {
    /// Creates a thing of `thing_type`, logging a `created` action.
    ///
    /// When `id` is `None` the id is the lowercased type, `_`, and a
    /// time-sortable suffix. A supplied id replaces any thing already
    /// stored under it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if `data` is not an object and `InvalidId`
    /// if the type or a supplied id is empty.
    pub fn create(&self, thing_type: &str, data: Value, id: Option<&str>) -> CoreResult<Thing> {
        validate_document(&data)?;
        if thing_type.is_empty() {
            return Err(CoreError::invalid_id("thing type must not be empty"));
        }
        let id = match id {
            Some(id) => {
                validate_id(id)?;
                id.to_string()
            }
            None => self.graph.ids.next(&thing_type.to_lowercase()),
        };

        let now = now_millis();
        let thing = Thing {
            id,
            thing_type: thing_type.to_string(),
            data: into_object(data),
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.graph.things.put(&thing)?;
        self.graph
            .actions()
            .log(ActionEntry::new("created").to(thing.id.as_str()))?;

        tracing::info!(thing = %thing.id, thing_type = %thing.thing_type, "created thing");
        Ok(thing)
    }

    /// Gets a thing by id.
    pub fn get(&self, id: &str) -> CoreResult<Option<Thing>> {
        self.graph.things.get(id)
    }

    /// Shallow-merges `partial` over the thing's data, logging an
    /// `updated` action. Returns `None` if the thing does not exist.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if `partial` is not an object.
    pub fn update(&self, id: &str, partial: Value) -> CoreResult<Option<Thing>> {
        validate_document(&partial)?;
        let Some(mut thing) = self.graph.things.get(id)? else {
            return Ok(None);
        };

        for (key, value) in into_object(partial.clone()) {
            thing.data.insert(key, value);
        }
        thing.version += 1;
        thing.updated_at = now_millis().max(thing.updated_at);

        self.graph.things.put(&thing)?;
        self.graph
            .actions()
            .log(ActionEntry::new("updated").to(id).data(partial))?;

        tracing::info!(thing = %thing.id, version = thing.version, "updated thing");
        Ok(Some(thing))
    }

    /// Deletes a thing and every relationship touching it, logging a
    /// `deleted` action. Returns false if the thing did not exist.
    pub fn delete(&self, id: &str) -> CoreResult<bool> {
        if !self.graph.things.delete(id)? {
            return Ok(false);
        }

        let incident = Filter::or(vec![Filter::eq("from", id), Filter::eq("to", id)]);
        let edges = self.graph.relationships.delete_where(&incident)?;
        self.graph
            .actions()
            .log(ActionEntry::new("deleted").to(id))?;

        tracing::info!(thing = %id, edges, "deleted thing");
        Ok(true)
    }

    /// Finds things, optionally of one type, whose data matches `data_filter`.
    ///
    /// Field names in `data_filter` are relative to `data`:
    /// `{"age": {"$gt": 30}}` tests `data.age`.
    pub fn find(
        &self,
        thing_type: Option<&str>,
        data_filter: &Value,
        options: &QueryOptions,
    ) -> CoreResult<Vec<Thing>> {
        let data = Filter::parse(data_filter, self.graph.store.config().strict_filters)?
            .prefixed("data");
        let filter = match thing_type {
            Some(t) => Filter::and(vec![Filter::eq("type", t), data]),
            None => data,
        };
        self.graph.things.find(&filter, options)
    }

    /// Counts things, optionally of one type.
    pub fn count(&self, thing_type: Option<&str>) -> CoreResult<u64> {
        self.graph.things.count(&type_filter(thing_type))
    }

    /// Lists every thing.
    pub fn list(&self, options: &QueryOptions) -> CoreResult<Vec<Thing>> {
        self.graph.things.find(&Filter::all(), options)
    }
}

fn type_filter(thing_type: Option<&str>) -> Filter {
    thing_type.map_or_else(Filter::all, |t| Filter::eq("type", t))
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
