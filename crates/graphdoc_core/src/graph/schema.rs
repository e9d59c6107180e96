//! Schema registries: nouns (thing types) and verbs (relationship kinds).

use crate::collection::{validate_id, Record};
use crate::error::{CoreError, CoreResult};
use crate::graph::Graph;
use crate::ids::now_millis;
use crate::query::{Filter, QueryOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How a verb links its endpoints.
///
/// `Direct` edges are asserted explicitly; `Fuzzy` edges come from a
/// similarity match. The inverse kinds describe the same linkage read
/// from the target back to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CascadeKind {
    /// `->`
    #[default]
    Direct,
    /// `~>`
    Fuzzy,
    /// `<-`
    InverseDirect,
    /// `<~`
    InverseFuzzy,
}

impl CascadeKind {
    /// Every cascade kind.
    pub const ALL: [CascadeKind; 4] = [
        Self::Direct,
        Self::Fuzzy,
        Self::InverseDirect,
        Self::InverseFuzzy,
    ];

    /// Returns the canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Fuzzy => "fuzzy",
            Self::InverseDirect => "inverseDirect",
            Self::InverseFuzzy => "inverseFuzzy",
        }
    }

    /// Returns the arrow notation.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Direct => "->",
            Self::Fuzzy => "~>",
            Self::InverseDirect => "<-",
            Self::InverseFuzzy => "<~",
        }
    }

    /// Returns true for the similarity-driven kinds.
    pub fn is_fuzzy(self) -> bool {
        matches!(self, Self::Fuzzy | Self::InverseFuzzy)
    }

    /// Returns true for the kinds read from target to source.
    pub fn is_inverse(self) -> bool {
        matches!(self, Self::InverseDirect | Self::InverseFuzzy)
    }
}

impl fmt::Display for CascadeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CascadeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.arrow() == s)
            .ok_or_else(|| CoreError::configuration(format!("unknown cascade kind {s:?}")))
    }
}

/// A thing type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Noun {
    /// Unique type name.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form schema document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Milliseconds since the epoch of the latest definition.
    pub created_at: i64,
}

impl Record for Noun {
    fn record_id(&self) -> &str {
        &self.name
    }
}

/// Attributes for [`Nouns::define`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NounDefinition {
    /// Human-readable description.
    pub description: Option<String>,
    /// Free-form schema document.
    pub schema: Option<Value>,
}

impl NounDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the schema document.
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A relationship kind definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verb {
    /// Unique verb name.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cascade kind of edges with this verb.
    #[serde(default)]
    pub cascade: CascadeKind,
    /// Thing types allowed at the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_types: Option<Vec<String>>,
    /// Thing types allowed at the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_types: Option<Vec<String>>,
}

impl Record for Verb {
    fn record_id(&self) -> &str {
        &self.name
    }
}

/// Attributes for [`Verbs::define`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerbDefinition {
    /// Human-readable description.
    pub description: Option<String>,
    /// Cascade kind, `Direct` when unset.
    pub cascade: CascadeKind,
    /// Thing types allowed at the source.
    pub from_types: Option<Vec<String>>,
    /// Thing types allowed at the target.
    pub to_types: Option<Vec<String>>,
}

impl VerbDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the cascade kind.
    #[must_use]
    pub const fn cascade(mut self, cascade: CascadeKind) -> Self {
        self.cascade = cascade;
        self
    }

    /// Sets the allowed source types.
    #[must_use]
    pub fn from_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the allowed target types.
    #[must_use]
    pub fn to_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to_types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

/// Registry of thing types. Obtained from [`Graph::nouns`].
#[derive(Debug, Clone, Copy)]
pub struct Nouns<'g> {
    pub(crate) graph: &'g Graph,
}

impl Nouns<'_> {
    /// Defines (or redefines) a noun. Redefinition overwrites by name but
    /// keeps the original `created_at`.
    pub fn define(&self, name: &str, definition: NounDefinition) -> CoreResult<Noun> {
        validate_id(name)?;
        let created_at = match self.get(name)? {
            Some(existing) => existing.created_at,
            None => now_millis(),
        };
        let noun = Noun {
            name: name.to_string(),
            description: definition.description,
            schema: definition.schema,
            created_at,
        };
        self.graph.nouns.put(&noun)?;
        self.graph
            .noun_cache
            .write()
            .insert(noun.name.clone(), noun.clone());
        tracing::debug!(noun = %noun.name, "defined noun");
        Ok(noun)
    }

    /// Gets a noun by name.
    pub fn get(&self, name: &str) -> CoreResult<Option<Noun>> {
        if let Some(noun) = self.graph.noun_cache.read().get(name) {
            return Ok(Some(noun.clone()));
        }
        let noun = self.graph.nouns.get(name)?;
        if let Some(noun) = &noun {
            self.graph
                .noun_cache
                .write()
                .insert(noun.name.clone(), noun.clone());
        }
        Ok(noun)
    }

    /// Returns every noun in definition order.
    pub fn list(&self) -> CoreResult<Vec<Noun>> {
        self.graph.nouns.find(&Filter::all(), &QueryOptions::new())
    }

    /// Returns true if a noun with this name is defined.
    pub fn has(&self, name: &str) -> CoreResult<bool> {
        Ok(self.get(name)?.is_some())
    }
}

/// Registry of relationship kinds. Obtained from [`Graph::verbs`].
#[derive(Debug, Clone, Copy)]
pub struct Verbs<'g> {
    pub(crate) graph: &'g Graph,
}

impl Verbs<'_> {
    /// Defines (or redefines) a verb. Redefinition overwrites by name.
    pub fn define(&self, name: &str, definition: VerbDefinition) -> CoreResult<Verb> {
        validate_id(name)?;
        let verb = Verb {
            name: name.to_string(),
            description: definition.description,
            cascade: definition.cascade,
            from_types: definition.from_types,
            to_types: definition.to_types,
        };
        self.graph.verbs.put(&verb)?;
        self.graph
            .verb_cache
            .write()
            .insert(verb.name.clone(), verb.clone());
        tracing::debug!(verb = %verb.name, cascade = %verb.cascade, "defined verb");
        Ok(verb)
    }

    /// Gets a verb by name.
    pub fn get(&self, name: &str) -> CoreResult<Option<Verb>> {
        if let Some(verb) = self.graph.verb_cache.read().get(name) {
            return Ok(Some(verb.clone()));
        }
        let verb = self.graph.verbs.get(name)?;
        if let Some(verb) = &verb {
            self.graph
                .verb_cache
                .write()
                .insert(verb.name.clone(), verb.clone());
        }
        Ok(verb)
    }

    /// Returns every verb in definition order.
    pub fn list(&self) -> CoreResult<Vec<Verb>> {
        self.graph.verbs.find(&Filter::all(), &QueryOptions::new())
    }

    /// Returns true if a verb with this name is defined.
    pub fn has(&self, name: &str) -> CoreResult<bool> {
        Ok(self.get(name)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cascade_names_and_arrows() {
        for kind in CascadeKind::ALL {
            assert_eq!(kind.as_str().parse::<CascadeKind>().unwrap(), kind);
            assert_eq!(kind.arrow().parse::<CascadeKind>().unwrap(), kind);
        }
        assert!("sideways".parse::<CascadeKind>().is_err());
        assert!(CascadeKind::InverseFuzzy.is_fuzzy());
        assert!(CascadeKind::InverseFuzzy.is_inverse());
        assert!(!CascadeKind::Direct.is_fuzzy());
    }

    #[test]
    fn cascade_serializes_camel_case() {
        assert_eq!(
            serde_json::to_value(CascadeKind::InverseDirect).unwrap(),
            json!("inverseDirect")
        );
        assert_eq!(CascadeKind::default(), CascadeKind::Direct);
    }

    #[test]
    fn define_noun_upserts() {
        let graph = Graph::open_in_memory().unwrap();
        let first = graph
            .nouns()
            .define("User", NounDefinition::new().description("a person"))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let noun = graph
            .nouns()
            .define("User", NounDefinition::new().schema(json!({"name": "string"})))
            .unwrap();

        assert_eq!(noun.description, None);
        assert_eq!(noun.created_at, first.created_at);
        assert_eq!(graph.nouns().get("User").unwrap(), Some(noun));
        assert_eq!(graph.nouns().list().unwrap().len(), 1);
        assert!(graph.nouns().has("User").unwrap());
        assert!(!graph.nouns().has("Ghost").unwrap());
    }

    #[test]
    fn redefinition_keeps_created_at_of_stored_noun() {
        let graph = Graph::open_in_memory().unwrap();
        let first = graph.nouns().define("Order", NounDefinition::new()).unwrap();

        // A second graph on the same store starts with an empty cache.
        let reopened = Graph::new(graph.store);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let noun = reopened
            .nouns()
            .define("Order", NounDefinition::new().description("a purchase"))
            .unwrap();
        assert_eq!(noun.created_at, first.created_at);
        assert_eq!(
            reopened.nouns().get("Order").unwrap().unwrap().description.as_deref(),
            Some("a purchase")
        );
    }

    #[test]
    fn define_verb_with_types() {
        let graph = Graph::open_in_memory().unwrap();
        let verb = graph
            .verbs()
            .define(
                "worksAt",
                VerbDefinition::new()
                    .cascade(CascadeKind::Fuzzy)
                    .from_types(["User"])
                    .to_types(["Company"]),
            )
            .unwrap();

        assert_eq!(verb.cascade, CascadeKind::Fuzzy);
        assert_eq!(verb.from_types.as_deref(), Some(&["User".to_string()][..]));
        assert_eq!(graph.verbs().get("worksAt").unwrap(), Some(verb));
        assert_eq!(graph.verbs().list().unwrap().len(), 1);
    }

    #[test]
    fn registry_reads_through_to_storage() {
        let graph = Graph::open_in_memory().unwrap();
        graph.verbs().define("owns", VerbDefinition::new()).unwrap();
        graph.verb_cache.write().clear();
        assert!(graph.verbs().has("owns").unwrap());
        assert!(graph.verb_cache.read().contains_key("owns"));
    }

    #[test]
    fn empty_names_rejected() {
        let graph = Graph::open_in_memory().unwrap();
        let err = graph.nouns().define("", NounDefinition::new()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidId { .. }));
    }
}
