//! Fuzzy relate: link to a similar existing thing or create one.

use crate::error::{CoreError, CoreResult};
use crate::graph::relationships::{RelateOptions, Relationship};
use crate::graph::schema::CascadeKind;
use crate::graph::things::Thing;
use crate::graph::Graph;
use async_trait::async_trait;
use serde_json::{json, Value};

/// A similarity search over things, injected into a [`Graph`].
///
/// Implementations typically call out to an embedding index, so the
/// search is async. Cancellation and timeouts are the implementation's
/// concern.
#[async_trait]
pub trait SemanticMatcher: Send + Sync {
    /// Returns things of `thing_type` similar to `text`, best first.
    ///
    /// Implementations should only return candidates at or above
    /// `threshold`; the graph checks the threshold again regardless.
    async fn find_similar(
        &self,
        thing_type: &str,
        text: &str,
        threshold: f64,
    ) -> CoreResult<Vec<SimilarMatch>>;
}

/// A candidate returned by a [`SemanticMatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMatch {
    /// The matching thing.
    pub thing: Thing,
    /// Similarity score, higher is closer.
    pub similarity: f64,
}

/// Options for [`Graph::fuzzy_relate`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuzzyOptions {
    /// Minimum similarity for reuse. Falls back to the store default.
    pub threshold: Option<f64>,
}

impl FuzzyOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the threshold.
    #[must_use]
    pub const fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Outcome of [`Graph::fuzzy_relate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRelation {
    /// True if a new thing was created.
    pub created: bool,
    /// The reused or created target.
    pub thing: Thing,
    /// The new edge, always [`CascadeKind::Fuzzy`].
    pub relationship: Relationship,
}

impl Graph {
    /// Relates `from` to the best existing `target_type` thing similar to
    /// `text`, creating one when nothing is close enough.
    ///
    /// The new thing's data is `create_data`, or `{"text": text}` when
    /// none is given. The resulting edge is always fuzzy.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the graph has no matcher, and any
    /// error the matcher reports.
    pub async fn fuzzy_relate(
        &self,
        from: &str,
        verb: &str,
        target_type: &str,
        text: &str,
        create_data: Option<Value>,
        options: FuzzyOptions,
    ) -> CoreResult<FuzzyRelation> {
        let matcher = self
            .matcher
            .as_ref()
            .ok_or_else(|| CoreError::configuration("fuzzy relate requires a semantic matcher"))?;
        let threshold = options
            .threshold
            .unwrap_or_else(|| self.store.config().effective_threshold());

        let candidates = matcher.find_similar(target_type, text, threshold).await?;
        let best = candidates
            .into_iter()
            .filter(|c| c.similarity >= threshold)
            .reduce(|best, c| if c.similarity > best.similarity { c } else { best });

        let (created, thing) = match best {
            Some(found) => {
                tracing::info!(
                    thing = %found.thing.id,
                    similarity = found.similarity,
                    threshold,
                    "fuzzy relate reused thing"
                );
                (false, found.thing)
            }
            None => {
                let data = create_data.unwrap_or_else(|| json!({ "text": text }));
                let thing = self.things().create(target_type, data, None)?;
                tracing::info!(thing = %thing.id, threshold, "fuzzy relate created thing");
                (true, thing)
            }
        };

        let relationship = self.relationships().relate(
            from,
            verb,
            &thing.id,
            RelateOptions::new().cascade(CascadeKind::Fuzzy),
        )?;
        Ok(FuzzyRelation {
            created,
            thing,
            relationship,
        })
    }
}
