//! Scripted semantic matcher.

use async_trait::async_trait;
use graphdoc_core::{CoreError, CoreResult, SemanticMatcher, SimilarMatch, Thing};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One recorded `find_similar` call.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherCall {
    /// Requested thing type.
    pub thing_type: String,
    /// Query text.
    pub text: String,
    /// Threshold passed by the graph.
    pub threshold: f64,
}

/// A [`SemanticMatcher`] that answers from a script.
///
/// Responses are keyed by `(thing_type, text)`; unscripted queries return
/// no candidates. Every call is recorded.
///
/// ```rust,ignore
/// let matcher = ScriptedMatcher::new()
///     .respond("Company", "ACME Inc", vec![(acme, 0.92)]);
/// let graph = Graph::open_in_memory()?.with_matcher(Arc::new(matcher));
/// ```
#[derive(Debug, Default)]
pub struct ScriptedMatcher {
    responses: HashMap<(String, String), Vec<SimilarMatch>>,
    failure: Option<String>,
    calls: Mutex<Vec<MatcherCall>>,
}

impl ScriptedMatcher {
    /// Creates a matcher with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the candidates returned for `(thing_type, text)`.
    #[must_use]
    pub fn respond(
        mut self,
        thing_type: &str,
        text: &str,
        candidates: Vec<(Thing, f64)>,
    ) -> Self {
        self.responses.insert(
            (thing_type.to_string(), text.to_string()),
            candidates
                .into_iter()
                .map(|(thing, similarity)| SimilarMatch { thing, similarity })
                .collect(),
        );
        self
    }

    /// Makes every call fail with a matcher error.
    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Returns the calls made so far.
    pub fn calls(&self) -> Vec<MatcherCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SemanticMatcher for ScriptedMatcher {
    async fn find_similar(
        &self,
        thing_type: &str,
        text: &str,
        threshold: f64,
    ) -> CoreResult<Vec<SimilarMatch>> {
        self.calls.lock().push(MatcherCall {
            thing_type: thing_type.to_string(),
            text: text.to_string(),
            threshold,
        });
        if let Some(message) = &self.failure {
            return Err(CoreError::matcher(message.clone()));
        }
        Ok(self
            .responses
            .get(&(thing_type.to_string(), text.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
