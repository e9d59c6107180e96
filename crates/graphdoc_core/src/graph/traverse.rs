//! Edge traversal.

use crate::error::CoreResult;
use crate::graph::relationships::Relationship;
use crate::graph::things::Thing;
use crate::graph::Graph;

impl Graph {
    /// Returns the live things reached from `from` over `verb` edges, in
    /// edge order. Edges whose target no longer exists are skipped.
    pub fn traverse(&self, from: &str, verb: &str) -> CoreResult<Vec<Thing>> {
        let edges = self.relationships().relations_from(from, Some(verb))?;
        self.resolve(edges, |edge| &edge.to)
    }

    /// Returns the live things that reach `to` over `verb` edges, in edge
    /// order. Edges whose source no longer exists are skipped.
    pub fn traverse_back(&self, to: &str, verb: &str) -> CoreResult<Vec<Thing>> {
        let edges = self.relationships().relations_to(to, Some(verb))?;
        self.resolve(edges, |edge| &edge.from)
    }

    fn resolve<F>(&self, edges: Vec<Relationship>, endpoint: F) -> CoreResult<Vec<Thing>>
    where
        F: Fn(&Relationship) -> &String,
    {
        let mut things = Vec::with_capacity(edges.len());
        for edge in &edges {
            match self.things().get(endpoint(edge))? {
                Some(thing) => things.push(thing),
                None => {
                    tracing::trace!(relationship = %edge.id, "skipping dangling edge");
                }
            }
        }
        Ok(things)
    }
}
