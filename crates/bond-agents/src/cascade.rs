//! Ordered, first-match-wins rule cascade
//!
//! Each agent owns one [`Cascade`]: an immutable list of
//! `(trigger pattern, handler)` tuples fixed at construction. Dispatch is a
//! linear scan in declaration order with early return; once a trigger
//! matches, no later rule is evaluated, even if it would also match.

use crate::error::{AgentError, AgentResult};
use bond_core::Response;
use regex::{Regex, RegexBuilder};

/// A rule handler: borrows its agent and the query text
pub type Handler<A> = fn(&A, &str) -> AgentResult<Response>;

/// Compile a case-insensitive trigger or routing pattern
pub fn pattern(source: &str) -> AgentResult<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|err| AgentError::Pattern {
            pattern: source.to_string(),
            source: err,
        })
}

/// Compile an ordered pattern list
pub fn patterns(sources: &[&str]) -> AgentResult<Vec<Regex>> {
    sources.iter().map(|s| pattern(s)).collect()
}

/// An immutable, ordered rule table
pub struct Cascade<A> {
    rules: Vec<(Regex, Handler<A>)>,
}

impl<A> Cascade<A> {
    /// Start building a cascade
    pub fn builder() -> CascadeBuilder<A> {
        CascadeBuilder { rules: Vec::new() }
    }

    /// Number of rules in the table
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the first rule whose trigger matches the query
    ///
    /// Returns `None` when no trigger matched, in which case the agent falls
    /// back to its general-help response.
    pub fn dispatch(&self, agent: &A, query: &str) -> Option<AgentResult<Response>> {
        for (trigger, handler) in &self.rules {
            if trigger.is_match(query) {
                tracing::debug!(trigger = trigger.as_str(), "cascade rule matched");
                return Some(handler(agent, query));
            }
        }
        None
    }
}

/// Builder for [`Cascade`]; patterns are compiled and validated at `build`
pub struct CascadeBuilder<A> {
    rules: Vec<(&'static str, Handler<A>)>,
}

impl<A> CascadeBuilder<A> {
    /// Append a rule; declaration order is evaluation order
    pub fn rule(mut self, trigger: &'static str, handler: Handler<A>) -> Self {
        self.rules.push((trigger, handler));
        self
    }

    /// Compile every trigger and freeze the rule table
    pub fn build(self) -> AgentResult<Cascade<A>> {
        let rules = self
            .rules
            .into_iter()
            .map(|(trigger, handler)| Ok((pattern(trigger)?, handler)))
            .collect::<AgentResult<Vec<_>>>()?;
        Ok(Cascade { rules })
    }
}
