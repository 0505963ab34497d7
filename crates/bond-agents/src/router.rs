//! Query orchestrator
//!
//! Scores every registered agent's routing patterns against the query and
//! dispatches to the winner. Routing is total: when nothing matches, the
//! designated fallback agent answers (and its cascade degrades to general
//! help).
//!
//! Selection and confidence deliberately use different granularities:
//! selection counts every pattern occurrence, confidence only which
//! patterns hit at least once. See DESIGN.md for the compatibility note.

use crate::extract::clamp_query;
use bond_core::{Agent, Error, Response, Result as CoreResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Confidence when none of the chosen agent's patterns match
const BASELINE_CONFIDENCE: f64 = 0.5;

/// Where a query was sent, and how sure the router is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub agent_id: String,
    pub confidence: f64,
    pub query: String,
}

/// The final response envelope: routing metadata plus the agent's answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedResponse {
    pub agent_id: String,
    pub confidence: f64,
    pub query: String,
    pub response: Response,
}

/// Routes queries to the highest-scoring registered agent
pub struct Orchestrator {
    agents: Vec<Arc<dyn Agent>>,
    fallback: usize,
}

impl Orchestrator {
    /// Start building an orchestrator
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder {
            agents: Vec::new(),
            fallback: None,
        }
    }

    /// Names of the registered agents, in registration order
    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|agent| agent.name()).collect()
    }

    /// Every occurrence of every routing pattern counts
    fn occurrence_score(agent: &dyn Agent, query: &str) -> usize {
        agent
            .routing_patterns()
            .iter()
            .map(|pattern| pattern.find_iter(query).count())
            .sum()
    }

    /// Boolean per-pattern re-check of the chosen agent
    fn confidence_for(agent: &dyn Agent, query: &str) -> f64 {
        let patterns = agent.routing_patterns();
        if patterns.is_empty() {
            return BASELINE_CONFIDENCE;
        }
        let matched = patterns.iter().filter(|p| p.is_match(query)).count();
        if matched == 0 {
            return BASELINE_CONFIDENCE;
        }
        (BASELINE_CONFIDENCE + (matched as f64 / patterns.len() as f64) * 0.5).min(1.0)
    }

    /// Index of the winning agent plus its confidence
    ///
    /// Strictly-highest occurrence total wins; nonzero ties keep the first
    /// agent in registration order; an all-zero board goes to the fallback.
    fn decide(&self, query: &str) -> (usize, f64) {
        let mut winner = self.fallback;
        let mut best = 0;
        for (idx, agent) in self.agents.iter().enumerate() {
            let score = Self::occurrence_score(agent.as_ref(), query);
            debug!(agent_id = agent.name(), score, "scored agent");
            if score > best {
                best = score;
                winner = idx;
            }
        }
        let confidence = Self::confidence_for(self.agents[winner].as_ref(), query);
        (winner, confidence)
    }

    /// Decide where a query would go without dispatching it
    pub fn route(&self, query: &str) -> RoutingDecision {
        let query = clamp_query(query);
        let (winner, confidence) = self.decide(query);
        RoutingDecision {
            agent_id: self.agents[winner].name().to_string(),
            confidence,
            query: query.to_string(),
        }
    }

    /// Route and dispatch one query
    pub async fn process_query(&self, query: &str) -> CoreResult<RoutedResponse> {
        let query = clamp_query(query);
        let (winner, confidence) = self.decide(query);
        let agent = &self.agents[winner];
        info!(agent_id = agent.name(), confidence, "routing query");

        let response = agent.process_query(query).await?;
        Ok(RoutedResponse {
            agent_id: agent.name().to_string(),
            confidence,
            query: query.to_string(),
            response,
        })
    }
}

/// Builder for [`Orchestrator`]
pub struct OrchestratorBuilder {
    agents: Vec<Arc<dyn Agent>>,
    fallback: Option<String>,
}

impl OrchestratorBuilder {
    /// Register an agent; registration order is the tie-break order
    pub fn agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Designate the fallback agent by name (defaults to the first
    /// registered agent)
    pub fn fallback(mut self, name: impl Into<String>) -> Self {
        self.fallback = Some(name.into());
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if no agents are registered or the designated
    /// fallback names an unknown agent.
    pub fn build(self) -> CoreResult<Orchestrator> {
        if self.agents.is_empty() {
            return Err(Error::InitializationFailed(
                "no agents registered".to_string(),
            ));
        }
        let fallback = match self.fallback {
            None => 0,
            Some(name) => self
                .agents
                .iter()
                .position(|agent| agent.name() == name)
                .ok_or_else(|| {
                    Error::InitializationFailed(format!("unknown fallback agent '{name}'"))
                })?,
        };
        Ok(Orchestrator {
            agents: self.agents,
            fallback,
        })
    }
}
