//! Core Agent trait definition

use crate::{Response, Result};
use async_trait::async_trait;
use regex::Regex;

/// Core trait that all query agents must implement
///
/// An agent owns an ordered rule cascade over one dataset family. It is
/// stateless per call: the same query against an unchanged store yields the
/// same [`Response`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process a free-text query and produce a typed response
    ///
    /// Unrecognized queries must degrade to a `general_help` response, never
    /// an error. Errors are reserved for internal failures (e.g. template
    /// rendering), not for "no data" conditions.
    async fn process_query(&self, query: &str) -> Result<Response>;

    /// Get the agent's identifier (used as `agent_id` in routing metadata)
    fn name(&self) -> &str;

    /// Patterns the orchestrator scores when deciding where a query belongs
    ///
    /// These are routing signals, deliberately coarser than the agent's own
    /// cascade triggers. Compiled once at construction; the slice order is
    /// fixed for the agent's lifetime.
    fn routing_patterns(&self) -> &[Regex];
}
