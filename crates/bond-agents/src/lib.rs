//! Query agents for bond-rs
//!
//! This crate holds the query-understanding core: typed parameter
//! extraction, the first-match-wins rule cascade, the three domain agents
//! (directory, finder, screener), and the orchestrator that scores and
//! dispatches between them.
//!
//! # Architecture
//!
//! Every agent owns an immutable rule table (`Cascade`), a compiled
//! `Extractor`, a template environment, and a read-only store. A query runs
//! through the first matching rule's handler, which extracts parameters,
//! filters the store, and renders a templated message. The `Orchestrator`
//! picks the agent by scoring each agent's routing patterns and wraps the
//! answer with routing metadata.
//!
//! # Example
//!
//! ```rust,ignore
//! use bond_agents::{DirectoryAgent, FinderAgent, Orchestrator, ScreenerAgent};
//! use bond_store::{BondStore, FinderStore, ScreenerStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let bonds = Arc::new(BondStore::load("data/bonds.csv")?);
//! let finder = Arc::new(FinderStore::load("data/bond_finder.csv")?);
//! let screener = Arc::new(ScreenerStore::load(
//!     "data/companies.csv",
//!     "data/financial_metrics.csv",
//!     "data/news.csv",
//! )?);
//!
//! let orchestrator = Orchestrator::builder()
//!     .agent(Arc::new(DirectoryAgent::new(bonds)?))
//!     .agent(Arc::new(FinderAgent::new(finder)?))
//!     .agent(Arc::new(ScreenerAgent::new(screener)?))
//!     .fallback(DirectoryAgent::NAME)
//!     .build()?;
//!
//! let routed = orchestrator
//!     .process_query("Show me details for ISIN INE123456789")
//!     .await?;
//! println!("{}", routed.response.message);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod cascade;
pub mod error;
pub mod extract;
pub mod router;
mod schedule;
mod templates;

pub use agents::{DirectoryAgent, FinderAgent, ScreenerAgent};
pub use error::{AgentError, AgentResult};
pub use extract::{Extractor, MAX_QUERY_LEN, clamp_query};
pub use router::{Orchestrator, RoutedResponse, RoutingDecision};
