//! Bond finder agent
//!
//! Compares listings across the partner platforms: availability per issuer,
//! yield-threshold searches, best-yield comparisons, and rating-scoped
//! listings.

use crate::cascade::{Cascade, patterns};
use crate::error::AgentResult;
use crate::extract::{Extractor, clamp_query};
use crate::templates::{environment, render};
use async_trait::async_trait;
use bond_core::{Agent, Response, ResponseType, Result as CoreResult};
use bond_store::records::{num_or_na, or_na};
use bond_store::{FilterSet, FinderRecord, FinderStore, contains_ci};
use minijinja::{Environment, context};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Rows shown in a yield- or rating-scoped table
const TABLE_CAP: usize = 10;

/// Issuers shown in the general availability sample
const SAMPLE_CAP: usize = 5;

const ROUTING_PATTERNS: [&str; 6] = [
    r"(available|find|where.+buy).+(bonds|yield)",
    r"(compare|best|highest).+(yield|platform)",
    r"(bonds|yield).+(platform|smest|fixedincome)",
    r"bond\s+finder",
    r"(yield|bonds).+(more|greater|higher|above)\s+than",
    r"(rating|rated)\s+(of|as|with)",
];

/// Agent over the cross-platform finder dataset
pub struct FinderAgent {
    store: Arc<FinderStore>,
    extractor: Extractor,
    templates: Environment<'static>,
    cascade: Cascade<Self>,
    routing: Vec<Regex>,
}

impl FinderAgent {
    pub const NAME: &'static str = "bond-finder";

    /// Build the agent over a loaded finder store
    pub fn new(store: Arc<FinderStore>) -> CoreResult<Self> {
        let cascade = Cascade::builder()
            .rule(r"(show|what).+(available|bonds).+bond\s+finder", Self::general_info)
            .rule(r"(where|which\s+platform).+(buy|purchase|find)", Self::platform_availability)
            .rule(
                r"(yield|bonds).+(more|greater|higher|above)\s+than\s+\d",
                Self::yield_search,
            )
            .rule(r"(best|highest|maximum).+(yield|return)", Self::best_yield)
            .rule(r"(rating|rated)", Self::rating_search)
            .build()?;

        Ok(Self {
            store,
            extractor: Extractor::new()?,
            templates: environment()?,
            cascade,
            routing: patterns(&ROUTING_PATTERNS)?,
        })
    }

    fn help(&self) -> AgentResult<Response> {
        Ok(Response::new(
            ResponseType::GeneralHelp,
            render(&self.templates, "finder_help", context! {})?,
        ))
    }

    /// One sample listing per issuer, platforms named
    fn general_info(&self, _query: &str) -> AgentResult<Response> {
        let mut seen: Vec<&str> = Vec::new();
        let mut sample: Vec<&FinderRecord> = Vec::new();
        for listing in self.store.rows() {
            if seen.iter().any(|s| s.eq_ignore_ascii_case(&listing.issuer)) {
                continue;
            }
            seen.push(&listing.issuer);
            sample.push(listing);
            if sample.len() == SAMPLE_CAP {
                break;
            }
        }

        let message = render(
            &self.templates,
            "finder_general",
            context! { bonds_table => listing_table(&sample, SAMPLE_CAP) },
        )?;
        Ok(Response::new(ResponseType::PlatformAvailability, message)
            .with_data(serde_json::to_value(&sample)?))
    }

    fn platform_availability(&self, query: &str) -> AgentResult<Response> {
        let Some(issuer) = self.extractor.platform_issuer(query) else {
            return self.help();
        };
        let listings = self.store.by_issuer(&issuer);
        if listings.is_empty() {
            let message = render(
                &self.templates,
                "error_finder_issuer",
                context! { issuer => issuer.as_str() },
            )?;
            return Ok(Response::new(ResponseType::Error, message).with_context("issuer", issuer));
        }

        // Union of platforms and the overall yield range across listings
        let mut platforms: Vec<&str> = Vec::new();
        for listing in &listings {
            for platform in listing.platforms() {
                if !platforms.contains(&platform) {
                    platforms.push(platform);
                }
            }
        }
        let low = listings
            .iter()
            .filter_map(|l| l.yield_min)
            .fold(None::<f64>, |acc, y| Some(acc.map_or(y, |a| a.min(y))));
        let high = listings
            .iter()
            .filter_map(|l| l.yield_max)
            .fold(None::<f64>, |acc, y| Some(acc.map_or(y, |a| a.max(y))));

        let message = render(
            &self.templates,
            "platform_availability",
            context! {
                issuer => issuer.as_str(),
                platforms => platforms.join(" and "),
                yield_range => format!("{}%-{}%", num_or_na(low), num_or_na(high)),
            },
        )?;
        Ok(Response::new(ResponseType::PlatformAvailability, message)
            .with_data(serde_json::to_value(&listings)?)
            .with_context("issuer", issuer))
    }

    fn yield_search(&self, query: &str) -> AgentResult<Response> {
        let Some(min_yield) = self.extractor.threshold(query) else {
            return self.help();
        };
        let mut filters = FilterSet::new();
        filters.push(move |listing: &FinderRecord| {
            listing.yield_max.is_some_and(|y| y > min_yield)
        });

        let matches = filters.apply(self.store.rows());
        if matches.is_empty() {
            let message = render(
                &self.templates,
                "no_results_yield",
                context! { min_yield => min_yield },
            )?;
            return Ok(Response::new(ResponseType::NoResults, message)
                .with_context("min_yield", min_yield));
        }

        let count = matches.len();
        let message = render(
            &self.templates,
            "yield_based_search",
            context! {
                min_yield => min_yield,
                bonds_table => listing_table(&matches, TABLE_CAP),
            },
        )?;
        Ok(Response::new(ResponseType::YieldBasedSearch, message)
            .with_data(serde_json::to_value(&matches)?)
            .with_count(count)
            .with_context("min_yield", min_yield))
    }

    fn best_yield(&self, query: &str) -> AgentResult<Response> {
        let term = self.extractor.term_years(query);

        let mut filters = FilterSet::new();
        if let Some(term) = term {
            filters.push(move |listing: &FinderRecord| listing.term_years == Some(term));
        }
        let candidates = filters.apply(self.store.rows());

        let best = candidates
            .iter()
            .filter(|l| l.yield_max.is_some())
            .max_by(|a, b| {
                a.yield_max
                    .partial_cmp(&b.yield_max)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied();

        let Some(best) = best else {
            let message = match term {
                Some(term) => render(
                    &self.templates,
                    "no_results_term",
                    context! { term => term },
                )?,
                None => render(&self.templates, "no_results_best", context! {})?,
            };
            return Ok(Response::new(ResponseType::NoResults, message));
        };

        let platform = best.platforms().first().copied().unwrap_or("N/A");
        let term_label = term
            .map(|t| t.to_string())
            .unwrap_or_else(|| best.term_years.map_or_else(|| "N/A".to_string(), |t| t.to_string()));
        let message = render(
            &self.templates,
            "best_yield_comparison",
            context! {
                platform => platform,
                yield_value => num_or_na(best.yield_max),
                term => term_label,
            },
        )?;
        Ok(Response::new(ResponseType::BestYieldComparison, message)
            .with_data(serde_json::to_value(best)?)
            .with_context("platform", platform))
    }

    fn rating_search(&self, query: &str) -> AgentResult<Response> {
        let Some(rating) = self.extractor.rating(query) else {
            return self.help();
        };
        let mut filters = FilterSet::new();
        // Substring match: AA also covers AA+ and AA- listings
        let wanted = rating.clone();
        filters.push(move |listing: &FinderRecord| {
            listing
                .rating
                .as_deref()
                .is_some_and(|r| contains_ci(r, &wanted))
        });

        let matches = filters.apply(self.store.rows());
        if matches.is_empty() {
            let message = render(
                &self.templates,
                "no_results_rating",
                context! { rating => rating.as_str() },
            )?;
            return Ok(Response::new(ResponseType::NoResults, message)
                .with_context("rating", rating));
        }

        let count = matches.len();
        let message = render(
            &self.templates,
            "rating_based_search",
            context! {
                rating => rating.as_str(),
                bonds_table => listing_table(&matches, TABLE_CAP),
            },
        )?;
        Ok(Response::new(ResponseType::RatingBasedSearch, message)
            .with_data(serde_json::to_value(&matches)?)
            .with_count(count)
            .with_context("rating", rating))
    }
}

/// Pipe table of listings, capped with an exact overflow note
fn listing_table(listings: &[&FinderRecord], cap: usize) -> String {
    let mut table = String::new();
    for listing in listings.iter().take(cap) {
        table.push_str(&format!(
            "{} | {} | {} | {}\n",
            listing.issuer,
            or_na(listing.rating.as_deref()),
            listing.yield_range(),
            listing.platforms().join(", "),
        ));
    }
    if listings.len() > cap {
        table.push_str(&format!(
            "... and {} more listings.\n",
            listings.len() - cap
        ));
    }
    table.trim_end().to_string()
}

#[async_trait]
impl Agent for FinderAgent {
    async fn process_query(&self, query: &str) -> CoreResult<Response> {
        let query = clamp_query(query);
        debug!(agent = Self::NAME, query, "processing query");
        match self.cascade.dispatch(self, query) {
            Some(result) => Ok(result?),
            None => Ok(self.help()?),
        }
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn routing_patterns(&self) -> &[Regex] {
        &self.routing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(
        issuer: &str,
        rating: &str,
        yield_min: f64,
        yield_max: f64,
        term: u32,
    ) -> FinderRecord {
        FinderRecord {
            issuer: issuer.to_string(),
            rating: Some(rating.to_string()),
            yield_min: Some(yield_min),
            yield_max: Some(yield_max),
            term_years: Some(term),
            available_on_smest: true,
            available_on_fixedincome: false,
        }
    }

    fn agent() -> FinderAgent {
        let rows = vec![
            listing("Ugro Capital", "A+", 9.4, 10.2, 2),
            listing("Keertana Finserv", "AA", 9.0, 9.8, 3),
            listing("Akara Capital", "AA+", 10.3, 11.1, 2),
            listing("Navi Finserv", "BBB", 6.6, 7.4, 5),
        ];
        FinderAgent::new(Arc::new(FinderStore::from_records(rows))).unwrap()
    }

    #[tokio::test]
    async fn test_yield_threshold_is_strict() {
        let agent = agent();
        let response = agent.process_query("Bonds with yield more than 8").await.unwrap();

        assert_eq!(response.response_type, ResponseType::YieldBasedSearch);
        // 7.4 is excluded, the other three pass
        assert_eq!(response.count, Some(3));
        assert!(response.message.contains("Bonds with yield more than 8"));
        assert!(!response.message.contains("Navi Finserv"));
    }

    #[tokio::test]
    async fn test_yield_exactly_at_threshold_excluded() {
        let agent = agent();
        let response = agent
            .process_query("Bonds with yield more than 10.2")
            .await
            .unwrap();
        // Strict greater-than: 10.2 itself is out
        assert_eq!(response.count, Some(1));
        assert!(response.message.contains("Akara Capital"));
    }

    #[tokio::test]
    async fn test_yield_table_cap_and_overflow() {
        let rows: Vec<FinderRecord> = (0..12)
            .map(|i| listing(&format!("Issuer {i}"), "A", 8.5, 9.0 + f64::from(i) * 0.1, 2))
            .collect();
        let agent = FinderAgent::new(Arc::new(FinderStore::from_records(rows))).unwrap();

        let response = agent.process_query("Bonds with yield more than 8").await.unwrap();
        assert_eq!(response.count, Some(12));
        assert!(response.message.contains("... and 2 more listings."));

        // Exactly at the cap carries no notice
        let rows: Vec<FinderRecord> = (0..10)
            .map(|i| listing(&format!("Issuer {i}"), "A", 8.5, 9.0 + f64::from(i) * 0.1, 2))
            .collect();
        let agent = FinderAgent::new(Arc::new(FinderStore::from_records(rows))).unwrap();
        let response = agent.process_query("Bonds with yield more than 8").await.unwrap();
        assert_eq!(response.count, Some(10));
        assert!(!response.message.contains("more listings"));
    }

    #[tokio::test]
    async fn test_platform_availability_for_issuer() {
        let agent = agent();
        let response = agent
            .process_query("Where can I buy bonds from Ugro Capital?")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::PlatformAvailability);
        assert!(response.message.contains("Ugro Capital"));
        assert!(response.message.contains("SMEST"));
        assert!(response.message.contains("9.4%-10.2%"));
    }

    #[tokio::test]
    async fn test_unknown_issuer_not_available() {
        let agent = agent();
        let response = agent
            .process_query("Where can I buy bonds from Piramal Finance?")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::Error);
        assert!(
            response
                .message
                .contains("Bonds from Piramal Finance are currently not available.")
        );
    }

    #[tokio::test]
    async fn test_best_yield_with_term() {
        let agent = agent();
        let response = agent
            .process_query("Which platform has the best yield for 2-year bonds?")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::BestYieldComparison);
        assert!(response.message.contains("SMEST"));
        assert!(response.message.contains("11.1%"));
        assert!(response.message.contains("2-year"));
    }

    #[tokio::test]
    async fn test_best_yield_without_term_uses_overall_best() {
        let agent = agent();
        let response = agent.process_query("What is the highest yield available?").await.unwrap();
        assert_eq!(response.response_type, ResponseType::BestYieldComparison);
        assert!(response.message.contains("11.1%"));
    }

    #[tokio::test]
    async fn test_best_yield_unavailable_term() {
        let agent = agent();
        let response = agent
            .process_query("Which platform has the best yield for 9-year bonds?")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::NoResults);
        assert!(response.message.contains("9-year"));
    }

    #[tokio::test]
    async fn test_rating_substring_matches_modifiers() {
        let agent = agent();
        let response = agent
            .process_query("Show bonds with rating of AA")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::RatingBasedSearch);
        // AA is a substring of AA+ as well
        assert_eq!(response.count, Some(2));
        assert!(response.message.contains("Keertana Finserv"));
        assert!(response.message.contains("Akara Capital"));
    }

    #[tokio::test]
    async fn test_general_availability_sample() {
        let agent = agent();
        let response = agent
            .process_query("Show me what bonds are available on the bond finder")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::PlatformAvailability);
        assert!(response.message.contains("SMEST and FixedIncome"));
        assert!(response.message.contains("Ugro Capital"));
    }

    #[tokio::test]
    async fn test_fallback_help() {
        let agent = agent();
        let response = agent.process_query("hello there").await.unwrap();
        assert_eq!(response.response_type, ResponseType::GeneralHelp);
    }
}
