//! Bond screener agent
//!
//! Company-level analysis over the screener datasets: summaries, single
//! metrics, cross-company metric comparison, strengths/weaknesses, lenders,
//! and recent news.

use crate::cascade::{Cascade, patterns};
use crate::error::AgentResult;
use crate::extract::{Extractor, clamp_query};
use crate::templates::{environment, render};
use async_trait::async_trait;
use bond_core::{Agent, Response, ResponseType, Result as CoreResult};
use bond_store::records::{num_or_na, or_na};
use bond_store::{CompanyRecord, ScreenerStore};
use minijinja::{Environment, context};
use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// News items shown per company
const NEWS_CAP: usize = 5;

const ROUTING_PATTERNS: [&str; 5] = [
    r"(company|financial|analysis|metrics|ratio)",
    r"(eps|debt|equity|ebitda|interest\s+coverage)",
    r"(compare|pros|cons|lenders|news)",
    r"(current\s+ratio|growth\s+rate)",
    r"(summary|sector|industry).+(company|limited|ltd)",
];

/// Agent over the company screener datasets
pub struct ScreenerAgent {
    store: Arc<ScreenerStore>,
    extractor: Extractor,
    templates: Environment<'static>,
    cascade: Cascade<Self>,
    routing: Vec<Regex>,
}

impl ScreenerAgent {
    pub const NAME: &'static str = "bond-screener";

    /// Build the agent over loaded screener stores
    pub fn new(store: Arc<ScreenerStore>) -> CoreResult<Self> {
        let cascade = Cascade::builder()
            .rule(r"(summary|information|about)\s+(for|about|on)\s+", Self::summary)
            .rule(
                r"(what|get|show).+(is|the)\s+(eps|current\s+ratio|debt|interest\s+coverage|operating\s+cash|roe|roa)",
                Self::metric,
            )
            .rule(
                r"compare.+(eps|current\s+ratio|debt|interest\s+coverage|operating\s+cash|roe|roa)",
                Self::compare,
            )
            .rule(r"(pros|cons|strengths|weaknesses)", Self::pros_cons)
            .rule(r"(lenders|lent|borrowed|loan)", Self::lenders)
            .rule(r"(news|recent|updates|articles)", Self::news)
            .build()?;

        Ok(Self {
            store,
            extractor: Extractor::new()?,
            templates: environment()?,
            cascade,
            routing: patterns(&ROUTING_PATTERNS)?,
        })
    }

    fn known_names(&self) -> Vec<&str> {
        self.store.company_names().collect()
    }

    fn help(&self) -> AgentResult<Response> {
        Ok(Response::new(
            ResponseType::GeneralHelp,
            render(&self.templates, "screener_help", context! {})?,
        ))
    }

    fn company_not_found(&self, company: &str) -> AgentResult<Response> {
        let message = render(
            &self.templates,
            "error_company_not_found",
            context! { company_name => company },
        )?;
        Ok(Response::new(ResponseType::Error, message).with_context("company_name", company))
    }

    fn summary(&self, query: &str) -> AgentResult<Response> {
        match self.extractor.company(query, &self.known_names()) {
            Some(company) => self.summary_for(&company),
            // Trigger matched but no known company validated: degrade, don't error
            None => self.help(),
        }
    }

    fn summary_for(&self, company: &str) -> AgentResult<Response> {
        let Some(record) = self.store.company(company) else {
            return self.company_not_found(company);
        };
        let financials = self.store.financials(company);

        let message = render(
            &self.templates,
            "company_summary",
            context! {
                company_name => record.company_name.as_str(),
                rating => or_na(record.rating.as_deref()),
                sector => or_na(record.sector.as_deref()),
                industry => or_na(record.industry.as_deref()),
                eps => num_or_na(financials.and_then(|f| f.eps)),
                current_ratio => num_or_na(financials.and_then(|f| f.current_ratio)),
                debt_equity => num_or_na(financials.and_then(|f| f.debt_equity)),
                debt_ebitda => num_or_na(financials.and_then(|f| f.debt_ebitda)),
                interest_coverage => num_or_na(financials.and_then(|f| f.interest_coverage)),
                company_description => or_na(record.description.as_deref()),
            },
        )?;
        Ok(Response::new(ResponseType::CompanySummary, message)
            .with_data(json!({ "company": record, "financials": financials }))
            .with_context("company_name", record.company_name.clone()))
    }

    fn metric(&self, query: &str) -> AgentResult<Response> {
        let Some(metric) = self.extractor.metric(query) else {
            return self.help();
        };
        let Some(company) = self.extractor.company(query, &self.known_names()) else {
            return self.help();
        };
        let Some(financials) = self.store.financials(&company) else {
            return self.company_not_found(&company);
        };

        let value = num_or_na(financials.metric(metric));
        let message = render(
            &self.templates,
            "company_metric",
            context! {
                metric_name => metric.label(),
                company_name => company.as_str(),
                metric_value => value.as_str(),
            },
        )?;
        Ok(Response::new(ResponseType::CompanyMetric, message)
            .with_data(json!({
                "company_name": company,
                "metric": metric,
                "value": financials.metric(metric),
            }))
            .with_context("company_name", company)
            .with_context("metric_name", metric.label()))
    }

    fn compare(&self, query: &str) -> AgentResult<Response> {
        let Some(metric) = self.extractor.metric(query) else {
            return self.help();
        };
        let companies = self.extractor.companies(query, &self.known_names());
        if companies.len() < 2 {
            return self.help();
        }

        let values: Vec<(String, Option<f64>)> = companies
            .iter()
            .map(|company| {
                let value = self
                    .store
                    .financials(company)
                    .and_then(|f| f.metric(metric));
                (company.clone(), value)
            })
            .collect();

        let mut rows = String::new();
        for (company, value) in &values {
            rows.push_str(&format!("| {} | {} |\n", company, num_or_na(*value)));
        }
        let conclusion = values
            .iter()
            .filter(|(_, value)| value.is_some())
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(company, _)| format!("{} has the highest {}.", company, metric.label()))
            .unwrap_or_default();

        let message = render(
            &self.templates,
            "compare_metrics",
            context! {
                metric_name => metric.label(),
                dash_line => "-".repeat(metric.label().len().max(3)),
                comparison_rows => rows.trim_end(),
                conclusion => conclusion.as_str(),
            },
        )?;

        let data: Vec<serde_json::Value> = values
            .iter()
            .map(|(company, value)| json!({ "company_name": company, "value": value }))
            .collect();
        Ok(Response::new(ResponseType::CompareMetrics, message)
            .with_data(serde_json::Value::Array(data))
            .with_count(values.len())
            .with_context("metric_name", metric.label()))
    }

    fn pros_cons(&self, query: &str) -> AgentResult<Response> {
        let Some(company) = self.extractor.company(query, &self.known_names()) else {
            return self.help();
        };
        let Some(record) = self.store.company(&company) else {
            return self.company_not_found(&company);
        };

        let message = render(
            &self.templates,
            "pros_cons",
            context! {
                company_name => record.company_name.as_str(),
                pros => bullet_list(CompanyRecord::split_list(record.pros.as_deref())),
                cons => bullet_list(CompanyRecord::split_list(record.cons.as_deref())),
            },
        )?;
        Ok(Response::new(ResponseType::ProsCons, message)
            .with_data(serde_json::to_value(record)?)
            .with_context("company_name", record.company_name.clone()))
    }

    fn lenders(&self, query: &str) -> AgentResult<Response> {
        let Some(company) = self.extractor.company(query, &self.known_names()) else {
            return self.help();
        };
        let Some(record) = self.store.company(&company) else {
            return self.company_not_found(&company);
        };

        let lenders = CompanyRecord::split_list(record.lenders.as_deref());
        let top: Vec<&str> = lenders.iter().copied().take(3).collect();
        let message = render(
            &self.templates,
            "lenders_list",
            context! {
                company_name => record.company_name.as_str(),
                lenders_list => bullet_list(lenders.clone()),
                top_lenders => if top.is_empty() { "N/A".to_string() } else { top.join(", ") },
            },
        )?;
        Ok(Response::new(ResponseType::LendersList, message)
            .with_data(serde_json::to_value(&lenders)?)
            .with_count(lenders.len())
            .with_context("company_name", record.company_name.clone()))
    }

    fn news(&self, query: &str) -> AgentResult<Response> {
        let Some(company) = self.extractor.company(query, &self.known_names()) else {
            return self.help();
        };
        let items = self.store.news(&company);
        if items.is_empty() {
            let message = render(
                &self.templates,
                "no_results_news",
                context! { company_name => company.as_str() },
            )?;
            return Ok(Response::new(ResponseType::NoResults, message)
                .with_context("company_name", company));
        }

        let mut lines = String::new();
        for item in items.iter().take(NEWS_CAP) {
            lines.push_str(&format!(
                "- {}: {}",
                or_na(item.date.as_deref()),
                item.headline
            ));
            if let Some(summary) = &item.summary {
                lines.push_str(&format!(" ({summary})"));
            }
            lines.push('\n');
        }
        if items.len() > NEWS_CAP {
            lines.push_str(&format!("... and {} more articles.\n", items.len() - NEWS_CAP));
        }

        let message = render(
            &self.templates,
            "recent_news",
            context! {
                company_name => company.as_str(),
                news_items => lines.trim_end(),
            },
        )?;
        Ok(Response::new(ResponseType::RecentNews, message)
            .with_data(serde_json::to_value(&items)?)
            .with_count(items.len())
            .with_context("company_name", company))
    }
}

/// Dash-bulleted list, `N/A` when empty
fn bullet_list(items: Vec<&str>) -> String {
    if items.is_empty() {
        return "N/A".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Agent for ScreenerAgent {
    async fn process_query(&self, query: &str) -> CoreResult<Response> {
        let query = clamp_query(query);
        debug!(agent = Self::NAME, query, "processing query");
        if let Some(result) = self.cascade.dispatch(self, query) {
            return Ok(result?);
        }
        // A bare company mention still earns a summary; anything else, help
        match self.extractor.company(query, &self.known_names()) {
            Some(company) => Ok(self.summary_for(&company)?),
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
    use bond_store::{FinancialRecord, NewsRecord};

    fn store() -> ScreenerStore {
        ScreenerStore::from_records(
            vec![
                CompanyRecord {
                    company_name: "Ugro Capital Limited".to_string(),
                    rating: Some("A+".to_string()),
                    sector: Some("Financial Services".to_string()),
                    industry: Some("NBFC".to_string()),
                    description: Some("Lends to small businesses across sectors.".to_string()),
                    pros: Some("Granular loan book;Strong capital adequacy".to_string()),
                    cons: Some("High cost of funds".to_string()),
                    lenders: Some("SBI;HDFC Bank;ICICI Bank;Axis Bank".to_string()),
                },
                CompanyRecord {
                    company_name: "Keertana Finserv Limited".to_string(),
                    rating: Some("BBB+".to_string()),
                    sector: Some("Financial Services".to_string()),
                    industry: Some("NBFC".to_string()),
                    description: None,
                    pros: None,
                    cons: None,
                    lenders: None,
                },
            ],
            vec![
                FinancialRecord {
                    company_name: "Ugro Capital Limited".to_string(),
                    eps: Some(14.2),
                    current_ratio: Some(1.8),
                    debt_equity: Some(2.1),
                    debt_ebitda: Some(4.3),
                    interest_coverage: Some(1.9),
                    operating_cashflow: Some(312.0),
                    roe: Some(8.4),
                    roa: Some(2.2),
                },
                FinancialRecord {
                    company_name: "Keertana Finserv Limited".to_string(),
                    eps: Some(9.1),
                    current_ratio: None,
                    debt_equity: Some(3.4),
                    debt_ebitda: None,
                    interest_coverage: None,
                    operating_cashflow: None,
                    roe: None,
                    roa: None,
                },
            ],
            vec![
                NewsRecord {
                    company_name: "Ugro Capital Limited".to_string(),
                    date: Some("2025-04-02".to_string()),
                    headline: "Ugro raises fresh equity".to_string(),
                    summary: Some("Capital adequacy improves".to_string()),
                },
                NewsRecord {
                    company_name: "Ugro Capital Limited".to_string(),
                    date: Some("2025-06-15".to_string()),
                    headline: "Ugro expands branch network".to_string(),
                    summary: None,
                },
            ],
        )
    }

    fn agent() -> ScreenerAgent {
        ScreenerAgent::new(Arc::new(store())).unwrap()
    }

    #[tokio::test]
    async fn test_company_summary() {
        let agent = agent();
        let response = agent
            .process_query("Give me a summary for Ugro Capital Limited")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::CompanySummary);
        assert!(response.message.contains("Summary for Ugro Capital Limited"));
        assert!(response.message.contains("EPS: 14.2"));
        assert!(response.message.contains("Lends to small businesses"));
    }

    #[tokio::test]
    async fn test_bare_company_mention_falls_back_to_summary() {
        let agent = agent();
        let response = agent.process_query("Keertana Finserv").await.unwrap();

        assert_eq!(response.response_type, ResponseType::CompanySummary);
        // Missing metrics render as N/A
        assert!(response.message.contains("Current Ratio: N/A"));
    }

    #[tokio::test]
    async fn test_single_metric_lookup() {
        let agent = agent();
        let response = agent
            .process_query("What is the EPS for Ugro Capital Limited?")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::CompanyMetric);
        assert_eq!(
            response.message,
            "The EPS for Ugro Capital Limited is 14.2."
        );
    }

    #[tokio::test]
    async fn test_missing_metric_renders_na() {
        let agent = agent();
        let response = agent
            .process_query("What is the interest coverage for Keertana Finserv Limited?")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::CompanyMetric);
        assert!(response.message.contains("is N/A."));
    }

    #[tokio::test]
    async fn test_compare_metric_across_companies() {
        let agent = agent();
        let response = agent
            .process_query("Compare EPS of Ugro Capital and Keertana Finserv")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::CompareMetrics);
        assert!(response.message.contains("| Ugro Capital Limited | 14.2 |"));
        assert!(response.message.contains("| Keertana Finserv Limited | 9.1 |"));
        assert!(
            response
                .message
                .contains("Ugro Capital Limited has the highest EPS.")
        );
        assert_eq!(response.count, Some(2));
    }

    #[tokio::test]
    async fn test_compare_needs_two_companies() {
        let agent = agent();
        let response = agent
            .process_query("Compare EPS of Ugro Capital")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::GeneralHelp);
    }

    #[tokio::test]
    async fn test_pros_cons() {
        let agent = agent();
        let response = agent
            .process_query("What are the pros and cons of Ugro Capital?")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::ProsCons);
        assert!(response.message.contains("- Granular loan book"));
        assert!(response.message.contains("- High cost of funds"));
    }

    #[tokio::test]
    async fn test_lenders_top_three() {
        let agent = agent();
        let response = agent
            .process_query("Who are the lenders of Ugro Capital?")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::LendersList);
        assert!(response.message.contains("- SBI"));
        assert!(
            response
                .message
                .contains("Top 3 lenders: SBI, HDFC Bank, ICICI Bank")
        );
        assert_eq!(response.count, Some(4));
    }

    #[tokio::test]
    async fn test_recent_news() {
        let agent = agent();
        let response = agent
            .process_query("Show me recent news about Ugro Capital")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::RecentNews);
        assert!(response.message.contains("Ugro raises fresh equity"));
        assert!(response.message.contains("(Capital adequacy improves)"));
        assert_eq!(response.count, Some(2));
    }

    #[tokio::test]
    async fn test_no_news_is_no_results() {
        let agent = agent();
        let response = agent
            .process_query("Show me recent news about Keertana Finserv")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::NoResults);
        assert!(
            response
                .message
                .contains("No recent news found for Keertana Finserv Limited.")
        );
    }

    #[tokio::test]
    async fn test_unknown_company_degrades_to_help() {
        let agent = agent();
        let response = agent
            .process_query("Give me a summary for Blargh Corp Limited")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::GeneralHelp);
    }
}
