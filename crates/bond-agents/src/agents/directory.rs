//! Bond directory agent
//!
//! Answers ISIN-keyed detail lookups, issuer issuance listings, criteria
//! filters, maturity-year listings, and synthesized cash-flow schedules over
//! the bond directory dataset.

use crate::cascade::{Cascade, patterns};
use crate::error::AgentResult;
use crate::extract::{Extractor, clamp_query};
use crate::schedule::semiannual_schedule;
use crate::templates::{environment, render};
use async_trait::async_trait;
use bond_core::{Agent, Response, ResponseType, Result as CoreResult};
use bond_store::records::{num_or_na, or_na};
use bond_store::{BondRecord, BondStore, FilterSet, contains_ci};
use minijinja::{Environment, context};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Rows shown in a filtered or maturity preview
const PREVIEW_CAP: usize = 5;

/// Routing signals the orchestrator scores for this agent
const ROUTING_PATTERNS: [&str; 7] = [
    r"isin\s+[a-z0-9]+",
    r"(show|find|get|details|information).+(isin|bond)",
    r"(issuer|coupon|maturity|face\s+value|rating).*bond",
    r"(debenture|trustee)",
    r"(issuances|issued|bonds).+(by|from)",
    r"(cash\s+flow|payment|schedule).+(isin|bond)",
    r"(maturing|maturity|redemption)",
];

/// Agent over the bond directory dataset
pub struct DirectoryAgent {
    store: Arc<BondStore>,
    extractor: Extractor,
    templates: Environment<'static>,
    cascade: Cascade<Self>,
    routing: Vec<Regex>,
}

impl DirectoryAgent {
    pub const NAME: &'static str = "bond-directory";

    /// Build the agent over a loaded directory store
    ///
    /// The specialized ISIN intents precede the bare-ISIN rule: a query
    /// naming both a schedule and an ISIN is a schedule request, not a
    /// detail lookup.
    pub fn new(store: Arc<BondStore>) -> CoreResult<Self> {
        let cascade = Cascade::builder()
            .rule(r"(cash\s*flow|payment|schedule).+isin", Self::cash_flow)
            .rule(r"(document|\bdocs?\b|offer|trust).+isin", Self::documents)
            .rule(r"(listing|listed|exchange|trading).+isin", Self::listing)
            .rule(r"face\s+value.+isin", Self::face_value)
            .rule(r"(security|secured).+isin", Self::security)
            .rule(r"\bisin\b[\s:#]*[a-z0-9]+", Self::isin_lookup)
            .rule(r"(issuances|issued|bonds).+(by|from)", Self::issuer_issuances)
            .rule(r"(find|search|filter).+(bonds|debentures)", Self::filter_bonds)
            .rule(r"(maturing|maturity).+\d{4}", Self::maturity_bonds)
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
            render(&self.templates, "directory_help", context! {})?,
        ))
    }

    fn isin_not_found(&self, isin: &str) -> AgentResult<Response> {
        let message = render(
            &self.templates,
            "error_isin_not_found",
            context! { isin => isin },
        )?;
        Ok(Response::new(ResponseType::Error, message).with_context("isin", isin))
    }

    fn cash_flow_unavailable(&self, isin: &str) -> AgentResult<Response> {
        let message = render(
            &self.templates,
            "error_cash_flow",
            context! { isin => isin },
        )?;
        Ok(Response::new(ResponseType::Error, message).with_context("isin", isin))
    }

    /// Full detail view used by the bare-ISIN rule
    fn isin_details(&self, isin: &str, bond: &BondRecord) -> AgentResult<Response> {
        let message = render(
            &self.templates,
            "isin_details",
            context! {
                isin => isin,
                issuer => bond.issuer_name.as_str(),
                issuer_type => or_na(bond.issuer_type.as_deref()),
                sector => or_na(bond.sector.as_deref()),
                coupon_rate => num_or_na(bond.coupon_rate),
                instrument_name => or_na(bond.instrument_name.as_deref()),
                face_value => num_or_na(bond.face_value),
                issue_size => num_or_na(bond.issue_size),
                redemption_date => or_na(bond.redemption_date.as_deref()),
                credit_rating => or_na(bond.credit_rating.as_deref()),
                listing_details => or_na(bond.listing_details.as_deref()),
                documents => or_na(bond.key_documents.as_deref()),
            },
        )?;
        Ok(Response::new(ResponseType::IsinDetails, message)
            .with_data(serde_json::to_value(bond)?)
            .with_context("isin", isin))
    }

    fn isin_lookup(&self, query: &str) -> AgentResult<Response> {
        let Some(isin) = self.extractor.isin(query) else {
            return self.help();
        };
        let Some(bond) = self.store.by_isin(&isin) else {
            return self.isin_not_found(&isin);
        };

        // A query asserting an owner gets the cross-check, not the details
        let issuers: Vec<&str> = self.store.issuer_names().collect();
        if let Some(asserted) = self.extractor.asserted_issuer(query, &issuers) {
            if !bond.issuer_name.eq_ignore_ascii_case(&asserted) {
                let message = render(
                    &self.templates,
                    "error_mismatch",
                    context! {
                        issuer => asserted.as_str(),
                        correct_issuer => bond.issuer_name.as_str(),
                    },
                )?;
                return Ok(Response::new(ResponseType::Error, message)
                    .with_context("issuer", asserted)
                    .with_context("correct_issuer", bond.issuer_name.clone()));
            }
        }

        self.isin_details(&isin, bond)
    }

    fn issuer_issuances(&self, query: &str) -> AgentResult<Response> {
        let Some(issuer) = self.extractor.issuances_issuer(query) else {
            return self.help();
        };
        let bonds = self.store.by_issuer(&issuer);
        if bonds.is_empty() {
            let message = render(
                &self.templates,
                "error_issuer_not_found",
                context! { issuer => issuer.as_str() },
            )?;
            return Ok(Response::new(ResponseType::Error, message).with_context("issuer", issuer));
        }

        let total = bonds.len();
        let active = bonds.iter().filter(|bond| bond.is_active()).count();
        let mut table = String::new();
        for bond in &bonds {
            table.push_str(&format!(
                "{} | {}% | {} | ₹{} | {} | {} cr\n",
                bond.isin,
                num_or_na(bond.coupon_rate),
                or_na(bond.redemption_date.as_deref()),
                num_or_na(bond.face_value),
                or_na(bond.credit_rating.as_deref()),
                num_or_na(bond.issue_size),
            ));
        }

        let message = render(
            &self.templates,
            "issuer_issuances",
            context! {
                issuer => issuer.as_str(),
                total_bonds => total,
                active_bonds => active,
                matured_bonds => total - active,
                isins_table => table.trim_end(),
            },
        )?;
        Ok(Response::new(ResponseType::IssuerIssuances, message)
            .with_data(serde_json::to_value(&bonds)?)
            .with_count(total)
            .with_context("issuer", issuer))
    }

    fn filter_bonds(&self, query: &str) -> AgentResult<Response> {
        let mut filters = FilterSet::new();
        if let Some(security) = self.extractor.security_type(query) {
            filters.push(move |bond: &BondRecord| {
                bond.security_type
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(security))
            });
        }
        if let Some(min_coupon) = self.extractor.coupon_above(query) {
            filters.push(move |bond: &BondRecord| {
                bond.coupon_rate.is_some_and(|rate| rate > min_coupon)
            });
        }
        if let Some(after) = self.extractor.maturity_after(query) {
            filters.push(move |bond: &BondRecord| {
                bond.redemption_year().is_some_and(|year| year > after)
            });
        }
        if let Some(rating) = self.extractor.rating(query) {
            filters.push(move |bond: &BondRecord| {
                bond.credit_rating
                    .as_deref()
                    .is_some_and(|r| contains_ci(r, &rating))
            });
        }

        let matches = filters.apply(self.store.rows());
        if matches.is_empty() {
            let message = render(&self.templates, "no_results_criteria", context! {})?;
            return Ok(Response::new(ResponseType::NoResults, message));
        }

        let count = matches.len();
        let message = render(
            &self.templates,
            "filtered_bonds",
            context! {
                count => count,
                bonds_preview => bond_preview(&matches, PREVIEW_CAP),
            },
        )?;
        Ok(Response::new(ResponseType::FilteredBonds, message)
            .with_data(serde_json::to_value(&matches)?)
            .with_count(count))
    }

    fn maturity_bonds(&self, query: &str) -> AgentResult<Response> {
        let Some(year) = self.extractor.maturity_year(query) else {
            return self.help();
        };
        let mut filters = FilterSet::new();
        filters.push(move |bond: &BondRecord| bond.redemption_year() == Some(year));

        let matches = filters.apply(self.store.rows());
        if matches.is_empty() {
            let message = render(
                &self.templates,
                "no_results_maturity",
                context! { year => year },
            )?;
            return Ok(Response::new(ResponseType::NoResults, message).with_context("year", year));
        }

        let count = matches.len();
        let message = render(
            &self.templates,
            "maturity_bonds",
            context! {
                count => count,
                year => year,
                bonds_preview => bond_preview(&matches, PREVIEW_CAP),
            },
        )?;
        Ok(Response::new(ResponseType::MaturityBonds, message)
            .with_data(serde_json::to_value(&matches)?)
            .with_count(count)
            .with_context("year", year))
    }

    fn cash_flow(&self, query: &str) -> AgentResult<Response> {
        let Some(isin) = self.extractor.isin(query) else {
            return self.help();
        };
        let Some(bond) = self.store.by_isin(&isin) else {
            return self.isin_not_found(&isin);
        };
        let (Some(face_value), Some(coupon_rate), Some(redemption)) =
            (bond.face_value, bond.coupon_rate, bond.redemption())
        else {
            return self.cash_flow_unavailable(&isin);
        };

        let today = chrono::Local::now().date_naive();
        let flows = semiannual_schedule(face_value, coupon_rate, redemption, today);
        if flows.is_empty() {
            return self.cash_flow_unavailable(&isin);
        }

        let mut table = String::new();
        for flow in &flows {
            table.push_str(&format!(
                "{} | ₹{:.2} | {}\n",
                flow.date,
                flow.amount,
                flow.kind.label()
            ));
        }
        let message = render(
            &self.templates,
            "cash_flow_schedule",
            context! {
                isin => isin.as_str(),
                issuer => bond.issuer_name.as_str(),
                schedule_table => table.trim_end(),
            },
        )?;
        Ok(Response::new(ResponseType::CashFlowSchedule, message)
            .with_data(serde_json::to_value(&flows)?)
            .with_count(flows.len())
            .with_context("isin", isin))
    }

    fn documents(&self, query: &str) -> AgentResult<Response> {
        let Some(isin) = self.extractor.isin(query) else {
            return self.help();
        };
        let Some(bond) = self.store.by_isin(&isin) else {
            return self.isin_not_found(&isin);
        };
        let message = render(
            &self.templates,
            "document_links",
            context! {
                isin => isin.as_str(),
                documents => or_na(bond.key_documents.as_deref()),
            },
        )?;
        Ok(Response::new(ResponseType::IsinDetails, message)
            .with_data(serde_json::to_value(bond)?)
            .with_context("isin", isin))
    }

    fn listing(&self, query: &str) -> AgentResult<Response> {
        let Some(isin) = self.extractor.isin(query) else {
            return self.help();
        };
        let Some(bond) = self.store.by_isin(&isin) else {
            return self.isin_not_found(&isin);
        };
        let message = render(
            &self.templates,
            "listing_details",
            context! {
                isin => isin.as_str(),
                listing_details => or_na(bond.listing_details.as_deref()),
                status => or_na(bond.status.as_deref()),
            },
        )?;
        Ok(Response::new(ResponseType::IsinDetails, message)
            .with_data(serde_json::to_value(bond)?)
            .with_context("isin", isin))
    }

    fn face_value(&self, query: &str) -> AgentResult<Response> {
        let Some(isin) = self.extractor.isin(query) else {
            return self.help();
        };
        let Some(bond) = self.store.by_isin(&isin) else {
            return self.isin_not_found(&isin);
        };

        let issuers: Vec<&str> = self.store.issuer_names().collect();
        if let Some(asserted) = self.extractor.asserted_issuer(query, &issuers) {
            if !bond.issuer_name.eq_ignore_ascii_case(&asserted) {
                let message = render(
                    &self.templates,
                    "error_mismatch",
                    context! {
                        issuer => asserted.as_str(),
                        correct_issuer => bond.issuer_name.as_str(),
                    },
                )?;
                return Ok(Response::new(ResponseType::Error, message)
                    .with_context("issuer", asserted)
                    .with_context("correct_issuer", bond.issuer_name.clone()));
            }
        }

        let message = render(
            &self.templates,
            "face_value",
            context! {
                isin => isin.as_str(),
                face_value => num_or_na(bond.face_value),
            },
        )?;
        Ok(Response::new(ResponseType::IsinDetails, message)
            .with_data(serde_json::to_value(bond)?)
            .with_context("isin", isin))
    }

    fn security(&self, query: &str) -> AgentResult<Response> {
        let Some(isin) = self.extractor.isin(query) else {
            return self.help();
        };
        let Some(bond) = self.store.by_isin(&isin) else {
            return self.isin_not_found(&isin);
        };
        let message = render(
            &self.templates,
            "security_details",
            context! {
                isin => isin.as_str(),
                instrument_name => or_na(bond.instrument_name.as_deref()),
                security_type => or_na(bond.security_type.as_deref()),
                issuer => bond.issuer_name.as_str(),
            },
        )?;
        Ok(Response::new(ResponseType::IsinDetails, message)
            .with_data(serde_json::to_value(bond)?)
            .with_context("isin", isin))
    }
}

/// Bullet-point preview of filtered bonds, capped with an exact overflow note
fn bond_preview(bonds: &[&BondRecord], cap: usize) -> String {
    let mut preview = String::new();
    for bond in bonds.iter().take(cap) {
        preview.push_str(&format!(
            "● ISIN: {}\n● Issuer: {}\n● Coupon Rate: {}%\n● Redemption Date: {}\n● Security: {}\n\n",
            bond.isin,
            bond.issuer_name,
            num_or_na(bond.coupon_rate),
            or_na(bond.redemption_date.as_deref()),
            or_na(bond.security_type.as_deref()),
        ));
    }
    if bonds.len() > cap {
        preview.push_str(&format!("... and {} more bonds.\n", bonds.len() - cap));
    }
    preview.trim_end().to_string()
}

#[async_trait]
impl Agent for DirectoryAgent {
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

    fn bond(isin: &str, issuer: &str, status: &str) -> BondRecord {
        BondRecord {
            isin: isin.to_string(),
            issuer_name: issuer.to_string(),
            issuer_type: Some("NBFC".to_string()),
            sector: Some("Financial Services".to_string()),
            coupon_rate: Some(10.4),
            instrument_name: Some("Secured NCD".to_string()),
            face_value: Some(100_000.0),
            issue_size: Some(250.0),
            redemption_date: Some("2027-06-30".to_string()),
            credit_rating: Some("A+".to_string()),
            listing_details: Some("BSE".to_string()),
            key_documents: Some("https://docs.example/offer.pdf".to_string()),
            status: Some(status.to_string()),
            security_type: Some("Secured".to_string()),
        }
    }

    fn agent() -> DirectoryAgent {
        let rows = vec![
            bond("INE123456789", "Ugro Capital Limited", "Active"),
            bond("INE111111111", "Ugro Capital Limited", "Active"),
            bond("INE222222222", "Ugro Capital Limited", "Matured"),
            bond("INE987654321", "Keertana Finserv Limited", "Active"),
        ];
        DirectoryAgent::new(Arc::new(BondStore::from_records(rows))).unwrap()
    }

    #[tokio::test]
    async fn test_isin_details_scenario() {
        let agent = agent();
        let response = agent
            .process_query("Show me details for ISIN INE123456789")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::IsinDetails);
        assert!(response.message.contains("INE123456789"));
        assert!(response.message.contains("Ugro Capital Limited"));
        assert!(response.message.contains("10.4%"));
        assert!(response.data.is_some());
    }

    #[tokio::test]
    async fn test_missing_fields_render_na() {
        let mut sparse = bond("INE555555555", "Akara Capital Advisors", "Active");
        sparse.sector = None;
        sparse.issue_size = None;
        let agent =
            DirectoryAgent::new(Arc::new(BondStore::from_records(vec![sparse]))).unwrap();

        let response = agent
            .process_query("Show me details for ISIN INE555555555")
            .await
            .unwrap();
        assert!(response.message.contains("Sector: N/A"));
        assert!(response.message.contains("₹N/A Cr"));
    }

    #[tokio::test]
    async fn test_isin_not_found() {
        let agent = agent();
        let response = agent
            .process_query("Show me details for ISIN INE000000000")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::Error);
        assert!(
            response
                .message
                .contains("the ISIN INE000000000 was not found")
        );
    }

    #[tokio::test]
    async fn test_issuer_issuances_counts() {
        let agent = agent();
        let response = agent
            .process_query("Show me all issuances by Ugro Capital")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::IssuerIssuances);
        assert!(response.message.contains("3 bonds in total"));
        assert!(response.message.contains("2 are active, and 1 have matured."));
        assert_eq!(response.count, Some(3));
    }

    #[tokio::test]
    async fn test_issuer_mismatch_cross_check() {
        let agent = agent();
        let response = agent
            .process_query("Does ISIN INE123456789 belong to Keertana Finserv?")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::Error);
        assert!(response.message.contains("does not belong to"));
        assert!(response.message.contains("Ugro Capital Limited"));
    }

    #[tokio::test]
    async fn test_matching_assertion_returns_details() {
        let agent = agent();
        let response = agent
            .process_query("Does ISIN INE123456789 belong to Ugro Capital?")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::IsinDetails);
    }

    #[tokio::test]
    async fn test_conjunctive_filter_scenario() {
        // Seven bonds satisfy all three criteria; two are cut from the preview
        let mut rows = Vec::new();
        for i in 0..7 {
            rows.push(bond(
                &format!("INE00000000{i}"),
                "Ugro Capital Limited",
                "Active",
            ));
        }
        let mut unsecured = bond("INE888888888", "Ugro Capital Limited", "Active");
        unsecured.security_type = Some("Unsecured".to_string());
        rows.push(unsecured);
        let mut low_coupon = bond("INE777777777", "Ugro Capital Limited", "Active");
        low_coupon.coupon_rate = Some(9.0);
        rows.push(low_coupon);
        let mut early = bond("INE666666666", "Ugro Capital Limited", "Active");
        early.redemption_date = Some("2025-01-31".to_string());
        rows.push(early);

        let agent = DirectoryAgent::new(Arc::new(BondStore::from_records(rows))).unwrap();
        let response = agent
            .process_query("Find secured debentures with coupon rate above 10% and maturity after 2026")
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::FilteredBonds);
        assert_eq!(response.count, Some(7));
        assert!(response.message.contains("There are 7 bonds"));
        assert!(response.message.contains("... and 2 more bonds."));
        assert_eq!(
            response.data.as_ref().unwrap().as_array().unwrap().len(),
            7
        );
    }

    #[tokio::test]
    async fn test_preview_at_cap_has_no_truncation_notice() {
        let rows: Vec<BondRecord> = (0..5)
            .map(|i| bond(&format!("INE00000000{i}"), "Ugro Capital Limited", "Active"))
            .collect();
        let agent = DirectoryAgent::new(Arc::new(BondStore::from_records(rows))).unwrap();

        let response = agent.process_query("Find secured bonds").await.unwrap();
        assert_eq!(response.count, Some(5));
        assert!(!response.message.contains("more bonds"));
    }

    #[tokio::test]
    async fn test_filter_without_criteria_matches_everything() {
        // Absent roles constrain nothing: every row passes
        let agent = agent();
        let response = agent.process_query("Please find bonds").await.unwrap();
        assert_eq!(response.response_type, ResponseType::FilteredBonds);
        assert_eq!(response.count, Some(4));
    }

    #[tokio::test]
    async fn test_filter_no_results() {
        let agent = agent();
        let response = agent
            .process_query("Find bonds with coupon rate above 99%")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::NoResults);
        assert_eq!(response.message, "No bonds match your specified criteria.");
    }

    #[tokio::test]
    async fn test_maturity_year_listing() {
        let agent = agent();
        let response = agent
            .process_query("Which bonds are maturing in 2027?")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::MaturityBonds);
        assert_eq!(response.count, Some(4));

        let response = agent
            .process_query("Which bonds are maturing in 2031?")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::NoResults);
    }

    #[tokio::test]
    async fn test_cash_flow_rule_precedes_isin_lookup() {
        // Both the schedule rule and the bare-ISIN rule match this query;
        // declaration order decides.
        let mut long_dated = bond("INE123456789", "Ugro Capital Limited", "Active");
        long_dated.redemption_date = Some("2045-06-30".to_string());
        let agent =
            DirectoryAgent::new(Arc::new(BondStore::from_records(vec![long_dated]))).unwrap();
        let response = agent
            .process_query("Show me the cash flow schedule for ISIN INE123456789")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::CashFlowSchedule);
        assert!(response.message.contains("INE123456789"));
        assert!(response.message.contains("Coupon"));
        assert!(response.message.contains("Principal"));
    }

    #[tokio::test]
    async fn test_cash_flow_for_matured_bond_unavailable() {
        let mut matured = bond("INE444444444", "Ugro Capital Limited", "Matured");
        matured.redemption_date = Some("2020-01-01".to_string());
        let agent =
            DirectoryAgent::new(Arc::new(BondStore::from_records(vec![matured]))).unwrap();

        let response = agent
            .process_query("Show me the cash flow schedule for ISIN INE444444444")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::Error);
        assert!(response.message.contains("not available"));
    }

    #[tokio::test]
    async fn test_face_value_lookup() {
        let agent = agent();
        let response = agent
            .process_query("What is the face value for ISIN INE123456789?")
            .await
            .unwrap();
        assert_eq!(response.response_type, ResponseType::IsinDetails);
        assert!(response.message.contains("₹100000"));
    }

    #[tokio::test]
    async fn test_unrecognized_query_falls_back_to_help() {
        let agent = agent();
        let response = agent.process_query("hello there").await.unwrap();
        assert_eq!(response.response_type, ResponseType::GeneralHelp);
        assert!(response.message.contains("ISIN INE123456789"));
    }

    #[tokio::test]
    async fn test_process_query_is_idempotent() {
        let agent = agent();
        let first = agent
            .process_query("Show me all issuances by Ugro Capital")
            .await
            .unwrap();
        let second = agent
            .process_query("Show me all issuances by Ugro Capital")
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
