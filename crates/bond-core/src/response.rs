//! Response envelope shared by all agents
//!
//! The wire shape is `{response_type, message, data?, count?, ...context}`.
//! The `response_type` tags form a closed set and are part of the
//! compatibility surface; callers dispatch on them, so the serialized
//! strings never change.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Closed set of response tags, one fixed tag per handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Detail view of a single bond, keyed by ISIN
    IsinDetails,
    /// All bonds issued by one issuer
    IssuerIssuances,
    /// Criteria-filtered bond listing
    FilteredBonds,
    /// Bonds redeeming in a given year
    MaturityBonds,
    /// Synthesized coupon/principal payment schedule
    CashFlowSchedule,
    /// A criteria-based filter matched nothing
    NoResults,
    /// Keyed lookup failed or an asserted relationship did not hold
    Error,
    /// Fallback listing example queries
    GeneralHelp,
    /// Platform listing for an issuer (or the general availability sample)
    PlatformAvailability,
    /// Listings above a yield threshold
    YieldBasedSearch,
    /// Highest-yield platform comparison
    BestYieldComparison,
    /// Listings matching a credit rating
    RatingBasedSearch,
    /// Company overview with key metrics
    CompanySummary,
    /// A single financial metric for one company
    CompanyMetric,
    /// One metric across several companies
    CompareMetrics,
    /// Strengths and weaknesses of a company
    ProsCons,
    /// Lenders of a company
    LendersList,
    /// Recent news items about a company
    RecentNews,
}

impl ResponseType {
    /// The serialized wire tag for this response type
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IsinDetails => "isin_details",
            Self::IssuerIssuances => "issuer_issuances",
            Self::FilteredBonds => "filtered_bonds",
            Self::MaturityBonds => "maturity_bonds",
            Self::CashFlowSchedule => "cash_flow_schedule",
            Self::NoResults => "no_results",
            Self::Error => "error",
            Self::GeneralHelp => "general_help",
            Self::PlatformAvailability => "platform_availability",
            Self::YieldBasedSearch => "yield_based_search",
            Self::BestYieldComparison => "best_yield_comparison",
            Self::RatingBasedSearch => "rating_based_search",
            Self::CompanySummary => "company_summary",
            Self::CompanyMetric => "company_metric",
            Self::CompareMetrics => "compare_metrics",
            Self::ProsCons => "pros_cons",
            Self::LendersList => "lenders_list",
            Self::RecentNews => "recent_news",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully rendered answer to one query
///
/// `data` carries the full matched record set on success (even when the
/// rendered message previews only a capped subset), `count` the total match
/// count for listing responses, and `context` any handler-specific fields
/// (`isin`, `issuer`, `company_name`, ...) flattened into the envelope.
///
/// # Example
///
/// ```
/// use bond_core::{Response, ResponseType};
///
/// let resp = Response::new(ResponseType::NoResults, "No bonds match your specified criteria.")
///     .with_count(0);
///
/// assert_eq!(resp.response_type, ResponseType::NoResults);
/// assert_eq!(resp.count, Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Fixed tag identifying the handler family that produced this response
    pub response_type: ResponseType,
    /// Rendered natural-language answer
    pub message: String,
    /// Raw matched record set, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Total match count for listing responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Handler-specific context fields, flattened into the envelope
    #[serde(flatten)]
    pub context: Map<String, Value>,
}

impl Response {
    /// Create a response with a tag and rendered message
    pub fn new(response_type: ResponseType, message: impl Into<String>) -> Self {
        Self {
            response_type,
            message: message.into(),
            data: None,
            count: None,
            context: Map::new(),
        }
    }

    /// Attach the raw matched record set
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach the total match count
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attach a handler-specific context field
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}
