//! Response message templates
//!
//! All user-facing wording lives here as MiniJinja templates, registered in
//! one environment and parse-validated at agent construction. Handlers
//! pre-render table bodies and `N/A` substitutions in Rust and pass plain
//! string variables; templates only do interpolation.

use crate::error::AgentResult;
use minijinja::Environment;
use serde::Serialize;

const ISIN_DETAILS: &str = "Here are the details for ISIN {{ isin }}:

● Issuer Name: {{ issuer }}
● Type of Issuer: {{ issuer_type }}
● Sector: {{ sector }}
● Coupon Rate: {{ coupon_rate }}%
● Instrument Name: {{ instrument_name }}
● Face Value: ₹{{ face_value }}
● Total Issue Size: ₹{{ issue_size }} Cr
● Redemption Date: {{ redemption_date }}
● Credit Rating: {{ credit_rating }}
● Listing Details: {{ listing_details }}
● Key Documents: {{ documents }}";

const ISSUER_ISSUANCES: &str = "{{ issuer }} has issued {{ total_bonds }} bonds in total.
{{ active_bonds }} are active, and {{ matured_bonds }} have matured.

Table of ISINs:

ISIN | Coupon Rate | Maturity Date | Face Value | Credit Rating | Issuance Size
----|-------------|--------------|-----------|--------------|-------------
{{ isins_table }}";

const FILTERED_BONDS: &str =
    "There are {{ count }} bonds which fit your criteria. Here are some details:

{{ bonds_preview }}";

const MATURITY_BONDS: &str =
    "There are {{ count }} bonds maturing in {{ year }}. Here are some details:

{{ bonds_preview }}";

const CASH_FLOW_SCHEDULE: &str = "Cash flow schedule for ISIN {{ isin }} ({{ issuer }}):

Date | Amount | Payment Type
-----|--------|-------------
{{ schedule_table }}";

const SECURITY_DETAILS: &str =
    "ISIN {{ isin }} ({{ instrument_name }}) is a {{ security_type }} instrument issued by {{ issuer }}.";

const LISTING_DETAILS: &str =
    "ISIN {{ isin }} is listed on: {{ listing_details }}. Current status: {{ status }}.";

const FACE_VALUE: &str = "The face value of ISIN {{ isin }} is ₹{{ face_value }}.";

const DOCUMENT_LINKS: &str = "Key documents for ISIN {{ isin }}:
{{ documents }}";

const ERROR_ISIN_NOT_FOUND: &str = "Sorry, the ISIN {{ isin }} was not found in our database.";

const ERROR_ISSUER_NOT_FOUND: &str =
    "Sorry, no bonds from {{ issuer }} were found in our database.";

const ERROR_MISMATCH: &str =
    "The given ISIN does not belong to {{ issuer }}. It is associated with {{ correct_issuer }}.";

const ERROR_CASH_FLOW: &str = "A cash flow schedule is not available for ISIN {{ isin }}.";

const NO_RESULTS_CRITERIA: &str = "No bonds match your specified criteria.";

const NO_RESULTS_MATURITY: &str = "No bonds are maturing in {{ year }}.";

const DIRECTORY_HELP: &str = "I can help you find information about bonds in our directory. \
You can ask about specific ISINs, issuers, filter bonds by criteria, check maturity dates, \
or get cash flow schedules. For example:

- 'Show me details for ISIN INE123456789'
- 'Show me all issuances by Ugro Capital'
- 'Find secured debentures with coupon rate above 10% and maturity after 2026'
- 'Which bonds are maturing in 2025?'
- 'Show me the cash flow schedule for ISIN INE567890123'";

const FINDER_GENERAL: &str = "Currently showcasing bonds available on SMEST and FixedIncome.

Sample bonds:

Issuer | Rating | Yield | Available at
-------|--------|-------|------------
{{ bonds_table }}";

const PLATFORM_AVAILABILITY: &str =
    "{{ issuer }} bonds available on {{ platforms }} with a yield range of {{ yield_range }}.";

const YIELD_BASED_SEARCH: &str = "Bonds with yield more than {{ min_yield }}%:

Issuer | Rating | Yield | Available at
-------|--------|-------|------------
{{ bonds_table }}";

const BEST_YIELD_COMPARISON: &str =
    "{{ platform }} offers the highest yield at {{ yield_value }}% for {{ term }}-year bonds.";

const RATING_BASED_SEARCH: &str = "Bonds rated {{ rating }}:

Issuer | Rating | Yield | Available at
-------|--------|-------|------------
{{ bonds_table }}";

const ERROR_FINDER_ISSUER: &str = "Bonds from {{ issuer }} are currently not available.";

const NO_RESULTS_YIELD: &str = "No bonds currently offer a yield above {{ min_yield }}%.";

const NO_RESULTS_RATING: &str = "No bonds with a {{ rating }} rating are currently available.";

const NO_RESULTS_TERM: &str = "No {{ term }}-year bonds are currently available.";

const NO_RESULTS_BEST: &str = "No bonds are currently available for a yield comparison.";

const FINDER_HELP: &str = "I can help you find and compare bonds across different platforms. \
You can ask about:

- Bonds available in the bond finder
- Where to buy bonds from a specific issuer
- Bonds with yields above a certain percentage
- Which platform offers the best yield for a specific term
- Bonds with specific credit ratings";

const COMPANY_SUMMARY: &str = "## Summary for {{ company_name }}

**Rating**: {{ rating }}
**Sector**: {{ sector }}
**Industry**: {{ industry }}

### Key Metrics
- EPS: {{ eps }}
- Current Ratio: {{ current_ratio }}
- Debt/Equity: {{ debt_equity }}
- Debt/EBITDA: {{ debt_ebitda }}
- Interest Coverage Ratio: {{ interest_coverage }}

{{ company_description }}";

const COMPANY_METRIC: &str =
    "The {{ metric_name }} for {{ company_name }} is {{ metric_value }}.";

const COMPARE_METRICS: &str = "## Comparison: {{ metric_name }}

| Company | {{ metric_name }} |
|---------|{{ dash_line }}|
{{ comparison_rows }}

{{ conclusion }}";

const PROS_CONS: &str = "## PROS and CONS for {{ company_name }}

### PROS
{{ pros }}

### CONS
{{ cons }}";

const LENDERS_LIST: &str = "## Lenders for {{ company_name }}

{{ lenders_list }}

Top 3 lenders: {{ top_lenders }}";

const RECENT_NEWS: &str = "## Recent News for {{ company_name }}

{{ news_items }}";

const ERROR_COMPANY_NOT_FOUND: &str =
    "Company '{{ company_name }}' was not found in our database.";

const NO_RESULTS_NEWS: &str = "No recent news found for {{ company_name }}.";

const SCREENER_HELP: &str = "I can help you analyze companies in our bond screener. \
You can ask about:

- Company summaries and key metrics
- Specific financial metrics (EPS, Debt/Equity, etc.)
- Compare metrics between companies
- Pros and cons of a company
- Lenders of a company
- Recent news about a company";

/// Build the shared template environment
///
/// Registration parse-validates every template, so wording mistakes fail
/// agent construction instead of the first matching query.
pub(crate) fn environment() -> AgentResult<Environment<'static>> {
    let mut env = Environment::new();
    for (name, source) in [
        ("isin_details", ISIN_DETAILS),
        ("issuer_issuances", ISSUER_ISSUANCES),
        ("filtered_bonds", FILTERED_BONDS),
        ("maturity_bonds", MATURITY_BONDS),
        ("cash_flow_schedule", CASH_FLOW_SCHEDULE),
        ("security_details", SECURITY_DETAILS),
        ("listing_details", LISTING_DETAILS),
        ("face_value", FACE_VALUE),
        ("document_links", DOCUMENT_LINKS),
        ("error_isin_not_found", ERROR_ISIN_NOT_FOUND),
        ("error_issuer_not_found", ERROR_ISSUER_NOT_FOUND),
        ("error_mismatch", ERROR_MISMATCH),
        ("error_cash_flow", ERROR_CASH_FLOW),
        ("no_results_criteria", NO_RESULTS_CRITERIA),
        ("no_results_maturity", NO_RESULTS_MATURITY),
        ("directory_help", DIRECTORY_HELP),
        ("finder_general", FINDER_GENERAL),
        ("platform_availability", PLATFORM_AVAILABILITY),
        ("yield_based_search", YIELD_BASED_SEARCH),
        ("best_yield_comparison", BEST_YIELD_COMPARISON),
        ("rating_based_search", RATING_BASED_SEARCH),
        ("error_finder_issuer", ERROR_FINDER_ISSUER),
        ("no_results_yield", NO_RESULTS_YIELD),
        ("no_results_rating", NO_RESULTS_RATING),
        ("no_results_term", NO_RESULTS_TERM),
        ("no_results_best", NO_RESULTS_BEST),
        ("finder_help", FINDER_HELP),
        ("company_summary", COMPANY_SUMMARY),
        ("company_metric", COMPANY_METRIC),
        ("compare_metrics", COMPARE_METRICS),
        ("pros_cons", PROS_CONS),
        ("lenders_list", LENDERS_LIST),
        ("recent_news", RECENT_NEWS),
        ("error_company_not_found", ERROR_COMPANY_NOT_FOUND),
        ("no_results_news", NO_RESULTS_NEWS),
        ("screener_help", SCREENER_HELP),
    ] {
        env.add_template(name, source)?;
    }
    Ok(env)
}

/// Render one named template with serializable variables
pub(crate) fn render(
    env: &Environment<'static>,
    name: &str,
    vars: impl Serialize,
) -> AgentResult<String> {
    Ok(env.get_template(name)?.render(vars)?)
}
