//! Typed parameter extraction from free-text queries
//!
//! Each role has an ordered pattern list tried first-match-wins; the first
//! successful capture is normalized (trimmed, ISIN tokens uppercased,
//! numerics parsed) and returned. A non-match is `None`, never an error:
//! the caller treats an absent role as "no constraint".
//!
//! Name extraction is two explicit steps: shape candidates out of the query,
//! then resolve each candidate against the store's known-name column. A
//! candidate no known name contains is discarded, which keeps stray words
//! from being treated as entity names.

use crate::cascade::{pattern, patterns};
use crate::error::AgentResult;
use bond_store::{Metric, contains_ci};
use regex::Regex;

/// Queries are truncated to this many characters before any matching
pub const MAX_QUERY_LEN: usize = 512;

/// Extracted years outside this range are treated as absent
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Truncate pathological input on a char boundary before matching
pub fn clamp_query(query: &str) -> &str {
    match query.char_indices().nth(MAX_QUERY_LEN) {
        Some((idx, _)) => &query[..idx],
        None => query,
    }
}

/// Credit grades accepted by the rating role, longest-first so `AA+` never
/// captures as `A`
const GRADE: &str = r"(?:aaa|aa|a|bbb|bb|b|ccc|cc|c|d)[+-]?";

/// Per-role pattern tables, compiled once at agent construction
pub struct Extractor {
    isin: Vec<Regex>,
    asserted_issuer: Vec<Regex>,
    issuances_issuer: Regex,
    platform_issuer: Vec<Regex>,
    maturity_year: Vec<Regex>,
    maturity_after: Regex,
    threshold: Regex,
    coupon_above: Regex,
    unsecured: Regex,
    secured: Regex,
    rating: Vec<Regex>,
    term_years: Regex,
    metric: Regex,
    company: Vec<Regex>,
    company_pair: Regex,
}

impl Extractor {
    /// Compile every role's pattern table
    pub fn new() -> AgentResult<Self> {
        Ok(Self {
            isin: patterns(&[
                r"\bisin\s*[:#]?\s*([a-z]{2}[a-z0-9]{10})\b",
                r"\b(ine[a-z0-9]{9})\b",
            ])?,
            asserted_issuer: patterns(&[
                r"(?:belongs?\s+to|belonging\s+to|issued\s+by|owned\s+by)\s+([a-z][a-z\s&.]{1,40})",
                r"(?:of|for)\s+(?:the\s+)?([a-z][a-z\s&.]{1,40}?)\s+bonds?\b",
            ])?,
            issuances_issuer: pattern(
                r"(?:issuances|issued|bonds).{0,40}?\b(?:by|from)\s+([a-z][a-z\s&.]{1,40})",
            )?,
            platform_issuer: patterns(&[
                r"(?:buy|purchase|find|get)\s+(?:bonds?\s+)?from\s+([a-z][a-z\s&.]{1,40})",
                r"\bfrom\s+([a-z][a-z\s&.]{1,40})",
            ])?,
            maturity_year: patterns(&[
                r"(?:maturing|maturity|matures?|redemption)\D{0,20}(\d{4})",
                r"\b(\d{4})\b",
            ])?,
            maturity_after: pattern(
                r"(?:maturing|maturity|matures?|redemption)\D{0,20}after\s+(\d{4})",
            )?,
            threshold: pattern(
                r"(?:above|over|more\s+than|greater\s+than|higher\s+than)\s+(\d+(?:\.\d+)?)",
            )?,
            coupon_above: pattern(
                r"coupon[^0-9%]{0,30}(?:above|over|more\s+than|greater\s+than)\s+(\d+(?:\.\d+)?)",
            )?,
            unsecured: pattern(r"\bunsecured\b")?,
            secured: pattern(r"\bsecured\b")?,
            rating: {
                let rated = format!(r"\brated\s+(?:as\s+|with\s+)?({GRADE})(?:[^a-z+-]|$)");
                let rating_of = format!(r"\brating\s+(?:of|as|with)\s+({GRADE})(?:[^a-z+-]|$)");
                patterns(&[rated.as_str(), rating_of.as_str()])?
            },
            term_years: pattern(r"(\d+)[\s-]*year")?,
            metric: pattern(
                r"\b(eps|earnings\s+per\s+share|current\s+ratio|debt\s*[/\\]?\s*equity|debt\s*[/\\]?\s*ebitda|interest\s+coverage(?:\s+ratio)?|operating\s+cash\s*flow|roe|roa)\b",
            )?,
            company: patterns(&[
                r"(?:for|about|on|of)\s+([a-z][a-z\s&.]{1,40}?)\s+(?:company|limited|ltd)\b",
                r"\b([a-z][a-z\s&.]{1,40}?)\s+(?:company|limited|ltd)\b",
                r"\b([a-z][a-z\s&.]{1,40}?)\s+(?:rating|eps|sector|industry|financials|metrics)\b",
            ])?,
            company_pair: pattern(
                r"\b([a-z][a-z\s&.]{1,40}?)\s+(?:company|limited|ltd|and|with|to|vs|versus)\b",
            )?,
        })
    }

    /// ISIN token, uppercased
    pub fn isin(&self, query: &str) -> Option<String> {
        first_capture(&self.isin, query).map(|s| s.to_uppercase())
    }

    /// Issuer the query claims the ISIN belongs to, resolved against the
    /// directory's known issuer names
    ///
    /// Resolution keeps stray captures ("the secured", trailing verbs) from
    /// producing false mismatches; an assertion naming an unknown issuer is
    /// treated as no assertion.
    pub fn asserted_issuer(&self, query: &str, known: &[&str]) -> Option<String> {
        self.asserted_issuer
            .iter()
            .filter_map(|re| capture(re, query))
            .find_map(|candidate| resolve(&candidate, known))
    }

    /// Issuer named in an "issuances by ..." query, raw (not validated)
    pub fn issuances_issuer(&self, query: &str) -> Option<String> {
        capture(&self.issuances_issuer, query)
    }

    /// Issuer named in a "where can I buy ... from ..." query, raw
    pub fn platform_issuer(&self, query: &str) -> Option<String> {
        first_capture(&self.platform_issuer, query)
    }

    /// Maturity year, bounded to a plausible range
    pub fn maturity_year(&self, query: &str) -> Option<i32> {
        first_capture(&self.maturity_year, query).and_then(|raw| bounded_year(&raw))
    }

    /// Year of a "maturity after YYYY" constraint, bounded
    pub fn maturity_after(&self, query: &str) -> Option<i32> {
        capture(&self.maturity_after, query).and_then(|raw| bounded_year(&raw))
    }

    /// Numeric lower bound ("above X", "more than X"); strict downstream
    pub fn threshold(&self, query: &str) -> Option<f64> {
        capture(&self.threshold, query).and_then(|raw| raw.parse().ok())
    }

    /// Coupon-specific lower bound ("coupon rate above X%")
    pub fn coupon_above(&self, query: &str) -> Option<f64> {
        capture(&self.coupon_above, query).and_then(|raw| raw.parse().ok())
    }

    /// Security type named in the query, if any
    pub fn security_type(&self, query: &str) -> Option<&'static str> {
        // "unsecured" first: "secured" is word-bounded out of it, but the
        // order keeps intent explicit
        if self.unsecured.is_match(query) {
            Some("Unsecured")
        } else if self.secured.is_match(query) {
            Some("Secured")
        } else {
            None
        }
    }

    /// Credit grade, uppercased; column matching stays substring-based so
    /// `AA` also covers `AA+`/`AA-`
    pub fn rating(&self, query: &str) -> Option<String> {
        first_capture(&self.rating, query).map(|s| s.to_uppercase())
    }

    /// Term in years ("5-year", "5 year")
    pub fn term_years(&self, query: &str) -> Option<u32> {
        capture(&self.term_years, query).and_then(|raw| raw.parse().ok())
    }

    /// Financial metric named in the query
    pub fn metric(&self, query: &str) -> Option<Metric> {
        capture(&self.metric, query).and_then(|raw| metric_from(&raw))
    }

    /// Company name, resolved to its canonical known-name form
    pub fn company(&self, query: &str, known: &[&str]) -> Option<String> {
        for re in &self.company {
            if let Some(resolved) = capture(re, query).and_then(|c| resolve(&c, known)) {
                return Some(resolved);
            }
        }
        word_scan(query, known).into_iter().next()
    }

    /// All distinct companies mentioned, canonical, in order of appearance
    pub fn companies(&self, query: &str, known: &[&str]) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for caps in self.company_pair.captures_iter(query) {
            if let Some(resolved) = caps
                .get(1)
                .and_then(|m| resolve(&clean_name(m.as_str())?, known))
            {
                push_unique(&mut found, resolved);
            }
        }
        for resolved in word_scan(query, known) {
            push_unique(&mut found, resolved);
        }
        found
    }
}

/// First capture of a single pattern, cleaned
fn capture(re: &Regex, query: &str) -> Option<String> {
    re.captures(query)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean_name(m.as_str()))
}

/// First capture across an ordered pattern list
fn first_capture(table: &[Regex], query: &str) -> Option<String> {
    table.iter().find_map(|re| capture(re, query))
}

/// Trim whitespace and trailing punctuation off a captured value
fn clean_name(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_end_matches(['.', ',']).trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Resolve a candidate to the first known name containing it
fn resolve(candidate: &str, known: &[&str]) -> Option<String> {
    if candidate.len() < 3 {
        return None;
    }
    known
        .iter()
        .find(|name| contains_ci(name, candidate))
        .map(|name| (*name).to_string())
}

/// Corporate suffixes too generic to identify a company on their own
const SUFFIX_WORDS: [&str; 3] = ["company", "limited", "ltd"];

/// Fallback: resolve individual words of the query against known names
fn word_scan(query: &str, known: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for word in query.split_whitespace() {
        let cleaned = word.trim_matches(|c: char| !c.is_alphanumeric());
        if cleaned.len() <= 3 || SUFFIX_WORDS.iter().any(|s| cleaned.eq_ignore_ascii_case(s)) {
            continue;
        }
        if let Some(resolved) = resolve(cleaned, known) {
            push_unique(&mut found, resolved);
        }
    }
    found
}

fn push_unique(found: &mut Vec<String>, name: String) {
    if !found.iter().any(|f| f.eq_ignore_ascii_case(&name)) {
        found.push(name);
    }
}

fn bounded_year(raw: &str) -> Option<i32> {
    raw.parse().ok().filter(|y| YEAR_RANGE.contains(y))
}

/// Map matched metric wording to its column
fn metric_from(raw: &str) -> Option<Metric> {
    let key: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    match key.as_str() {
        "eps" | "earningspershare" => Some(Metric::Eps),
        "currentratio" => Some(Metric::CurrentRatio),
        "debtequity" => Some(Metric::DebtEquity),
        "debtebitda" => Some(Metric::DebtEbitda),
        "interestcoverage" | "interestcoverageratio" => Some(Metric::InterestCoverage),
        "operatingcashflow" => Some(Metric::OperatingCashflow),
        "roe" => Some(Metric::Roe),
        "roa" => Some(Metric::Roa),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new().unwrap()
    }

    const KNOWN: [&str; 3] = [
        "Ugro Capital Limited",
        "Keertana Finserv Limited",
        "Akara Capital Advisors",
    ];

    #[test]
    fn test_isin_uppercased() {
        let ex = extractor();
        assert_eq!(
            ex.isin("show details for isin ine123456789"),
            Some("INE123456789".to_string())
        );
        assert_eq!(
            ex.isin("cash flows of INE040A08849 please"),
            Some("INE040A08849".to_string())
        );
        assert_eq!(ex.isin("what is an isin number"), None);
    }

    #[test]
    fn test_year_bounds() {
        let ex = extractor();
        assert_eq!(ex.maturity_year("bonds maturing in 2025"), Some(2025));
        // Out-of-range years are absent, i.e. no constraint
        assert_eq!(ex.maturity_year("bonds maturing in 9999"), None);
        assert_eq!(ex.maturity_after("maturity after 2026"), Some(2026));
        assert_eq!(ex.maturity_after("maturity before 2026"), None);
    }

    #[test]
    fn test_threshold_and_coupon() {
        let ex = extractor();
        assert_eq!(ex.threshold("bonds with yield more than 8"), Some(8.0));
        assert_eq!(
            ex.coupon_above("secured debentures with coupon rate above 10.5%"),
            Some(10.5)
        );
        assert_eq!(ex.coupon_above("yield above 9"), None);
    }

    #[test]
    fn test_rating_grades() {
        let ex = extractor();
        assert_eq!(ex.rating("bonds rated AA+"), Some("AA+".to_string()));
        assert_eq!(ex.rating("bonds with rating of aa"), Some("AA".to_string()));
        assert_eq!(ex.rating("rated D by the agency"), Some("D".to_string()));
        // "average" must not capture as grade A
        assert_eq!(ex.rating("rated average by users"), None);
    }

    #[test]
    fn test_security_type() {
        let ex = extractor();
        assert_eq!(ex.security_type("find secured debentures"), Some("Secured"));
        assert_eq!(ex.security_type("find unsecured bonds"), Some("Unsecured"));
        assert_eq!(ex.security_type("find bonds"), None);
    }

    #[test]
    fn test_metric_wording_maps_to_columns() {
        let ex = extractor();
        assert_eq!(ex.metric("what is the EPS"), Some(Metric::Eps));
        assert_eq!(ex.metric("show the debt/equity"), Some(Metric::DebtEquity));
        assert_eq!(
            ex.metric("interest coverage ratio for ugro"),
            Some(Metric::InterestCoverage)
        );
        assert_eq!(ex.metric("share price"), None);
    }

    #[test]
    fn test_company_resolution_requires_known_name() {
        let ex = extractor();
        assert_eq!(
            ex.company("give me a summary for Ugro Capital Limited", &KNOWN),
            Some("Ugro Capital Limited".to_string())
        );
        // Bare mention resolves through the word scan
        assert_eq!(
            ex.company("pros and cons of Keertana", &KNOWN),
            Some("Keertana Finserv Limited".to_string())
        );
        // Shape match with no known name behind it yields absent
        assert_eq!(
            ex.company("summary for Nonexistent Corp Limited", &KNOWN),
            None
        );
    }

    #[test]
    fn test_multiple_companies_deduped_and_canonical() {
        let ex = extractor();
        let companies = ex.companies("compare EPS of Ugro Capital and Keertana Finserv", &KNOWN);
        assert_eq!(
            companies,
            vec![
                "Ugro Capital Limited".to_string(),
                "Keertana Finserv Limited".to_string()
            ]
        );
    }

    #[test]
    fn test_asserted_issuer_validated() {
        let ex = extractor();
        let known = KNOWN;
        assert_eq!(
            ex.asserted_issuer("does ISIN INE123456789 belong to Keertana Finserv", &known),
            Some("Keertana Finserv Limited".to_string())
        );
        // Garbage assertion is treated as no assertion
        assert_eq!(
            ex.asserted_issuer("face value of the secured bond ISIN INE123456789", &known),
            None
        );
    }

    #[test]
    fn test_clamp_query_respects_char_boundaries() {
        let long = "₹".repeat(MAX_QUERY_LEN + 50);
        let clamped = clamp_query(&long);
        assert_eq!(clamped.chars().count(), MAX_QUERY_LEN);
    }
}
