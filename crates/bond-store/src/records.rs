//! Typed records for each dataset family
//!
//! Every optional column is an explicit `Option` so that template code can
//! render missing values as the literal `N/A` instead of failing on a
//! dynamic field access.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Platforms the finder dataset is sourced from
pub const PLATFORMS: [&str; 2] = ["SMEST", "FixedIncome"];

/// Date formats accepted for the redemption-date column, tried in order
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];

/// Render an optional text field, substituting `N/A` when absent
pub fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "N/A",
    }
}

/// Render an optional numeric field, substituting `N/A` when absent
pub fn num_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// One row of the bond directory dataset, keyed by ISIN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondRecord {
    pub isin: String,
    pub issuer_name: String,
    #[serde(default)]
    pub issuer_type: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub coupon_rate: Option<f64>,
    #[serde(default)]
    pub instrument_name: Option<String>,
    #[serde(default)]
    pub face_value: Option<f64>,
    /// Total issue size in crores
    #[serde(default)]
    pub issue_size: Option<f64>,
    #[serde(default)]
    pub redemption_date: Option<String>,
    #[serde(default)]
    pub credit_rating: Option<String>,
    #[serde(default)]
    pub listing_details: Option<String>,
    #[serde(default)]
    pub key_documents: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub security_type: Option<String>,
}

impl BondRecord {
    /// Parse the redemption date; `None` when the column is absent or
    /// unparsable (such rows are excluded from date filters, not errors)
    pub fn redemption(&self) -> Option<NaiveDate> {
        let raw = self.redemption_date.as_deref()?.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }

    /// Year component of the redemption date, if parsable
    pub fn redemption_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.redemption().map(|d| d.year())
    }

    /// Whether the bond is still active (status column, case-insensitive)
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("active"))
    }
}

/// One row of the cross-platform finder dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderRecord {
    pub issuer: String,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub yield_min: Option<f64>,
    #[serde(default)]
    pub yield_max: Option<f64>,
    #[serde(default)]
    pub term_years: Option<u32>,
    #[serde(default)]
    pub available_on_smest: bool,
    #[serde(default)]
    pub available_on_fixedincome: bool,
}

impl FinderRecord {
    /// Names of the platforms this listing is available on
    pub fn platforms(&self) -> Vec<&'static str> {
        let mut platforms = Vec::new();
        if self.available_on_smest {
            platforms.push(PLATFORMS[0]);
        }
        if self.available_on_fixedincome {
            platforms.push(PLATFORMS[1]);
        }
        platforms
    }

    /// Rendered yield range, e.g. `9.5%-10.2%`
    pub fn yield_range(&self) -> String {
        format!(
            "{}%-{}%",
            num_or_na(self.yield_min),
            num_or_na(self.yield_max)
        )
    }
}

/// One row of the company master dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_name: String,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Semicolon-separated strengths
    #[serde(default)]
    pub pros: Option<String>,
    /// Semicolon-separated weaknesses
    #[serde(default)]
    pub cons: Option<String>,
    /// Semicolon-separated lender names, most significant first
    #[serde(default)]
    pub lenders: Option<String>,
}

impl CompanyRecord {
    /// Split a semicolon-separated list column into trimmed items
    pub fn split_list(column: Option<&str>) -> Vec<&str> {
        column
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Financial metric columns, one variant per column
///
/// The enum keeps metric access exhaustive at compile time: adding a column
/// without wiring its accessor and label is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Eps,
    CurrentRatio,
    DebtEquity,
    DebtEbitda,
    InterestCoverage,
    OperatingCashflow,
    Roe,
    Roa,
}

impl Metric {
    /// Human-readable metric name used in rendered messages
    pub fn label(self) -> &'static str {
        match self {
            Self::Eps => "EPS",
            Self::CurrentRatio => "Current Ratio",
            Self::DebtEquity => "Debt/Equity",
            Self::DebtEbitda => "Debt/EBITDA",
            Self::InterestCoverage => "Interest Coverage Ratio",
            Self::OperatingCashflow => "Operating Cashflow",
            Self::Roe => "ROE",
            Self::Roa => "ROA",
        }
    }
}

/// One row of the financial metrics dataset, keyed by company name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub company_name: String,
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub debt_equity: Option<f64>,
    #[serde(default)]
    pub debt_ebitda: Option<f64>,
    #[serde(default)]
    pub interest_coverage: Option<f64>,
    #[serde(default)]
    pub operating_cashflow: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub roa: Option<f64>,
}

impl FinancialRecord {
    /// Value of one metric column, `None` when the column is empty
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Eps => self.eps,
            Metric::CurrentRatio => self.current_ratio,
            Metric::DebtEquity => self.debt_equity,
            Metric::DebtEbitda => self.debt_ebitda,
            Metric::InterestCoverage => self.interest_coverage,
            Metric::OperatingCashflow => self.operating_cashflow,
            Metric::Roe => self.roe,
            Metric::Roa => self.roa,
        }
    }
}

/// One row of the news dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub company_name: String,
    #[serde(default)]
    pub date: Option<String>,
    pub headline: String,
    #[serde(default)]
    pub summary: Option<String>,
}
