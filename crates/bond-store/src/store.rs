//! Read-only dataset stores
//!
//! Each store is loaded once (CSV) or built directly from records (tests),
//! then shared immutably. No query mutates a store.

use crate::error::Result;
use crate::filter::contains_ci;
use crate::load::read_csv;
use crate::records::{BondRecord, CompanyRecord, FinancialRecord, FinderRecord, NewsRecord};
use std::path::Path;

/// The bond directory table, keyed by ISIN
#[derive(Debug, Clone)]
pub struct BondStore {
    rows: Vec<BondRecord>,
}

impl BondStore {
    /// Load the directory dataset from a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            rows: read_csv(path.as_ref())?,
        })
    }

    /// Build a store directly from records
    pub fn from_records(rows: Vec<BondRecord>) -> Self {
        Self { rows }
    }

    /// All rows in load order
    pub fn rows(&self) -> &[BondRecord] {
        &self.rows
    }

    /// Exact-match lookup by ISIN (case-normalized)
    pub fn by_isin(&self, isin: &str) -> Option<&BondRecord> {
        self.rows
            .iter()
            .find(|row| row.isin.eq_ignore_ascii_case(isin))
    }

    /// All bonds whose issuer name contains `issuer` (case-insensitive)
    pub fn by_issuer(&self, issuer: &str) -> Vec<&BondRecord> {
        self.rows
            .iter()
            .filter(|row| contains_ci(&row.issuer_name, issuer))
            .collect()
    }

    /// Known issuer names, for validating extracted name candidates
    pub fn issuer_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.issuer_name.as_str())
    }
}

/// The cross-platform finder table
#[derive(Debug, Clone)]
pub struct FinderStore {
    rows: Vec<FinderRecord>,
}

impl FinderStore {
    /// Load the finder dataset from a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            rows: read_csv(path.as_ref())?,
        })
    }

    /// Build a store directly from records
    pub fn from_records(rows: Vec<FinderRecord>) -> Self {
        Self { rows }
    }

    /// All rows in load order
    pub fn rows(&self) -> &[FinderRecord] {
        &self.rows
    }

    /// All listings whose issuer name contains `issuer` (case-insensitive)
    pub fn by_issuer(&self, issuer: &str) -> Vec<&FinderRecord> {
        self.rows
            .iter()
            .filter(|row| contains_ci(&row.issuer, issuer))
            .collect()
    }

    /// Known issuer names, for validating extracted name candidates
    pub fn issuers(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.issuer.as_str())
    }
}

/// The screener tables: companies, financial metrics, and news, joined by
/// company name
#[derive(Debug, Clone)]
pub struct ScreenerStore {
    companies: Vec<CompanyRecord>,
    financials: Vec<FinancialRecord>,
    news: Vec<NewsRecord>,
}

impl ScreenerStore {
    /// Load the three screener datasets from CSV files
    pub fn load(
        companies: impl AsRef<Path>,
        financials: impl AsRef<Path>,
        news: impl AsRef<Path>,
    ) -> Result<Self> {
        Ok(Self {
            companies: read_csv(companies.as_ref())?,
            financials: read_csv(financials.as_ref())?,
            news: read_csv(news.as_ref())?,
        })
    }

    /// Build a store directly from records
    pub fn from_records(
        companies: Vec<CompanyRecord>,
        financials: Vec<FinancialRecord>,
        news: Vec<NewsRecord>,
    ) -> Self {
        Self {
            companies,
            financials,
            news,
        }
    }

    /// First company whose name contains `name` (case-insensitive)
    pub fn company(&self, name: &str) -> Option<&CompanyRecord> {
        self.companies
            .iter()
            .find(|row| contains_ci(&row.company_name, name))
    }

    /// Financial metrics row for a company, matched the same way
    pub fn financials(&self, name: &str) -> Option<&FinancialRecord> {
        self.financials
            .iter()
            .find(|row| contains_ci(&row.company_name, name))
    }

    /// News items mentioning a company, in dataset order
    pub fn news(&self, name: &str) -> Vec<&NewsRecord> {
        self.news
            .iter()
            .filter(|row| contains_ci(&row.company_name, name))
            .collect()
    }

    /// Known company names, for validating extracted name candidates
    pub fn company_names(&self) -> impl Iterator<Item = &str> {
        self.companies.iter().map(|row| row.company_name.as_str())
    }
}
