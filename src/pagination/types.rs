//! Page descriptors, filters and query canonicalization
//!
//! A [`PageDescriptor`] names the page to fetch next. [`to_query`] turns it into
//! the ordered list of wire query parameters understood by the account API.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Page size used when the requested size is zero or negative
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Largest row offset or page size a store is asked for
pub const MAX_ROWS: u64 = (1 << 62) - 1;

/// Query parameter carrying the page number
pub const PAGE_NUMBER_PARAM: &str = "page[number]";

/// Query parameter carrying the page size
pub const PAGE_SIZE_PARAM: &str = "page[size]";

// ============================================================================
// Filter Dimensions
// ============================================================================

/// Attribute an account list can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDimension {
    AccountNumber,
    BankId,
    BankIdCode,
    Country,
    CustomerId,
    Iban,
}

impl FilterDimension {
    /// All dimensions in wire order
    pub const ALL: [FilterDimension; 6] = [
        FilterDimension::AccountNumber,
        FilterDimension::BankId,
        FilterDimension::BankIdCode,
        FilterDimension::Country,
        FilterDimension::CustomerId,
        FilterDimension::Iban,
    ];

    /// Attribute name, as used in the account record
    pub fn field(self) -> &'static str {
        match self {
            FilterDimension::AccountNumber => "account_number",
            FilterDimension::BankId => "bank_id",
            FilterDimension::BankIdCode => "bank_id_code",
            FilterDimension::Country => "country",
            FilterDimension::CustomerId => "customer_id",
            FilterDimension::Iban => "iban",
        }
    }

    /// Wire query parameter name, e.g. `filter[country]`
    pub fn param(self) -> &'static str {
        match self {
            FilterDimension::AccountNumber => "filter[account_number]",
            FilterDimension::BankId => "filter[bank_id]",
            FilterDimension::BankIdCode => "filter[bank_id_code]",
            FilterDimension::Country => "filter[country]",
            FilterDimension::CustomerId => "filter[customer_id]",
            FilterDimension::Iban => "filter[iban]",
        }
    }
}

// ============================================================================
// Filter Set
// ============================================================================

/// Filters applied to an account list.
///
/// Dimensions are AND-combined; values within one dimension are OR-combined.
/// An empty value list leaves the dimension out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub account_number: Vec<String>,
    pub bank_id: Vec<String>,
    pub bank_id_code: Vec<String>,
    pub country: Vec<String>,
    pub customer_id: Vec<String>,
    pub iban: Vec<String>,
}

impl AccountFilter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the values of one dimension
    #[must_use]
    pub fn with<I, S>(mut self, dimension: FilterDimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.values_mut(dimension) = values.into_iter().map(Into::into).collect();
        self
    }

    /// Values of one dimension, in the order they were given
    pub fn values(&self, dimension: FilterDimension) -> &[String] {
        match dimension {
            FilterDimension::AccountNumber => &self.account_number,
            FilterDimension::BankId => &self.bank_id,
            FilterDimension::BankIdCode => &self.bank_id_code,
            FilterDimension::Country => &self.country,
            FilterDimension::CustomerId => &self.customer_id,
            FilterDimension::Iban => &self.iban,
        }
    }

    fn values_mut(&mut self, dimension: FilterDimension) -> &mut Vec<String> {
        match dimension {
            FilterDimension::AccountNumber => &mut self.account_number,
            FilterDimension::BankId => &mut self.bank_id,
            FilterDimension::BankIdCode => &mut self.bank_id_code,
            FilterDimension::Country => &mut self.country,
            FilterDimension::CustomerId => &mut self.customer_id,
            FilterDimension::Iban => &mut self.iban,
        }
    }

    /// Check if no dimension has values
    pub fn is_empty(&self) -> bool {
        FilterDimension::ALL
            .iter()
            .all(|dimension| self.values(*dimension).is_empty())
    }
}

// ============================================================================
// Page Descriptor
// ============================================================================

/// Identifies which page to fetch next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    /// Zero-based page number
    pub page_number: u64,
    /// Accounts per page; zero or negative means [`DEFAULT_PAGE_SIZE`]
    pub page_size: i64,
    /// Filters applied to every page
    pub filter: AccountFilter,
}

impl Default for PageDescriptor {
    fn default() -> Self {
        Self::first()
    }
}

impl PageDescriptor {
    /// First page with the default size and no filters
    pub fn first() -> Self {
        Self {
            page_number: 0,
            page_size: DEFAULT_PAGE_SIZE,
            filter: AccountFilter::default(),
        }
    }

    /// Create a descriptor for a specific page
    pub fn new(page_number: u64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
            filter: AccountFilter::default(),
        }
    }

    /// Set filters
    #[must_use]
    pub fn with_filter(mut self, filter: AccountFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Page size after applying the default
    pub fn effective_page_size(&self) -> u64 {
        normalize_page_size(self.page_size)
    }

    /// Number of accounts preceding this page
    pub fn offset(&self) -> u64 {
        self.page_number.saturating_mul(self.effective_page_size())
    }

    /// Wire query parameters for this page
    pub fn to_query(&self) -> Vec<(String, String)> {
        to_query(self.page_number, self.page_size, &self.filter)
    }

    /// Parse a descriptor from wire query parameters.
    ///
    /// Missing page parameters fall back to page 0 and the default size.
    /// Filter values are split on commas; empty parameters are ignored.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self> {
        let page_number = match params.get(PAGE_NUMBER_PARAM) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::invalid_request(format!("Wrong value in {PAGE_NUMBER_PARAM}: {raw}"))
            })?,
            None => 0,
        };
        let page_size = match params.get(PAGE_SIZE_PARAM) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                Error::invalid_request(format!("Wrong value in {PAGE_SIZE_PARAM}: {raw}"))
            })?,
            None => DEFAULT_PAGE_SIZE,
        };

        let size = normalize_page_size(page_size);
        if page_number.saturating_mul(size) > MAX_ROWS {
            return Err(Error::invalid_request(format!(
                "Wrong value in {PAGE_NUMBER_PARAM}: {page_number} is past the last page"
            )));
        }

        let mut filter = AccountFilter::default();
        for dimension in FilterDimension::ALL {
            if let Some(raw) = params.get(dimension.param()).filter(|raw| !raw.is_empty()) {
                filter = filter.with(dimension, raw.split(','));
            }
        }

        Ok(Self {
            page_number,
            page_size,
            filter,
        })
    }
}

fn normalize_page_size(page_size: i64) -> u64 {
    if page_size <= 0 {
        DEFAULT_PAGE_SIZE as u64
    } else {
        page_size as u64
    }
}

// ============================================================================
// Query Canonicalization
// ============================================================================

/// Build the ordered wire query for a page.
///
/// Page number and size come first, then one comma-joined parameter per
/// non-empty filter dimension in [`FilterDimension::ALL`] order. The output
/// depends only on the inputs.
pub fn to_query(page_number: u64, page_size: i64, filter: &AccountFilter) -> Vec<(String, String)> {
    let mut params = vec![
        (PAGE_NUMBER_PARAM.to_string(), page_number.to_string()),
        (
            PAGE_SIZE_PARAM.to_string(),
            normalize_page_size(page_size).to_string(),
        ),
    ];

    for dimension in FilterDimension::ALL {
        let values = filter.values(dimension);
        if !values.is_empty() {
            params.push((dimension.param().to_string(), values.join(",")));
        }
    }

    params
}
