//! Account resource types
//!
//! Wire representation of the account collection. Every request and response
//! body wraps its payload in a `{"data": ...}` envelope.

use crate::pagination::FilterDimension;
use serde::{Deserialize, Serialize};

/// Resource type name carried by every account
pub const ACCOUNT_TYPE: &str = "accounts";

// ============================================================================
// Envelope
// ============================================================================

/// `{"data": ...}` wrapper used by the account API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    /// Wrap a payload
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Account Resource
// ============================================================================

/// A single account as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResource {
    /// Always "accounts"
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Account ID (UUID)
    pub id: String,
    /// Organisation that created the account (UUID)
    pub organisation_id: String,
    /// Number of modifications, starting at 0
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AccountAttributes>,
}

/// Account-specific attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountAttributes {
    /// ISO 3166-1 country code (required)
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Account holder name, up to four lines (required)
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint_account: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_matching_opt_out: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_identification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_identification: Option<PrivateIdentification>,
    #[serde(default)]
    pub status: Option<String>,
}

impl AccountAttributes {
    /// Create attributes with the required fields
    pub fn new(country: impl Into<String>, name: Vec<String>) -> Self {
        Self {
            country: country.into(),
            name,
            ..Default::default()
        }
    }

    /// Value this account exposes for a filter dimension
    pub fn filter_value(&self, dimension: FilterDimension) -> Option<&str> {
        match dimension {
            FilterDimension::AccountNumber => self.account_number.as_deref(),
            FilterDimension::BankId => self.bank_id.as_deref(),
            FilterDimension::BankIdCode => self.bank_id_code.as_deref(),
            FilterDimension::Country => Some(self.country.as_str()),
            FilterDimension::CustomerId => self.customer_id.as_deref(),
            FilterDimension::Iban => self.iban.as_deref(),
        }
    }
}

/// Information about the account holder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivateIdentification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_country: Option<String>,
    /// Identification number (required)
    pub identification: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

// ============================================================================
// Create Request
// ============================================================================

/// Body of a create request, sent inside a [`DataEnvelope`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    #[serde(rename = "type", default = "default_account_type")]
    pub resource_type: String,
    pub id: String,
    pub organisation_id: String,
    pub attributes: AccountAttributes,
}

fn default_account_type() -> String {
    ACCOUNT_TYPE.to_string()
}

impl NewAccount {
    /// Create a new account payload
    pub fn new(
        id: impl Into<String>,
        organisation_id: impl Into<String>,
        attributes: AccountAttributes,
    ) -> Self {
        Self {
            resource_type: default_account_type(),
            id: id.into(),
            organisation_id: organisation_id.into(),
            attributes,
        }
    }
}
