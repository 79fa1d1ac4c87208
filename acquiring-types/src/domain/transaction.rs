//! Provider transaction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payment_method::PaymentMethodId;

/// A transaction reported by an external payment provider.
///
/// Transactions are immutable once created - they represent a historical
/// record of what the provider did. Their internal shape is opaque to the
/// orchestration core; they participate only in unit-of-work atomicity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier assigned by the provider.
    pub external_id: String,
    pub timestamp: DateTime<Utc>,
    /// Raw provider payload, kept verbatim for auditing.
    pub raw_data: serde_json::Value,
    pub provider_name: String,
    pub payment_method_id: PaymentMethodId,
}
