//! PaymentMethod aggregate: the consistency boundary of the acquiring core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;
use super::operation::{OperationStatus, OperationType, PaymentOperation};

/// Unique identifier for a PaymentMethod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodId(Uuid);

impl PaymentMethodId {
    /// Creates a new random PaymentMethodId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentMethodId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentMethodId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentMethodId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a PaymentAttempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentAttemptId(Uuid);

impl PaymentAttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentAttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentAttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentAttemptId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One attempt to collect a payment, possibly spanning several methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    pub id: PaymentAttemptId,
    pub created_at: DateTime<Utc>,
    pub amount: Money,
    /// Payment methods linked to this attempt.
    pub payment_method_ids: Vec<PaymentMethodId>,
}

/// A payment method and the ordered history of operations performed
/// against it.
///
/// The history is append-only: it is extended by persisting new
/// [`PaymentOperation`]s, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub payment_attempt: PaymentAttempt,
    pub created_at: DateTime<Utc>,
    /// Whether this method requires a separate confirm step.
    pub confirmable: bool,
    pub payment_operations: Vec<PaymentOperation>,
}

impl PaymentMethod {
    /// Counts operations of the given type and status in the history.
    pub fn count_operation(&self, operation_type: OperationType, status: OperationStatus) -> usize {
        self.payment_operations
            .iter()
            .filter(|op| op.operation_type == operation_type && op.status == status)
            .count()
    }

    /// Whether the history contains at least one matching operation.
    pub fn has_operation(&self, operation_type: OperationType, status: OperationStatus) -> bool {
        self.count_operation(operation_type, status) > 0
    }
}
