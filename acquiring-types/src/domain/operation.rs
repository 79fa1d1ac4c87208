//! Payment operations: one attempted lifecycle step and its outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payment_method::{PaymentMethod, PaymentMethodId};
use crate::error::DomainError;

/// Lifecycle step a saga can perform against a payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Initialize,
    ProcessAction,
    Pay,
    AfterPay,
    Confirm,
    AfterConfirm,
    Refund,
    AfterRefund,
    Void,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationType::Initialize => "INITIALIZE",
            OperationType::ProcessAction => "PROCESS_ACTION",
            OperationType::Pay => "PAY",
            OperationType::AfterPay => "AFTER_PAY",
            OperationType::Confirm => "CONFIRM",
            OperationType::AfterConfirm => "AFTER_CONFIRM",
            OperationType::Refund => "REFUND",
            OperationType::AfterRefund => "AFTER_REFUND",
            OperationType::Void => "VOID",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for OperationType {
    type Err = DomainError;

    /// Parses a SCREAMING_SNAKE or snake_case step name.
    ///
    /// Step names map onto operation types when a saga registers a step by
    /// name instead of declaring the type explicitly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INITIALIZE" => Ok(OperationType::Initialize),
            "PROCESS_ACTION" => Ok(OperationType::ProcessAction),
            "PAY" => Ok(OperationType::Pay),
            "AFTER_PAY" => Ok(OperationType::AfterPay),
            "CONFIRM" => Ok(OperationType::Confirm),
            "AFTER_CONFIRM" => Ok(OperationType::AfterConfirm),
            "REFUND" => Ok(OperationType::Refund),
            "AFTER_REFUND" => Ok(OperationType::AfterRefund),
            "VOID" => Ok(OperationType::Void),
            other => Err(DomainError::ValidationError(format!(
                "Unknown operation type: {other}"
            ))),
        }
    }
}

/// Outcome recorded for one attempted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Started,
    Failed,
    Completed,
    RequiresAction,
    NotPerformed,
    Pending,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationStatus::Started => "STARTED",
            OperationStatus::Failed => "FAILED",
            OperationStatus::Completed => "COMPLETED",
            OperationStatus::RequiresAction => "REQUIRES_ACTION",
            OperationStatus::NotPerformed => "NOT_PERFORMED",
            OperationStatus::Pending => "PENDING",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for OperationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTED" => Ok(OperationStatus::Started),
            "FAILED" => Ok(OperationStatus::Failed),
            "COMPLETED" => Ok(OperationStatus::Completed),
            "REQUIRES_ACTION" => Ok(OperationStatus::RequiresAction),
            "NOT_PERFORMED" => Ok(OperationStatus::NotPerformed),
            "PENDING" => Ok(OperationStatus::Pending),
            other => Err(DomainError::ValidationError(format!(
                "Unknown operation status: {other}"
            ))),
        }
    }
}

/// One attempted step against a payment method and its outcome.
///
/// Operations are immutable once created - the aggregate's history is only
/// ever extended, never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOperation {
    pub created_at: DateTime<Utc>,
    pub payment_method_id: PaymentMethodId,
    pub operation_type: OperationType,
    pub status: OperationStatus,
}

/// The uniform return shape of every saga step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub status: OperationStatus,
    pub payment_method: Option<PaymentMethod>,
    pub operation_type: OperationType,
    pub error_message: Option<String>,
    /// Client actions handed back by a provider (redirects, challenges).
    pub actions: Vec<serde_json::Value>,
}

impl OperationResponse {
    /// A failed response with a human-readable reason.
    pub fn failed(
        operation_type: OperationType,
        payment_method: Option<PaymentMethod>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            status: OperationStatus::Failed,
            payment_method,
            operation_type,
            error_message: Some(error_message.into()),
            actions: Vec::new(),
        }
    }

    /// A response carrying an arbitrary status with no error message.
    pub fn with_status(
        status: OperationStatus,
        operation_type: OperationType,
        payment_method: Option<PaymentMethod>,
    ) -> Self {
        Self {
            status,
            payment_method,
            operation_type,
            error_message: None,
            actions: Vec::new(),
        }
    }
}

/// What a block reports back to the saga step that ran it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockResponse {
    pub status: OperationStatus,
    pub actions: Vec<serde_json::Value>,
    pub error_message: Option<String>,
}

impl BlockResponse {
    pub fn new(status: OperationStatus) -> Self {
        Self {
            status,
            actions: Vec::new(),
            error_message: None,
        }
    }

    pub fn with_actions(status: OperationStatus, actions: Vec<serde_json::Value>) -> Self {
        Self {
            status,
            actions,
            error_message: None,
        }
    }
}
