//! Draft objects handed to repository `add` calls.
//!
//! A draft carries only caller-supplied fields; ids and timestamps are
//! assigned by the store when the draft is persisted.

use serde::{Deserialize, Serialize};

use crate::domain::{Money, OperationStatus, OperationType, PaymentMethodId};

/// Draft for a new payment attempt, owned by a [`DraftPaymentMethod`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPaymentAttempt {
    pub amount: Money,
}

/// Draft for a new payment method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPaymentMethod {
    pub payment_attempt: DraftPaymentAttempt,
    pub confirmable: bool,
}

/// Draft for a new payment operation appended to a method's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPaymentOperation {
    pub payment_method_id: PaymentMethodId,
    pub operation_type: OperationType,
    pub status: OperationStatus,
}

/// Draft for a new block event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftBlockEvent {
    pub payment_method_id: PaymentMethodId,
    pub block_name: String,
    pub status: OperationStatus,
}

/// Draft for a new provider transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftTransaction {
    pub external_id: String,
    pub raw_data: serde_json::Value,
    pub provider_name: String,
    pub payment_method_id: PaymentMethodId,
}
