//! Block events: the execution trail a block leaves behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::operation::OperationStatus;
use super::payment_method::PaymentMethodId;

/// A recorded start or outcome of one block execution.
///
/// The internal shape is opaque to the orchestration core; block events
/// participate only in unit-of-work atomicity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEvent {
    pub created_at: DateTime<Utc>,
    pub payment_method_id: PaymentMethodId,
    pub block_name: String,
    pub status: OperationStatus,
}
