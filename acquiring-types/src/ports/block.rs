//! Block ports: pluggable per-provider behavior attached to saga steps.

use crate::domain::{BlockResponse, PaymentMethod};
use crate::error::SagaError;
use crate::ports::unit_of_work::UnitOfWork;

/// A unit of provider-specific behavior a saga step runs.
///
/// Blocks write through the unit of work handed to them; they never own a
/// session of their own.
#[async_trait::async_trait]
pub trait Block: Send + Sync {
    /// Stable name, recorded on the block events this block emits.
    fn name(&self) -> &str;

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: &PaymentMethod,
    ) -> Result<BlockResponse, SagaError>;
}

/// A block that consumes client-supplied action data (e.g. the outcome of
/// a 3DS challenge) in addition to the payment method.
#[async_trait::async_trait]
pub trait ActionBlock: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: &PaymentMethod,
        action_data: &serde_json::Value,
    ) -> Result<BlockResponse, SagaError>;
}
