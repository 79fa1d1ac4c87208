//! Block decoration: event bracketing around block execution.

use acquiring_types::{
    ActionBlock, Block, BlockResponse, DraftBlockEvent, OperationStatus, PaymentMethod, SagaError,
    UnitOfWork,
};

/// Wraps a [`Block`] so every run is bracketed by block events: a STARTED
/// event before the inner block executes, and an event with the block's
/// outcome status once it returns.
pub struct EventedBlock<B> {
    inner: B,
}

impl<B> EventedBlock<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<B: Block> Block for EventedBlock<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: &PaymentMethod,
    ) -> Result<BlockResponse, SagaError> {
        uow.block_events()
            .add(DraftBlockEvent {
                payment_method_id: payment_method.id,
                block_name: self.inner.name().to_string(),
                status: OperationStatus::Started,
            })
            .await?;

        let response = self.inner.run(uow, payment_method).await?;

        uow.block_events()
            .add(DraftBlockEvent {
                payment_method_id: payment_method.id,
                block_name: self.inner.name().to_string(),
                status: response.status,
            })
            .await?;

        Ok(response)
    }
}

/// [`EventedBlock`] for blocks that take client action data.
pub struct EventedActionBlock<B> {
    inner: B,
}

impl<B> EventedActionBlock<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<B: ActionBlock> ActionBlock for EventedActionBlock<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: &PaymentMethod,
        action_data: &serde_json::Value,
    ) -> Result<BlockResponse, SagaError> {
        uow.block_events()
            .add(DraftBlockEvent {
                payment_method_id: payment_method.id,
                block_name: self.inner.name().to_string(),
                status: OperationStatus::Started,
            })
            .await?;

        let response = self.inner.run(uow, payment_method, action_data).await?;

        uow.block_events()
            .add(DraftBlockEvent {
                payment_method_id: payment_method.id,
                block_name: self.inner.name().to_string(),
                status: response.status,
            })
            .await?;

        Ok(response)
    }
}
