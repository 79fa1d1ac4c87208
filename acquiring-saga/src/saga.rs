//! The payment saga: orchestration of the payment lifecycle.
//!
//! `PaymentSaga` owns what is common across all payment methods: the order
//! of steps, decision checks, and the STARTED/outcome operation records
//! written around each step. What is specific to a provider lives in the
//! blocks plugged into each step.

use std::sync::Arc;

use acquiring_types::{
    ActionBlock, Block, DraftPaymentOperation, OperationResponse, OperationStatus, OperationType,
    PaymentMethod, SagaError, UnitOfWork, UnitOfWorkProvider,
};

use crate::decision;
use crate::interceptor::{SagaStep, intercept};

const CANNOT_PROCEED: &str = "PaymentMethod cannot go through this operation";
const NO_BLOCK: &str = "PaymentSaga does not include a block for this operation type";

/// Orchestrates one payment method through its lifecycle.
///
/// Each public step refreshes the payment method, checks the decision
/// logic against its recorded history, brackets the block run with
/// STARTED and outcome operations, and commits each record as it is
/// written so history survives later failures.
pub struct PaymentSaga {
    unit_of_work: Arc<dyn UnitOfWorkProvider>,

    initialize_block: Option<Box<dyn Block>>,
    process_action_block: Option<Box<dyn ActionBlock>>,

    pay_blocks: Vec<Box<dyn Block>>,
    after_pay_blocks: Vec<Box<dyn Block>>,

    confirm_block: Option<Box<dyn Block>>,
    after_confirm_blocks: Vec<Box<dyn Block>>,
}

impl PaymentSaga {
    pub fn new(unit_of_work: Arc<dyn UnitOfWorkProvider>) -> Self {
        Self {
            unit_of_work,
            initialize_block: None,
            process_action_block: None,
            pay_blocks: Vec::new(),
            after_pay_blocks: Vec::new(),
            confirm_block: None,
            after_confirm_blocks: Vec::new(),
        }
    }

    pub fn with_initialize_block(mut self, block: Box<dyn Block>) -> Self {
        self.initialize_block = Some(block);
        self
    }

    pub fn with_process_action_block(mut self, block: Box<dyn ActionBlock>) -> Self {
        self.process_action_block = Some(block);
        self
    }

    pub fn with_pay_blocks(mut self, blocks: Vec<Box<dyn Block>>) -> Self {
        self.pay_blocks = blocks;
        self
    }

    pub fn with_after_pay_blocks(mut self, blocks: Vec<Box<dyn Block>>) -> Self {
        self.after_pay_blocks = blocks;
        self
    }

    pub fn with_confirm_block(mut self, block: Box<dyn Block>) -> Self {
        self.confirm_block = Some(block);
        self
    }

    pub fn with_after_confirm_blocks(mut self, blocks: Vec<Box<dyn Block>>) -> Self {
        self.after_confirm_blocks = blocks;
        self
    }

    pub async fn initialize(
        &self,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        let step = InitializeStep { saga: self };
        intercept(self.unit_of_work.as_ref(), &step, payment_method).await
    }

    pub async fn process_action(
        &self,
        payment_method: PaymentMethod,
        action_data: serde_json::Value,
    ) -> Result<OperationResponse, SagaError> {
        let step = ProcessActionStep {
            saga: self,
            action_data,
        };
        intercept(self.unit_of_work.as_ref(), &step, payment_method).await
    }

    pub async fn after_pay(
        &self,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        let step = AfterPayStep { saga: self };
        intercept(self.unit_of_work.as_ref(), &step, payment_method).await
    }

    pub async fn confirm(
        &self,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        let step = ConfirmStep { saga: self };
        intercept(self.unit_of_work.as_ref(), &step, payment_method).await
    }

    pub async fn after_confirm(
        &self,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        let step = AfterConfirmStep { saga: self };
        intercept(self.unit_of_work.as_ref(), &step, payment_method).await
    }

    /// Records one operation and commits it so the record survives
    /// whatever happens later in the scope.
    async fn record_operation(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: &PaymentMethod,
        operation_type: OperationType,
        status: OperationStatus,
    ) -> Result<(), SagaError> {
        uow.payment_operations()
            .add(DraftPaymentOperation {
                payment_method_id: payment_method.id,
                operation_type,
                status,
            })
            .await?;
        uow.commit().await?;
        Ok(())
    }

    async fn run_initialize(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        const TYPE: OperationType = OperationType::Initialize;

        if !decision::can_initialize(&payment_method) {
            return Ok(OperationResponse::failed(TYPE, None, CANNOT_PROCEED));
        }

        self.record_operation(uow, &payment_method, TYPE, OperationStatus::Started)
            .await?;

        let Some(block) = &self.initialize_block else {
            self.record_operation(uow, &payment_method, TYPE, OperationStatus::NotPerformed)
                .await?;
            return self.run_pay(uow, payment_method).await;
        };

        let block_response = block.run(uow, &payment_method).await?;

        if !matches!(
            block_response.status,
            OperationStatus::Completed | OperationStatus::Failed | OperationStatus::RequiresAction
        ) {
            self.record_operation(uow, &payment_method, TYPE, OperationStatus::Failed)
                .await?;
            return Ok(OperationResponse::failed(
                TYPE,
                Some(payment_method),
                format!("Invalid status {}", block_response.status),
            ));
        }

        if block_response.status == OperationStatus::RequiresAction
            && block_response.actions.is_empty()
        {
            self.record_operation(uow, &payment_method, TYPE, OperationStatus::Failed)
                .await?;
            return Ok(OperationResponse::failed(
                TYPE,
                Some(payment_method),
                "Status is require actions, but no actions were provided",
            ));
        }

        self.record_operation(uow, &payment_method, TYPE, block_response.status)
            .await?;

        if block_response.status == OperationStatus::Completed {
            return self.run_pay(uow, payment_method).await;
        }

        Ok(OperationResponse {
            status: block_response.status,
            payment_method: Some(payment_method),
            operation_type: TYPE,
            error_message: block_response.error_message,
            actions: block_response.actions,
        })
    }

    async fn run_process_action(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
        action_data: &serde_json::Value,
    ) -> Result<OperationResponse, SagaError> {
        const TYPE: OperationType = OperationType::ProcessAction;

        if !decision::can_process_action(&payment_method) {
            return Ok(OperationResponse::failed(TYPE, None, CANNOT_PROCEED));
        }

        self.record_operation(uow, &payment_method, TYPE, OperationStatus::Started)
            .await?;

        let Some(block) = &self.process_action_block else {
            self.record_operation(uow, &payment_method, TYPE, OperationStatus::NotPerformed)
                .await?;
            return Ok(OperationResponse {
                status: OperationStatus::NotPerformed,
                payment_method: Some(payment_method),
                operation_type: TYPE,
                error_message: Some(NO_BLOCK.to_string()),
                actions: Vec::new(),
            });
        };

        let block_response = block.run(uow, &payment_method, action_data).await?;

        if !matches!(
            block_response.status,
            OperationStatus::Completed | OperationStatus::Failed
        ) {
            self.record_operation(uow, &payment_method, TYPE, OperationStatus::Failed)
                .await?;
            return Ok(OperationResponse::failed(
                TYPE,
                Some(payment_method),
                format!("Invalid status {}", block_response.status),
            ));
        }

        self.record_operation(uow, &payment_method, TYPE, block_response.status)
            .await?;

        if block_response.status == OperationStatus::Completed {
            return self.run_pay(uow, payment_method).await;
        }

        Ok(OperationResponse {
            status: block_response.status,
            payment_method: Some(payment_method),
            operation_type: TYPE,
            error_message: block_response.error_message,
            actions: block_response.actions,
        })
    }

    /// The pay step. Never entered directly: only a completed (or
    /// skipped) initialize or a completed process_action chains into it,
    /// so it carries no decision check of its own.
    async fn run_pay(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        const TYPE: OperationType = OperationType::Pay;

        self.record_operation(uow, &payment_method, TYPE, OperationStatus::Started)
            .await?;

        let mut responses = Vec::with_capacity(self.pay_blocks.len());
        let mut actions = Vec::new();
        for block in &self.pay_blocks {
            let response = block.run(uow, &payment_method).await?;
            actions.extend(response.actions.iter().cloned());
            responses.push(response);
        }

        let status = aggregate_status(&responses);

        self.record_operation(uow, &payment_method, TYPE, status)
            .await?;

        Ok(OperationResponse {
            status,
            payment_method: Some(payment_method),
            operation_type: TYPE,
            error_message: joined_errors(&responses),
            actions,
        })
    }

    async fn run_after_pay(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        const TYPE: OperationType = OperationType::AfterPay;

        if !decision::can_after_pay(&payment_method) {
            return Ok(OperationResponse::failed(TYPE, None, CANNOT_PROCEED));
        }

        self.record_operation(uow, &payment_method, TYPE, OperationStatus::Started)
            .await?;

        let mut responses = Vec::with_capacity(self.after_pay_blocks.len());
        for block in &self.after_pay_blocks {
            responses.push(block.run(uow, &payment_method).await?);
        }

        let has_completed = responses
            .iter()
            .all(|r| r.status == OperationStatus::Completed);
        let status = if has_completed {
            OperationStatus::Completed
        } else {
            OperationStatus::Failed
        };

        self.record_operation(uow, &payment_method, TYPE, status)
            .await?;

        Ok(OperationResponse::with_status(
            status,
            TYPE,
            Some(payment_method),
        ))
    }

    async fn run_confirm(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        const TYPE: OperationType = OperationType::Confirm;

        if !decision::can_confirm(&payment_method) {
            return Ok(OperationResponse::failed(TYPE, None, CANNOT_PROCEED));
        }

        self.record_operation(uow, &payment_method, TYPE, OperationStatus::Started)
            .await?;

        let Some(block) = &self.confirm_block else {
            self.record_operation(uow, &payment_method, TYPE, OperationStatus::NotPerformed)
                .await?;
            return Ok(OperationResponse {
                status: OperationStatus::NotPerformed,
                payment_method: Some(payment_method),
                operation_type: TYPE,
                error_message: Some(NO_BLOCK.to_string()),
                actions: Vec::new(),
            });
        };

        let block_response = block.run(uow, &payment_method).await?;

        if !matches!(
            block_response.status,
            OperationStatus::Completed | OperationStatus::Failed | OperationStatus::Pending
        ) {
            self.record_operation(uow, &payment_method, TYPE, OperationStatus::Failed)
                .await?;
            return Ok(OperationResponse::failed(
                TYPE,
                Some(payment_method),
                format!("Invalid status {}", block_response.status),
            ));
        }

        self.record_operation(uow, &payment_method, TYPE, block_response.status)
            .await?;

        Ok(OperationResponse {
            status: block_response.status,
            payment_method: Some(payment_method),
            operation_type: TYPE,
            error_message: block_response.error_message,
            actions: Vec::new(),
        })
    }

    async fn run_after_confirm(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        const TYPE: OperationType = OperationType::AfterConfirm;

        if !decision::can_after_confirm(&payment_method) {
            return Ok(OperationResponse::failed(TYPE, None, CANNOT_PROCEED));
        }

        self.record_operation(uow, &payment_method, TYPE, OperationStatus::Started)
            .await?;

        let mut responses = Vec::with_capacity(self.after_confirm_blocks.len());
        for block in &self.after_confirm_blocks {
            responses.push(block.run(uow, &payment_method).await?);
        }

        let status = aggregate_status(&responses);

        self.record_operation(uow, &payment_method, TYPE, status)
            .await?;

        Ok(OperationResponse {
            status,
            payment_method: Some(payment_method),
            operation_type: TYPE,
            error_message: joined_errors(&responses),
            actions: Vec::new(),
        })
    }
}

/// Completed only when every block completed; pending as soon as any
/// block is pending; failed otherwise.
fn aggregate_status(responses: &[acquiring_types::BlockResponse]) -> OperationStatus {
    let has_completed = responses
        .iter()
        .all(|r| r.status == OperationStatus::Completed);
    let is_pending = responses
        .iter()
        .any(|r| r.status == OperationStatus::Pending);

    if has_completed {
        OperationStatus::Completed
    } else if is_pending {
        OperationStatus::Pending
    } else {
        OperationStatus::Failed
    }
}

fn joined_errors(responses: &[acquiring_types::BlockResponse]) -> Option<String> {
    let messages: Vec<&str> = responses
        .iter()
        .filter_map(|r| r.error_message.as_deref())
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

struct InitializeStep<'a> {
    saga: &'a PaymentSaga,
}

#[async_trait::async_trait]
impl SagaStep for InitializeStep<'_> {
    fn name(&self) -> &str {
        "initialize"
    }

    fn operation_type(&self) -> Option<OperationType> {
        Some(OperationType::Initialize)
    }

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        self.saga.run_initialize(uow, payment_method).await
    }
}

struct ProcessActionStep<'a> {
    saga: &'a PaymentSaga,
    action_data: serde_json::Value,
}

#[async_trait::async_trait]
impl SagaStep for ProcessActionStep<'_> {
    fn name(&self) -> &str {
        "process_action"
    }

    fn operation_type(&self) -> Option<OperationType> {
        Some(OperationType::ProcessAction)
    }

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        self.saga
            .run_process_action(uow, payment_method, &self.action_data)
            .await
    }
}

struct AfterPayStep<'a> {
    saga: &'a PaymentSaga,
}

#[async_trait::async_trait]
impl SagaStep for AfterPayStep<'_> {
    fn name(&self) -> &str {
        "after_pay"
    }

    fn operation_type(&self) -> Option<OperationType> {
        Some(OperationType::AfterPay)
    }

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        self.saga.run_after_pay(uow, payment_method).await
    }
}

struct ConfirmStep<'a> {
    saga: &'a PaymentSaga,
}

#[async_trait::async_trait]
impl SagaStep for ConfirmStep<'_> {
    fn name(&self) -> &str {
        "confirm"
    }

    fn operation_type(&self) -> Option<OperationType> {
        Some(OperationType::Confirm)
    }

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        self.saga.run_confirm(uow, payment_method).await
    }
}

struct AfterConfirmStep<'a> {
    saga: &'a PaymentSaga,
}

#[async_trait::async_trait]
impl SagaStep for AfterConfirmStep<'_> {
    fn name(&self) -> &str {
        "after_confirm"
    }

    fn operation_type(&self) -> Option<OperationType> {
        Some(OperationType::AfterConfirm)
    }

    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError> {
        self.saga.run_after_confirm(uow, payment_method).await
    }
}
