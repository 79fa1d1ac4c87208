//! The saga-step interceptor: refresh-then-execute.
//!
//! Every public saga step runs through [`intercept`], which re-reads the
//! aggregate from its repository immediately before the step body so a
//! stale in-memory copy is never acted upon. A vanished aggregate becomes
//! a typed FAILED response; the step body never runs against it.

use acquiring_types::{
    OperationResponse, OperationStatus, OperationType, PaymentMethod, SagaError, UnitOfWork,
    UnitOfWorkProvider,
};

/// A saga step plus its declared operation type.
///
/// The operation type is associated explicitly at registration; steps that
/// derive it from their name instead return `None` for unrecognized names,
/// which [`intercept`] surfaces as an `InvalidUsage` failure on every call.
#[async_trait::async_trait]
pub trait SagaStep: Send + Sync {
    /// Step name, used in wiring-error messages.
    fn name(&self) -> &str;

    /// The operation type this step represents, if resolvable.
    fn operation_type(&self) -> Option<OperationType>;

    /// The step body. Receives the refreshed aggregate and the unit of
    /// work the interceptor acquired; further writes go through it.
    async fn run(
        &self,
        uow: &dyn UnitOfWork,
        payment_method: PaymentMethod,
    ) -> Result<OperationResponse, SagaError>;
}

/// Runs a saga step with refresh-and-validate semantics.
///
/// 1. Resolves the step's operation type; an unresolvable type is a wiring
///    mistake and raises `InvalidUsage` before anything else happens.
/// 2. Acquires a unit of work and re-reads the aggregate by id.
/// 3. Found: the step runs with the authoritative instance and its
///    response is returned unchanged.
/// 4. Absent: the step never runs; a FAILED response carrying the stale
///    input and "PaymentMethod not found" is synthesized.
pub async fn intercept(
    provider: &dyn UnitOfWorkProvider,
    step: &dyn SagaStep,
    payment_method: PaymentMethod,
) -> Result<OperationResponse, SagaError> {
    let operation_type = step.operation_type().ok_or_else(|| SagaError::InvalidUsage {
        step: step.name().to_string(),
    })?;

    let uow = provider.begin().await?;

    match uow.payment_methods().get(payment_method.id).await? {
        Some(refreshed) => step.run(uow.as_ref(), refreshed).await,
        None => {
            tracing::warn!(
                payment_method_id = %payment_method.id,
                step = step.name(),
                "payment method not found, step skipped"
            );
            Ok(OperationResponse {
                status: OperationStatus::Failed,
                payment_method: Some(payment_method),
                operation_type,
                error_message: Some("PaymentMethod not found".to_string()),
                actions: Vec::new(),
            })
        }
    }
}
