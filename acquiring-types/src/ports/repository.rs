//! Repository port traits.
//!
//! One collection-like abstraction per persisted entity type. A repository
//! never opens its own transaction: it is always constructed bound to the
//! session owned by the enclosing unit of work.

use crate::domain::{BlockEvent, PaymentMethod, PaymentMethodId, PaymentOperation, Transaction};
use crate::dto::{DraftBlockEvent, DraftPaymentMethod, DraftPaymentOperation, DraftTransaction};
use crate::error::RepoError;

/// Storage for payment methods and their owned sub-collections.
#[async_trait::async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    /// Persists a draft, returning it with server-assigned fields populated.
    async fn add(&self, draft: DraftPaymentMethod) -> Result<PaymentMethod, RepoError>;

    /// Returns the payment method with its operation history eagerly loaded,
    /// or `None` when the id does not exist.
    async fn get(&self, id: PaymentMethodId) -> Result<Option<PaymentMethod>, RepoError>;
}

/// Append-only storage for a payment method's operation history.
#[async_trait::async_trait]
pub trait PaymentOperationRepository: Send + Sync {
    /// Appends one operation to the method's history.
    async fn add(&self, draft: DraftPaymentOperation) -> Result<PaymentOperation, RepoError>;
}

/// Storage for block events.
#[async_trait::async_trait]
pub trait BlockEventRepository: Send + Sync {
    async fn add(&self, draft: DraftBlockEvent) -> Result<BlockEvent, RepoError>;

    /// Returns the events recorded against one payment method, oldest first.
    async fn list(&self, payment_method_id: PaymentMethodId)
    -> Result<Vec<BlockEvent>, RepoError>;
}

/// Storage for provider transaction records.
#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn add(&self, draft: DraftTransaction) -> Result<Transaction, RepoError>;

    /// Returns the transactions recorded against one payment method, oldest first.
    async fn list(
        &self,
        payment_method_id: PaymentMethodId,
    ) -> Result<Vec<Transaction>, RepoError>;
}
