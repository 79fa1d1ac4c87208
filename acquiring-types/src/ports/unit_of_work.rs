//! Unit-of-work port.
//!
//! One consistent, atomic view over the four repositories for the lifetime
//! of a use case. Commit is opt-in: a scope that ends without committing
//! discards everything written since the last boundary.

use crate::error::RepoError;
use crate::ports::repository::{
    BlockEventRepository, PaymentMethodRepository, PaymentOperationRepository,
    TransactionRepository,
};

/// A scoped, session-consistent view over the persisted collections.
///
/// All repositories returned by the accessors are bound to the same
/// session: earlier writes are visible to later reads within the scope,
/// even before a commit. Dropping the unit of work rolls back the window
/// open since the last `commit`/`rollback`.
#[async_trait::async_trait]
pub trait UnitOfWork: Send + Sync {
    fn payment_methods(&self) -> &dyn PaymentMethodRepository;
    fn payment_operations(&self) -> &dyn PaymentOperationRepository;
    fn block_events(&self) -> &dyn BlockEventRepository;
    fn transactions(&self) -> &dyn TransactionRepository;

    /// Durably commits everything written since the last boundary. Later
    /// writes form a new, independent window; a failure in that window
    /// does not undo this commit.
    async fn commit(&self) -> Result<(), RepoError>;

    /// Discards everything written since the last boundary. Later writes
    /// form a new, independent window.
    async fn rollback(&self) -> Result<(), RepoError>;
}

/// Hands out unit-of-work scopes.
///
/// Passed explicitly into sagas and the step interceptor so ownership and
/// lifetime of the session stay visible at the call site.
#[async_trait::async_trait]
pub trait UnitOfWorkProvider: Send + Sync {
    /// Begins a transaction and binds one repository of each kind to it.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepoError>;
}
