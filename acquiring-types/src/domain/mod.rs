//! Domain models for the acquiring core.

pub mod block_event;
pub mod money;
pub mod operation;
pub mod payment_method;
pub mod transaction;

pub use block_event::BlockEvent;
pub use money::{Currency, Money};
pub use operation::{
    BlockResponse, OperationResponse, OperationStatus, OperationType, PaymentOperation,
};
pub use payment_method::{PaymentAttempt, PaymentAttemptId, PaymentMethod, PaymentMethodId};
pub use transaction::Transaction;
