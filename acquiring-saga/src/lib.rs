//! # Acquiring Saga
//!
//! The orchestration layer of the payment acquiring core: decision logic
//! over a payment method's recorded history, the refresh-then-execute
//! step interceptor, event-bracketing block wrappers, and the
//! `PaymentSaga` that drives a payment method through its lifecycle.
//!
//! Persistence stays behind the `UnitOfWork`/`UnitOfWorkProvider` ports
//! from `acquiring-types`; this crate never touches a database directly.

pub mod blocks;
pub mod decision;
pub mod interceptor;
pub mod saga;

pub use blocks::{EventedActionBlock, EventedBlock};
pub use interceptor::{SagaStep, intercept};
pub use saga::PaymentSaga;
