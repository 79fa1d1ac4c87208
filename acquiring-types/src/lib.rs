//! # Acquiring Types
//!
//! Domain types and port traits for the payment acquiring core.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (PaymentMethod, PaymentOperation, Money)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Draft objects handed to `add` before server fields exist
//! - `error/` - Domain, repository and saga error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    BlockEvent, BlockResponse, Currency, Money, OperationResponse, OperationStatus, OperationType,
    PaymentAttempt, PaymentAttemptId, PaymentMethod, PaymentMethodId, PaymentOperation,
    Transaction,
};
pub use dto::*;
pub use error::{DomainError, RepoError, SagaError};
pub use ports::{
    ActionBlock, Block, BlockEventRepository, PaymentMethodRepository, PaymentOperationRepository,
    TransactionRepository, UnitOfWork, UnitOfWorkProvider,
};
