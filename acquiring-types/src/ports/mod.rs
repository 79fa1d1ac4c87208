//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The saga layer depends on these traits, not concrete implementations.

mod block;
mod repository;
mod unit_of_work;

pub use block::{ActionBlock, Block};
pub use repository::{
    BlockEventRepository, PaymentMethodRepository, PaymentOperationRepository,
    TransactionRepository,
};
pub use unit_of_work::{UnitOfWork, UnitOfWorkProvider};
