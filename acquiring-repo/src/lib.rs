//! # Acquiring Repository
//!
//! Concrete repository and unit-of-work adapters for the acquiring core.
//! This crate provides the SQLite adapter implementing the port traits
//! defined in `acquiring-types`.
//!
//! The unit of work owns one session (a pooled connection with an open
//! transaction) for its whole scope; the four repositories it exposes are
//! bound to that session through a shared handle and never open
//! transactions of their own. Commit is opt-in: a scope that ends without
//! committing rolls its open window back.

mod session;
pub mod sqlite;
mod types;

#[cfg(test)]
mod sqlite_tests;

pub use session::SqliteSession;
pub use sqlite::{
    RepositoryFactories, SqliteBlockEventRepository, SqlitePaymentMethodRepository,
    SqlitePaymentOperationRepository, SqliteTransactionRepository, SqliteUnitOfWork,
    SqliteUnitOfWorkProvider,
};
