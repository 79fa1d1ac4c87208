//! SQLite repositories and unit of work.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use acquiring_types::{
    BlockEvent, BlockEventRepository, DraftBlockEvent, DraftPaymentMethod, DraftPaymentOperation,
    DraftTransaction, PaymentAttempt, PaymentAttemptId, PaymentMethod, PaymentMethodId,
    PaymentMethodRepository, PaymentOperation, PaymentOperationRepository, RepoError, Transaction,
    TransactionRepository, UnitOfWork, UnitOfWorkProvider,
};

use crate::session::SqliteSession;
use crate::types::{DbBlockEvent, DbPaymentMethod, DbPaymentOperation, DbTransaction};

// ─────────────────────────────────────────────────────────────────────────────
// Repositories
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite payment method repository, bound to its unit of work's session.
pub struct SqlitePaymentMethodRepository {
    session: SqliteSession,
}

impl SqlitePaymentMethodRepository {
    pub fn new(session: SqliteSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PaymentMethodRepository for SqlitePaymentMethodRepository {
    async fn add(&self, draft: DraftPaymentMethod) -> Result<PaymentMethod, RepoError> {
        let method_id = PaymentMethodId::new();
        let attempt_id = PaymentAttemptId::new();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let mut session = self.session.lock().await;
        let conn = session.connection()?;

        sqlx::query(
            r#"INSERT INTO payment_attempts (id, amount, currency, created_at) VALUES (?, ?, ?, ?)"#,
        )
        .bind(attempt_id.to_string())
        .bind(draft.payment_attempt.amount.amount())
        .bind(draft.payment_attempt.amount.currency().to_string())
        .bind(&now_str)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO payment_methods (id, payment_attempt_id, confirmable, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(method_id.to_string())
        .bind(attempt_id.to_string())
        .bind(draft.confirmable)
        .bind(&now_str)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(PaymentMethod {
            id: method_id,
            payment_attempt: PaymentAttempt {
                id: attempt_id,
                created_at: now,
                amount: draft.payment_attempt.amount,
                payment_method_ids: vec![method_id],
            },
            created_at: now,
            confirmable: draft.confirmable,
            payment_operations: Vec::new(),
        })
    }

    async fn get(&self, id: PaymentMethodId) -> Result<Option<PaymentMethod>, RepoError> {
        let id_str = id.to_string();

        let mut session = self.session.lock().await;
        let conn = session.connection()?;

        let row: Option<DbPaymentMethod> = sqlx::query_as(
            r#"SELECT pm.id, pm.confirmable, pm.created_at,
                      pa.id AS attempt_id, pa.amount AS attempt_amount,
                      pa.currency AS attempt_currency, pa.created_at AS attempt_created_at
               FROM payment_methods pm
               JOIN payment_attempts pa ON pa.id = pm.payment_attempt_id
               WHERE pm.id = ?"#,
        )
        .bind(&id_str)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        // rowid breaks same-instant timestamp ties, preserving append order.
        let operation_rows: Vec<DbPaymentOperation> = sqlx::query_as(
            r#"SELECT payment_method_id, operation_type, status, created_at
               FROM payment_operations
               WHERE payment_method_id = ?
               ORDER BY created_at, rowid"#,
        )
        .bind(&id_str)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let linked_method_ids: Vec<String> = sqlx::query_scalar(
            r#"SELECT id FROM payment_methods WHERE payment_attempt_id = ? ORDER BY created_at, rowid"#,
        )
        .bind(&row.attempt_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let payment_operations = operation_rows
            .into_iter()
            .map(DbPaymentOperation::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        row.into_domain(payment_operations, linked_method_ids)
            .map(Some)
    }
}

/// SQLite payment operation repository.
pub struct SqlitePaymentOperationRepository {
    session: SqliteSession,
}

impl SqlitePaymentOperationRepository {
    pub fn new(session: SqliteSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PaymentOperationRepository for SqlitePaymentOperationRepository {
    async fn add(&self, draft: DraftPaymentOperation) -> Result<PaymentOperation, RepoError> {
        let now = Utc::now();

        let mut session = self.session.lock().await;
        let conn = session.connection()?;

        sqlx::query(
            r#"INSERT INTO payment_operations (payment_method_id, operation_type, status, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(draft.payment_method_id.to_string())
        .bind(draft.operation_type.to_string())
        .bind(draft.status.to_string())
        .bind(now.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(PaymentOperation {
            created_at: now,
            payment_method_id: draft.payment_method_id,
            operation_type: draft.operation_type,
            status: draft.status,
        })
    }
}

/// SQLite block event repository.
pub struct SqliteBlockEventRepository {
    session: SqliteSession,
}

impl SqliteBlockEventRepository {
    pub fn new(session: SqliteSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl BlockEventRepository for SqliteBlockEventRepository {
    async fn add(&self, draft: DraftBlockEvent) -> Result<BlockEvent, RepoError> {
        let now = Utc::now();

        let mut session = self.session.lock().await;
        let conn = session.connection()?;

        sqlx::query(
            r#"INSERT INTO block_events (payment_method_id, block_name, status, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(draft.payment_method_id.to_string())
        .bind(&draft.block_name)
        .bind(draft.status.to_string())
        .bind(now.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(BlockEvent {
            created_at: now,
            payment_method_id: draft.payment_method_id,
            block_name: draft.block_name,
            status: draft.status,
        })
    }

    async fn list(
        &self,
        payment_method_id: PaymentMethodId,
    ) -> Result<Vec<BlockEvent>, RepoError> {
        let mut session = self.session.lock().await;
        let conn = session.connection()?;

        let rows: Vec<DbBlockEvent> = sqlx::query_as(
            r#"SELECT payment_method_id, block_name, status, created_at
               FROM block_events
               WHERE payment_method_id = ?
               ORDER BY created_at, rowid"#,
        )
        .bind(payment_method_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbBlockEvent::into_domain).collect()
    }
}

/// SQLite provider transaction repository.
pub struct SqliteTransactionRepository {
    session: SqliteSession,
}

impl SqliteTransactionRepository {
    pub fn new(session: SqliteSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepository {
    async fn add(&self, draft: DraftTransaction) -> Result<Transaction, RepoError> {
        let now = Utc::now();

        let mut session = self.session.lock().await;
        let conn = session.connection()?;

        sqlx::query(
            r#"INSERT INTO transactions (external_id, provider_name, payment_method_id, raw_data, timestamp)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&draft.external_id)
        .bind(&draft.provider_name)
        .bind(draft.payment_method_id.to_string())
        .bind(draft.raw_data.to_string())
        .bind(now.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(Transaction {
            external_id: draft.external_id,
            timestamp: now,
            raw_data: draft.raw_data,
            provider_name: draft.provider_name,
            payment_method_id: draft.payment_method_id,
        })
    }

    async fn list(
        &self,
        payment_method_id: PaymentMethodId,
    ) -> Result<Vec<Transaction>, RepoError> {
        let mut session = self.session.lock().await;
        let conn = session.connection()?;

        let rows: Vec<DbTransaction> = sqlx::query_as(
            r#"SELECT external_id, provider_name, payment_method_id, raw_data, timestamp
               FROM transactions
               WHERE payment_method_id = ?
               ORDER BY timestamp, rowid"#,
        )
        .bind(payment_method_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbTransaction::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository factories
// ─────────────────────────────────────────────────────────────────────────────

pub type PaymentMethodRepositoryFactory =
    Arc<dyn Fn(SqliteSession) -> Box<dyn PaymentMethodRepository> + Send + Sync>;
pub type PaymentOperationRepositoryFactory =
    Arc<dyn Fn(SqliteSession) -> Box<dyn PaymentOperationRepository> + Send + Sync>;
pub type BlockEventRepositoryFactory =
    Arc<dyn Fn(SqliteSession) -> Box<dyn BlockEventRepository> + Send + Sync>;
pub type TransactionRepositoryFactory =
    Arc<dyn Fn(SqliteSession) -> Box<dyn TransactionRepository> + Send + Sync>;

/// One factory per entity kind.
///
/// Repositories are built only once a session exists, so a factory can be
/// swapped for a test double without touching orchestration code.
#[derive(Clone)]
pub struct RepositoryFactories {
    pub payment_methods: PaymentMethodRepositoryFactory,
    pub payment_operations: PaymentOperationRepositoryFactory,
    pub block_events: BlockEventRepositoryFactory,
    pub transactions: TransactionRepositoryFactory,
}

impl Default for RepositoryFactories {
    fn default() -> Self {
        Self {
            payment_methods: Arc::new(|s| Box::new(SqlitePaymentMethodRepository::new(s))),
            payment_operations: Arc::new(|s| Box::new(SqlitePaymentOperationRepository::new(s))),
            block_events: Arc::new(|s| Box::new(SqliteBlockEventRepository::new(s))),
            transactions: Arc::new(|s| Box::new(SqliteTransactionRepository::new(s))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit of work
// ─────────────────────────────────────────────────────────────────────────────

/// One consistent view over the four repositories, bound to one session.
pub struct SqliteUnitOfWork {
    session: SqliteSession,
    payment_methods: Box<dyn PaymentMethodRepository>,
    payment_operations: Box<dyn PaymentOperationRepository>,
    block_events: Box<dyn BlockEventRepository>,
    transactions: Box<dyn TransactionRepository>,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    fn payment_methods(&self) -> &dyn PaymentMethodRepository {
        self.payment_methods.as_ref()
    }

    fn payment_operations(&self) -> &dyn PaymentOperationRepository {
        self.payment_operations.as_ref()
    }

    fn block_events(&self) -> &dyn BlockEventRepository {
        self.block_events.as_ref()
    }

    fn transactions(&self) -> &dyn TransactionRepository {
        self.transactions.as_ref()
    }

    async fn commit(&self) -> Result<(), RepoError> {
        self.session.commit().await
    }

    async fn rollback(&self) -> Result<(), RepoError> {
        self.session.rollback().await
    }
}

/// Builds unit-of-work scopes over a SQLite pool.
pub struct SqliteUnitOfWorkProvider {
    pool: SqlitePool,
    factories: RepositoryFactories,
}

impl SqliteUnitOfWorkProvider {
    /// Connects to the database, runs the migration, and returns a
    /// ready-to-use provider with the bundled SQLite repositories.
    ///
    /// The pool is capped at one connection: the core targets a single
    /// writer, and the session of an open unit of work must be the only
    /// path to the store while its scope lives.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let ddl = include_str!("../migrations/0001_create_tables.sql");
        for statement in ddl.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt)
                    .execute(&pool)
                    .await
                    .map_err(|e| anyhow::anyhow!("Migration 0001 failed: {e}"))?;
            }
        }

        Ok(Self {
            pool,
            factories: RepositoryFactories::default(),
        })
    }

    /// Builds a provider over an existing pool with custom factories.
    pub fn with_factories(pool: SqlitePool, factories: RepositoryFactories) -> Self {
        Self { pool, factories }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UnitOfWorkProvider for SqliteUnitOfWorkProvider {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepoError> {
        let session = SqliteSession::begin(self.pool.clone()).await?;
        Ok(Box::new(SqliteUnitOfWork {
            payment_methods: (self.factories.payment_methods)(session.clone()),
            payment_operations: (self.factories.payment_operations)(session.clone()),
            block_events: (self.factories.block_events)(session.clone()),
            transactions: (self.factories.transactions)(session.clone()),
            session,
        }))
    }
}
