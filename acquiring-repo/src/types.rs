//! Database row structs and their mapping into domain types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use acquiring_types::{
    BlockEvent, Currency, Money, PaymentAttempt, PaymentAttemptId, PaymentMethod, PaymentMethodId,
    PaymentOperation, RepoError, Transaction,
};

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(format!("Bad timestamp `{s}`: {e}")))
}

fn parse_method_id(s: &str) -> Result<PaymentMethodId, RepoError> {
    s.parse()
        .map_err(|e| RepoError::Database(format!("Bad payment method id `{s}`: {e}")))
}

/// Payment method row joined with its attempt.
#[derive(FromRow)]
pub struct DbPaymentMethod {
    pub id: String,
    pub confirmable: bool,
    pub created_at: String,
    pub attempt_id: String,
    pub attempt_amount: i64,
    pub attempt_currency: String,
    pub attempt_created_at: String,
}

impl DbPaymentMethod {
    pub fn into_domain(
        self,
        payment_operations: Vec<PaymentOperation>,
        linked_method_ids: Vec<String>,
    ) -> Result<PaymentMethod, RepoError> {
        let currency: Currency = self
            .attempt_currency
            .parse()
            .map_err(RepoError::Domain)?;
        let amount = Money::new(self.attempt_amount, currency).map_err(RepoError::Domain)?;
        let payment_method_ids = linked_method_ids
            .iter()
            .map(|id| parse_method_id(id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaymentMethod {
            id: parse_method_id(&self.id)?,
            payment_attempt: PaymentAttempt {
                id: self
                    .attempt_id
                    .parse::<PaymentAttemptId>()
                    .map_err(|e| RepoError::Database(format!("Bad attempt id: {e}")))?,
                created_at: parse_timestamp(&self.attempt_created_at)?,
                amount,
                payment_method_ids,
            },
            created_at: parse_timestamp(&self.created_at)?,
            confirmable: self.confirmable,
            payment_operations,
        })
    }
}

/// Payment operation row.
#[derive(FromRow)]
pub struct DbPaymentOperation {
    pub payment_method_id: String,
    pub operation_type: String,
    pub status: String,
    pub created_at: String,
}

impl DbPaymentOperation {
    pub fn into_domain(self) -> Result<PaymentOperation, RepoError> {
        Ok(PaymentOperation {
            created_at: parse_timestamp(&self.created_at)?,
            payment_method_id: parse_method_id(&self.payment_method_id)?,
            operation_type: self.operation_type.parse().map_err(RepoError::Domain)?,
            status: self.status.parse().map_err(RepoError::Domain)?,
        })
    }
}

/// Block event row.
#[derive(FromRow)]
pub struct DbBlockEvent {
    pub payment_method_id: String,
    pub block_name: String,
    pub status: String,
    pub created_at: String,
}

impl DbBlockEvent {
    pub fn into_domain(self) -> Result<BlockEvent, RepoError> {
        Ok(BlockEvent {
            created_at: parse_timestamp(&self.created_at)?,
            payment_method_id: parse_method_id(&self.payment_method_id)?,
            block_name: self.block_name,
            status: self.status.parse().map_err(RepoError::Domain)?,
        })
    }
}

/// Provider transaction row.
#[derive(FromRow)]
pub struct DbTransaction {
    pub external_id: String,
    pub provider_name: String,
    pub payment_method_id: String,
    pub raw_data: String,
    pub timestamp: String,
}

impl DbTransaction {
    pub fn into_domain(self) -> Result<Transaction, RepoError> {
        Ok(Transaction {
            external_id: self.external_id,
            timestamp: parse_timestamp(&self.timestamp)?,
            raw_data: serde_json::from_str(&self.raw_data)
                .map_err(|e| RepoError::Database(format!("Bad raw_data payload: {e}")))?,
            provider_name: self.provider_name,
            payment_method_id: parse_method_id(&self.payment_method_id)?,
        })
    }
}
