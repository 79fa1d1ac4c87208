//! SQLite unit-of-work integration tests.

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use acquiring_types::{
        Currency, DraftBlockEvent, DraftPaymentAttempt, DraftPaymentMethod, DraftPaymentOperation,
        DraftTransaction, Money, OperationStatus, OperationType, PaymentMethodId, RepoError,
        UnitOfWorkProvider,
    };

    use crate::SqliteUnitOfWorkProvider;

    async fn setup_provider() -> SqliteUnitOfWorkProvider {
        SqliteUnitOfWorkProvider::connect("sqlite::memory:")
            .await
            .unwrap()
    }

    fn draft_method(confirmable: bool) -> DraftPaymentMethod {
        DraftPaymentMethod {
            payment_attempt: DraftPaymentAttempt {
                amount: Money::new(1000, Currency::USD).unwrap(),
            },
            confirmable,
        }
    }

    fn draft_operation(
        payment_method_id: PaymentMethodId,
        operation_type: OperationType,
        status: OperationStatus,
    ) -> DraftPaymentOperation {
        DraftPaymentOperation {
            payment_method_id,
            operation_type,
            status,
        }
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_then_commit_round_trip() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        let pm = uow.payment_methods().add(draft_method(true)).await.unwrap();
        uow.commit().await.unwrap();
        drop(uow);

        assert_eq!(count(provider.pool(), "payment_methods").await, 1);
        assert_eq!(count(provider.pool(), "payment_attempts").await, 1);

        let uow = provider.begin().await.unwrap();
        let fetched = uow.payment_methods().get(pm.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, pm.id);
        assert!(fetched.confirmable);
        assert_eq!(fetched.payment_attempt.amount.amount(), 1000);
        assert_eq!(fetched.payment_attempt.amount.currency(), Currency::USD);
        assert_eq!(fetched.payment_attempt.payment_method_ids, vec![pm.id]);
        assert!(fetched.payment_operations.is_empty());
    }

    #[tokio::test]
    async fn test_get_not_found_is_none_not_error() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        let result = uow
            .payment_methods()
            .get(PaymentMethodId::new())
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_uncommitted_writes_discarded_on_drop() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        uow.payment_methods().add(draft_method(false)).await.unwrap();
        drop(uow);

        assert_eq!(count(provider.pool(), "payment_methods").await, 0);
        assert_eq!(count(provider.pool(), "payment_attempts").await, 0);
    }

    #[tokio::test]
    async fn test_writes_visible_to_reads_within_scope_before_commit() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        let pm = uow.payment_methods().add(draft_method(false)).await.unwrap();

        let fetched = uow.payment_methods().get(pm.id).await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_appended_operations_load_eagerly_in_order() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        let pm = uow.payment_methods().add(draft_method(false)).await.unwrap();
        uow.payment_operations()
            .add(draft_operation(
                pm.id,
                OperationType::Initialize,
                OperationStatus::Started,
            ))
            .await
            .unwrap();
        uow.payment_operations()
            .add(draft_operation(
                pm.id,
                OperationType::Initialize,
                OperationStatus::Completed,
            ))
            .await
            .unwrap();

        let fetched = uow.payment_methods().get(pm.id).await.unwrap().unwrap();

        assert_eq!(fetched.payment_operations.len(), 2);
        assert_eq!(
            fetched.payment_operations[0].status,
            OperationStatus::Started
        );
        assert_eq!(
            fetched.payment_operations[1].status,
            OperationStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_commit_survives_later_failing_write() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        uow.payment_methods().add(draft_method(false)).await.unwrap();
        uow.commit().await.unwrap();

        // Unknown payment method id violates the foreign key.
        let err = uow
            .payment_operations()
            .add(draft_operation(
                PaymentMethodId::new(),
                OperationType::Initialize,
                OperationStatus::Started,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Database(_)));
        drop(uow);

        assert_eq!(count(provider.pool(), "payment_methods").await, 1);
        assert_eq!(count(provider.pool(), "payment_operations").await, 0);
    }

    #[tokio::test]
    async fn test_explicit_rollback_discards_window() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        uow.payment_methods().add(draft_method(false)).await.unwrap();
        uow.rollback().await.unwrap();

        // Further writes belong to a fresh window; nothing was committed.
        uow.payment_methods().add(draft_method(false)).await.unwrap();
        drop(uow);

        assert_eq!(count(provider.pool(), "payment_methods").await, 0);
    }

    #[tokio::test]
    async fn test_rollback_starts_fresh_independent_window() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        let discarded = uow.payment_methods().add(draft_method(false)).await.unwrap();
        uow.rollback().await.unwrap();

        let kept = uow.payment_methods().add(draft_method(true)).await.unwrap();
        uow.commit().await.unwrap();
        drop(uow);

        assert_eq!(count(provider.pool(), "payment_methods").await, 1);

        let uow = provider.begin().await.unwrap();
        assert!(uow.payment_methods().get(discarded.id).await.unwrap().is_none());
        assert!(uow.payment_methods().get(kept.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_multiple_commit_windows_in_one_scope() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        uow.payment_methods().add(draft_method(false)).await.unwrap();
        uow.commit().await.unwrap();
        uow.payment_methods().add(draft_method(true)).await.unwrap();
        uow.commit().await.unwrap();
        drop(uow);

        assert_eq!(count(provider.pool(), "payment_methods").await, 2);
    }

    #[tokio::test]
    async fn test_block_event_and_transaction_round_trip() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        let pm = uow.payment_methods().add(draft_method(false)).await.unwrap();

        let event = uow
            .block_events()
            .add(DraftBlockEvent {
                payment_method_id: pm.id,
                block_name: "dummy_block".to_string(),
                status: OperationStatus::Started,
            })
            .await
            .unwrap();
        assert_eq!(event.block_name, "dummy_block");
        assert_eq!(event.status, OperationStatus::Started);

        let raw_data = serde_json::json!({"psp_reference": "abc-123"});
        let tx = uow
            .transactions()
            .add(DraftTransaction {
                external_id: "abc-123".to_string(),
                raw_data: raw_data.clone(),
                provider_name: "fake_provider".to_string(),
                payment_method_id: pm.id,
            })
            .await
            .unwrap();
        assert_eq!(tx.raw_data, raw_data);

        uow.commit().await.unwrap();
        drop(uow);

        assert_eq!(count(provider.pool(), "block_events").await, 1);
        assert_eq!(count(provider.pool(), "transactions").await, 1);

        // Read back through the repositories from a fresh scope.
        let uow = provider.begin().await.unwrap();

        let events = uow.block_events().list(pm.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].block_name, "dummy_block");
        assert_eq!(events[0].status, OperationStatus::Started);
        assert_eq!(events[0].payment_method_id, pm.id);

        let transactions = uow.transactions().list(pm.id).await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].external_id, "abc-123");
        assert_eq!(transactions[0].provider_name, "fake_provider");
        assert_eq!(transactions[0].raw_data, raw_data);
    }

    #[tokio::test]
    async fn test_committed_history_readable_from_fresh_scope() {
        let provider = setup_provider().await;

        let uow = provider.begin().await.unwrap();
        let pm = uow.payment_methods().add(draft_method(false)).await.unwrap();
        uow.payment_operations()
            .add(draft_operation(
                pm.id,
                OperationType::Initialize,
                OperationStatus::Started,
            ))
            .await
            .unwrap();
        uow.payment_operations()
            .add(draft_operation(
                pm.id,
                OperationType::Initialize,
                OperationStatus::Failed,
            ))
            .await
            .unwrap();
        uow.commit().await.unwrap();
        drop(uow);

        let uow = provider.begin().await.unwrap();
        let fetched = uow.payment_methods().get(pm.id).await.unwrap().unwrap();

        assert_eq!(fetched.payment_operations.len(), 2);
        assert_eq!(
            fetched.payment_operations[0].status,
            OperationStatus::Started
        );
        assert_eq!(fetched.payment_operations[1].status, OperationStatus::Failed);
    }
}
