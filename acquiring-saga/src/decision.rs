//! Decision logic: can a payment method go through a given operation type?
//!
//! Pure predicates over the aggregate's operation history. Each saga step
//! consults exactly one of these before writing anything.

use acquiring_types::{OperationStatus, OperationType, PaymentMethod};

/// A method can initialize only if it never started initializing.
pub fn can_initialize(payment_method: &PaymentMethod) -> bool {
    !payment_method.has_operation(OperationType::Initialize, OperationStatus::Started)
}

/// A method can process an action only if initialization ended requiring
/// one and the action was not already taken up.
pub fn can_process_action(payment_method: &PaymentMethod) -> bool {
    payment_method.has_operation(OperationType::Initialize, OperationStatus::Started)
        && payment_method.has_operation(OperationType::Initialize, OperationStatus::RequiresAction)
        && !payment_method.has_operation(OperationType::ProcessAction, OperationStatus::Started)
}

/// Initialization finished successfully: either it completed directly, was
/// skipped, or required an action that has since completed.
fn initialized(payment_method: &PaymentMethod) -> bool {
    payment_method.has_operation(OperationType::Initialize, OperationStatus::Started)
        && (payment_method.has_operation(OperationType::Initialize, OperationStatus::Completed)
            || payment_method
                .has_operation(OperationType::Initialize, OperationStatus::NotPerformed)
            || (payment_method
                .has_operation(OperationType::Initialize, OperationStatus::RequiresAction)
                && payment_method
                    .has_operation(OperationType::ProcessAction, OperationStatus::Completed)))
}

/// A method can run after-pay once initialized and paid, at most once.
pub fn can_after_pay(payment_method: &PaymentMethod) -> bool {
    initialized(payment_method)
        && payment_method.has_operation(OperationType::Pay, OperationStatus::Started)
        && payment_method.has_operation(OperationType::Pay, OperationStatus::Completed)
        && !payment_method.has_operation(OperationType::AfterPay, OperationStatus::Started)
}

/// Only confirmable methods with a completed after-pay can confirm.
pub fn can_confirm(payment_method: &PaymentMethod) -> bool {
    payment_method.confirmable
        && payment_method.has_operation(OperationType::AfterPay, OperationStatus::Started)
        && payment_method.has_operation(OperationType::AfterPay, OperationStatus::Completed)
        && !payment_method.has_operation(OperationType::Confirm, OperationStatus::Started)
}

/// After-confirm follows a completed confirm, at most once.
pub fn can_after_confirm(payment_method: &PaymentMethod) -> bool {
    payment_method.confirmable
        && payment_method.has_operation(OperationType::Confirm, OperationStatus::Started)
        && payment_method.has_operation(OperationType::Confirm, OperationStatus::Completed)
        && !payment_method.has_operation(OperationType::AfterConfirm, OperationStatus::Started)
}

/// A method can refund once its flow completed (after-confirm for
/// confirmable methods, after-pay otherwise) and no refund is in flight.
/// A completed refund does not preclude another (partial refunds).
pub fn can_refund(payment_method: &PaymentMethod) -> bool {
    let no_refund_in_flight =
        payment_method.count_operation(OperationType::Refund, OperationStatus::Started)
            == payment_method.count_operation(OperationType::Refund, OperationStatus::Completed);

    let flow_completed = if payment_method.confirmable {
        payment_method.has_operation(OperationType::AfterConfirm, OperationStatus::Completed)
    } else {
        payment_method.has_operation(OperationType::AfterPay, OperationStatus::Completed)
    };

    no_refund_in_flight && flow_completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use acquiring_types::{
        Currency, Money, PaymentAttempt, PaymentAttemptId, PaymentMethodId, PaymentOperation,
    };
    use chrono::Utc;

    use OperationStatus::*;
    use OperationType::*;

    fn payment_method(
        confirmable: bool,
        operations: &[(OperationType, OperationStatus)],
    ) -> PaymentMethod {
        let id = PaymentMethodId::new();
        PaymentMethod {
            id,
            payment_attempt: PaymentAttempt {
                id: PaymentAttemptId::new(),
                created_at: Utc::now(),
                amount: Money::new(1000, Currency::USD).unwrap(),
                payment_method_ids: vec![id],
            },
            created_at: Utc::now(),
            confirmable,
            payment_operations: operations
                .iter()
                .map(|&(operation_type, status)| PaymentOperation {
                    created_at: Utc::now(),
                    payment_method_id: id,
                    operation_type,
                    status,
                })
                .collect(),
        }
    }

    #[test]
    fn test_fresh_method_can_initialize() {
        assert!(can_initialize(&payment_method(true, &[])));
    }

    #[test]
    fn test_started_initialize_blocks_initialize() {
        assert!(!can_initialize(&payment_method(
            true,
            &[(Initialize, Started)]
        )));
        assert!(!can_initialize(&payment_method(
            true,
            &[(Initialize, Started), (Initialize, Completed)]
        )));
    }

    #[test]
    fn test_requires_action_enables_process_action() {
        assert!(can_process_action(&payment_method(
            false,
            &[(Initialize, Started), (Initialize, RequiresAction)]
        )));
    }

    #[test]
    fn test_process_action_blocked_without_requires_action() {
        assert!(!can_process_action(&payment_method(
            false,
            &[(Initialize, Started)]
        )));
        assert!(!can_process_action(&payment_method(
            false,
            &[(Initialize, Started), (Initialize, Completed)]
        )));
    }

    #[test]
    fn test_process_action_runs_at_most_once() {
        assert!(!can_process_action(&payment_method(
            false,
            &[
                (Initialize, Started),
                (Initialize, RequiresAction),
                (ProcessAction, Started),
            ]
        )));
    }

    #[test]
    fn test_paid_method_can_after_pay() {
        for init_outcome in [Completed, NotPerformed] {
            assert!(can_after_pay(&payment_method(
                false,
                &[
                    (Initialize, Started),
                    (Initialize, init_outcome),
                    (Pay, Started),
                    (Pay, Completed),
                ]
            )));
        }
    }

    #[test]
    fn test_after_pay_accepts_process_action_path() {
        assert!(can_after_pay(&payment_method(
            false,
            &[
                (Initialize, Started),
                (Initialize, RequiresAction),
                (ProcessAction, Started),
                (ProcessAction, Completed),
                (Pay, Started),
                (Pay, Completed),
            ]
        )));
    }

    #[test]
    fn test_after_pay_blocked_when_not_initialized_or_not_paid() {
        assert!(!can_after_pay(&payment_method(
            false,
            &[(Initialize, Started)]
        )));
        assert!(!can_after_pay(&payment_method(
            false,
            &[(Initialize, Started), (Initialize, Failed)]
        )));
        assert!(!can_after_pay(&payment_method(
            false,
            &[
                (Initialize, Started),
                (Initialize, NotPerformed),
                (Pay, Started),
                (Pay, Failed),
            ]
        )));
    }

    #[test]
    fn test_after_pay_runs_at_most_once() {
        assert!(!can_after_pay(&payment_method(
            false,
            &[
                (Initialize, Started),
                (Initialize, NotPerformed),
                (Pay, Started),
                (Pay, Completed),
                (AfterPay, Started),
            ]
        )));
    }

    #[test]
    fn test_confirm_requires_confirmable_and_after_pay_completed() {
        let chain = [
            (Initialize, Started),
            (Initialize, NotPerformed),
            (Pay, Started),
            (Pay, Completed),
            (AfterPay, Started),
            (AfterPay, Completed),
        ];
        assert!(can_confirm(&payment_method(true, &chain)));
        assert!(!can_confirm(&payment_method(false, &chain)));
    }

    #[test]
    fn test_confirm_blocked_when_after_pay_unfinished_or_already_confirming() {
        assert!(!can_confirm(&payment_method(
            true,
            &[
                (Initialize, Started),
                (Initialize, NotPerformed),
                (Pay, Started),
                (Pay, Completed),
                (AfterPay, Started),
            ]
        )));
        assert!(!can_confirm(&payment_method(
            true,
            &[
                (Initialize, Started),
                (Initialize, NotPerformed),
                (Pay, Started),
                (Pay, Completed),
                (AfterPay, Started),
                (AfterPay, Completed),
                (Confirm, Started),
            ]
        )));
    }

    #[test]
    fn test_after_confirm_follows_completed_confirm() {
        let chain = [
            (Initialize, Started),
            (Initialize, NotPerformed),
            (Pay, Started),
            (Pay, Completed),
            (AfterPay, Started),
            (AfterPay, Completed),
            (Confirm, Started),
            (Confirm, Completed),
        ];
        assert!(can_after_confirm(&payment_method(true, &chain)));
        assert!(!can_after_confirm(&payment_method(false, &chain)));

        let mut with_after_confirm = chain.to_vec();
        with_after_confirm.push((AfterConfirm, Started));
        assert!(!can_after_confirm(&payment_method(true, &with_after_confirm)));
    }

    #[test]
    fn test_refund_for_non_confirmable_needs_after_pay_completed() {
        let chain = [
            (Initialize, Started),
            (Initialize, Completed),
            (Pay, Started),
            (Pay, Completed),
            (AfterPay, Started),
            (AfterPay, Completed),
        ];
        assert!(can_refund(&payment_method(false, &chain)));
        assert!(!can_refund(&payment_method(true, &chain)));
    }

    #[test]
    fn test_refund_blocked_while_one_is_in_flight_but_not_after_completion() {
        let mut chain = vec![
            (Initialize, Started),
            (Initialize, Completed),
            (Pay, Started),
            (Pay, Completed),
            (AfterPay, Started),
            (AfterPay, Completed),
            (Refund, Started),
        ];
        assert!(!can_refund(&payment_method(false, &chain)));

        chain.push((Refund, Completed));
        assert!(can_refund(&payment_method(false, &chain)));
    }
}
