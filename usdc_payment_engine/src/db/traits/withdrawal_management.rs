use crate::{
    db_types::{NewWithdrawal, OrderId, Withdrawal, WithdrawalStatus},
    traits::PaymentGatewayError,
};

#[allow(async_fn_in_trait)]
pub trait WithdrawalManagement {
    /// Records a withdrawal. There can only be one per order; a second insert fails with
    /// [`PaymentGatewayError::WithdrawalAlreadyExists`].
    async fn insert_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, PaymentGatewayError>;

    /// All withdrawals, newest first.
    async fn fetch_withdrawals(&self) -> Result<Vec<Withdrawal>, PaymentGatewayError>;

    async fn fetch_withdrawal_for_order(&self, order_id: &OrderId) -> Result<Option<Withdrawal>, PaymentGatewayError>;

    /// Compare-and-set update of the withdrawal status. Returns `None` if the withdrawal was not in status `from`.
    async fn transition_withdrawal(
        &self,
        id: i64,
        from: WithdrawalStatus,
        to: WithdrawalStatus,
    ) -> Result<Option<Withdrawal>, PaymentGatewayError>;
}
