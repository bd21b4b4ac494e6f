use mockall::mock;
use usdc_payment_engine::{
    db_types::{
        MicroUsdc,
        NewOrder,
        NewProduct,
        NewWithdrawal,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        Product,
        ProductId,
        Withdrawal,
        WithdrawalStatus,
    },
    traits::{
        CatalogManagement,
        ClaimDepositResult,
        InsertOrderResult,
        OrderManagement,
        OrderQueryFilter,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        WithdrawalManagement,
    },
    PayoutProvider,
    PayoutProviderError,
    PayoutRecipient,
    PayoutRequestInfo,
    PayoutRequestStatus,
};

mock! {
    pub Gateway {}
    impl CatalogManagement for Gateway {
        async fn fetch_products(&self) -> Result<Vec<Product>, PaymentGatewayError>;
        async fn fetch_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, PaymentGatewayError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, PaymentGatewayError>;
    }
    impl OrderManagement for Gateway {
        async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, PaymentGatewayError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn fetch_pending_order_by_fingerprint(&self, amount: MicroUsdc) -> Result<Option<Order>, PaymentGatewayError>;
        async fn is_tx_hash_processed(&self, tx_hash: &str) -> Result<bool, PaymentGatewayError>;
    }
    impl PaymentGatewayDatabase for Gateway {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, PaymentGatewayError>;
        async fn claim_deposit(&self, amount: MicroUsdc, tx_hash: &str) -> Result<ClaimDepositResult, PaymentGatewayError>;
        async fn transition_order(&self, order_id: &OrderId, from: OrderStatusType, to: OrderStatusType) -> Result<Option<Order>, PaymentGatewayError>;
    }
    impl WithdrawalManagement for Gateway {
        async fn insert_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, PaymentGatewayError>;
        async fn fetch_withdrawals(&self) -> Result<Vec<Withdrawal>, PaymentGatewayError>;
        async fn fetch_withdrawal_for_order(&self, order_id: &OrderId) -> Result<Option<Withdrawal>, PaymentGatewayError>;
        async fn transition_withdrawal(&self, id: i64, from: WithdrawalStatus, to: WithdrawalStatus) -> Result<Option<Withdrawal>, PaymentGatewayError>;
    }
}

mock! {
    pub Provider {}
    impl PayoutProvider for Provider {
        async fn create_payout_request(&self, source_account_id: &str, amount: MicroUsdc, recipient: &PayoutRecipient) -> Result<String, PayoutProviderError>;
        async fn execute_payout_request(&self, request_id: &str) -> Result<PayoutRequestStatus, PayoutProviderError>;
        async fn get_payout_request(&self, request_id: &str) -> Result<PayoutRequestInfo, PayoutProviderError>;
    }
}
