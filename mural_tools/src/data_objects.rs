use serde::{Deserialize, Serialize};
use serde_json::Value;
use upg_common::{MicroUsdc, USDC_CURRENCY_CODE};

/// Payout request status once every payout in it has been sent to the bank
pub const EXECUTED_STATUS: &str = "EXECUTED";
pub const FAILED_STATUS: &str = "FAILED";

//--------------------------------------     Requests     ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequestBody {
    pub source_account_id: String,
    pub memo: String,
    pub payouts: Vec<PayoutBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutBody {
    pub amount: PayoutAmount,
    pub recipient_info: RecipientInfo,
    pub payout_details: FiatPayoutDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutAmount {
    pub token_amount: f64,
    pub token_symbol: String,
}

impl PayoutAmount {
    pub fn usdc(amount: MicroUsdc) -> Self {
        Self { token_amount: amount.to_f64(), token_symbol: USDC_CURRENCY_CODE.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientInfo {
    #[serde(rename = "type")]
    pub recipient_type: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub physical_address: PhysicalAddress,
}

impl RecipientInfo {
    pub fn individual(first_name: String, last_name: String, email: String, physical_address: PhysicalAddress) -> Self {
        Self { recipient_type: "individual".to_string(), first_name, last_name, email, physical_address }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAddress {
    pub address1: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatPayoutDetails {
    #[serde(rename = "type")]
    pub details_type: String,
    pub bank_name: String,
    pub bank_account_owner: String,
    /// Rail specific bank details, e.g. `{"type": "cop", "symbol": "COP", "bankAccountNumber": ...}`
    pub fiat_and_rail_details: Value,
}

impl FiatPayoutDetails {
    pub fn new(bank_name: String, bank_account_owner: String, fiat_and_rail_details: Value) -> Self {
        Self { details_type: "fiat".to_string(), bank_name, bank_account_owner, fiat_and_rail_details }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeRateToleranceMode {
    Flexible,
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePayoutBody {
    pub exchange_rate_tolerance_mode: ExchangeRateToleranceMode,
}

impl Default for ExecutePayoutBody {
    fn default() -> Self {
        Self { exchange_rate_tolerance_mode: ExchangeRateToleranceMode::Flexible }
    }
}

//--------------------------------------     Responses     --------------------------------------------------------

/// A payout request as Mural reports it. Only the fields the gateway uses are typed; the individual payouts are kept
/// as raw JSON for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub source_account_id: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub payouts: Vec<Value>,
}
