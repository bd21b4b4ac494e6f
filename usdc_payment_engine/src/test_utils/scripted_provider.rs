use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;

use crate::{
    db_types::MicroUsdc,
    payout_provider::{PayoutProvider, PayoutProviderError, PayoutRecipient, PayoutRequestInfo, PayoutRequestStatus},
};

/// An in-memory [`PayoutProvider`] whose answers are set by the test.
///
/// Clones share the same script, so a test can keep a handle and inspect the calls made after handing a clone to the
/// API under test.
#[derive(Clone, Default)]
pub struct ScriptedPayoutProvider {
    script: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    create_error: Option<PayoutProviderError>,
    execute_error: Option<PayoutProviderError>,
    lookup_error: Option<PayoutProviderError>,
    status: Option<PayoutRequestStatus>,
    next_id: u64,
    created: Vec<(String, MicroUsdc)>,
    executed: Vec<String>,
    lookups: usize,
}

impl ScriptedPayoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("Script lock poisoned")
    }

    pub fn fail_create(&self, err: PayoutProviderError) -> &Self {
        self.script().create_error = Some(err);
        self
    }

    pub fn fail_execute(&self, err: PayoutProviderError) -> &Self {
        self.script().execute_error = Some(err);
        self
    }

    pub fn fail_lookup(&self, err: Option<PayoutProviderError>) -> &Self {
        self.script().lookup_error = err;
        self
    }

    /// Sets the status reported for every payout request from now on.
    pub fn set_status(&self, status: PayoutRequestStatus) -> &Self {
        self.script().status = Some(status);
        self
    }

    /// The (request id, amount) of every payout request created so far
    pub fn created_requests(&self) -> Vec<(String, MicroUsdc)> {
        self.script().created.clone()
    }

    pub fn executed_requests(&self) -> Vec<String> {
        self.script().executed.clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.script().lookups
    }
}

impl PayoutProvider for ScriptedPayoutProvider {
    async fn create_payout_request(
        &self,
        _source_account_id: &str,
        amount: MicroUsdc,
        _recipient: &PayoutRecipient,
    ) -> Result<String, PayoutProviderError> {
        let mut script = self.script();
        if let Some(e) = script.create_error.clone() {
            return Err(e);
        }
        script.next_id += 1;
        let id = format!("payout-request-{}", script.next_id);
        script.created.push((id.clone(), amount));
        Ok(id)
    }

    async fn execute_payout_request(&self, request_id: &str) -> Result<PayoutRequestStatus, PayoutProviderError> {
        let mut script = self.script();
        if let Some(e) = script.execute_error.clone() {
            return Err(e);
        }
        script.executed.push(request_id.to_string());
        Ok(PayoutRequestStatus::Other("PENDING".into()))
    }

    async fn get_payout_request(&self, request_id: &str) -> Result<PayoutRequestInfo, PayoutProviderError> {
        let mut script = self.script();
        script.lookups += 1;
        if let Some(e) = script.lookup_error.clone() {
            return Err(e);
        }
        let status = script.status.clone().unwrap_or_else(|| PayoutRequestStatus::Other("PENDING".into()));
        let payouts = vec![json!({ "id": format!("{request_id}-0"), "status": status.to_string() })];
        Ok(PayoutRequestInfo { id: request_id.to_string(), status, payouts })
    }
}
