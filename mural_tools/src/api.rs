use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::MuralConfig,
    data_objects::{ExecutePayoutBody, PayoutRequest, PayoutRequestBody},
    MuralApiError,
};

const TRANSFER_API_KEY_HEADER: &str = "transfer-api-key";

#[derive(Clone)]
pub struct MuralApi {
    config: MuralConfig,
    client: Arc<Client>,
}

impl MuralApi {
    pub fn new(config: MuralConfig) -> Result<Self, MuralApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(&format!("Bearer {}", config.api_key.reveal()))
            .map_err(|e| MuralApiError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MuralApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Sends a request to the Mural API and deserializes the JSON answer.
    ///
    /// Calls that move funds must set `transfer` so that the transfer API key is attached. Any non-2xx status is
    /// returned as [`MuralApiError::QueryError`] carrying the response body.
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
        transfer: bool,
    ) -> Result<T, MuralApiError> {
        let url = self.url(path);
        debug!("💸️ {method} {url}");
        let mut req = self.client.request(method, url);
        if transfer {
            let key = HeaderValue::from_str(self.config.transfer_api_key.reveal())
                .map_err(|e| MuralApiError::Initialization(e.to_string()))?;
            req = req.header(TRANSFER_API_KEY_HEADER, key);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(MuralApiError::from_reqwest)?;
        let status = response.status();
        if status.is_success() {
            trace!("💸️ Mural query successful. {status}");
            response.json::<T>().await.map_err(|e| MuralApiError::JsonError(e.to_string()))
        } else {
            let message = response.text().await.map_err(MuralApiError::from_reqwest)?;
            error!("💸️ Mural API error {status}: {message}");
            Err(MuralApiError::QueryError { status: status.as_u16(), message })
        }
    }

    /// Stages a payout request. Nothing is sent until the request is executed.
    pub async fn create_payout_request(&self, body: &PayoutRequestBody) -> Result<PayoutRequest, MuralApiError> {
        let request =
            self.rest_query::<PayoutRequest, _>(Method::POST, "/api/payouts/payout", Some(body), false).await?;
        info!("💸️ Created payout request {} ({})", request.id, request.status);
        Ok(request)
    }

    pub async fn execute_payout_request(&self, request_id: &str) -> Result<PayoutRequest, MuralApiError> {
        let path = format!("/api/payouts/payout/{request_id}/execute");
        let body = ExecutePayoutBody::default();
        let request = self.rest_query::<PayoutRequest, _>(Method::POST, &path, Some(body), true).await?;
        info!("💸️ Executed payout request {} ({})", request.id, request.status);
        Ok(request)
    }

    pub async fn get_payout_request(&self, request_id: &str) -> Result<PayoutRequest, MuralApiError> {
        let path = format!("/api/payouts/payout/{request_id}");
        self.rest_query::<PayoutRequest, ()>(Method::GET, &path, None, false).await
    }
}
