//! Typed HTTP client and the headless view-models built on top of it.
//!
//! Each view-model is generic over [`Backend`], so the same workflow code
//! runs against [`ApiClient`] in production and an in-memory fake in tests.

use std::{future::Future, time::Duration};

use reqwest::{Client, Method, StatusCode, Url, header};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    dto::{
        auth::{SessionInfo, SignInRequest, SignInResponse},
        inventory::{AdjustmentResult, ApplyCountsRequest, ProductList},
        sales::{InvoiceList, InvoiceReceipt, RecordSaleRequest, RecordedSale},
    },
    models::{Invoice, Product},
    response::ApiResponse,
};

pub mod history;
pub mod inventory;
pub mod new_sale;
pub mod session;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("session store: {0}")]
    Store(#[from] std::io::Error),

    #[error("session store: {0}")]
    StoreFormat(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),

    #[error("not signed in")]
    NotSignedIn,
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Everything the views need from the server.
pub trait Backend: Send + Sync {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = ClientResult<SignInResponse>> + Send;

    fn sign_out(&self, token: &str) -> impl Future<Output = ClientResult<()>> + Send;

    fn current_session(&self, token: &str)
    -> impl Future<Output = ClientResult<SessionInfo>> + Send;

    fn list_products(&self, token: &str) -> impl Future<Output = ClientResult<Vec<Product>>> + Send;

    fn apply_counts(
        &self,
        token: &str,
        request: ApplyCountsRequest,
    ) -> impl Future<Output = ClientResult<AdjustmentResult>> + Send;

    fn record_sale(
        &self,
        token: &str,
        request: RecordSaleRequest,
    ) -> impl Future<Output = ClientResult<RecordedSale>> + Send;

    fn list_invoices(&self, token: &str) -> impl Future<Output = ClientResult<Vec<Invoice>>> + Send;

    fn invoice_receipt(
        &self,
        token: &str,
        invoice_id: Uuid,
    ) -> impl Future<Output = ClientResult<InvoiceReceipt>> + Send;
}

/// [`Backend`] over HTTP.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::Decode(format!("base url: {e}")))?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Decode(format!("url {path}: {e}")))
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .http
            .request(method, self.url(path)?)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        decode_envelope(status, &bytes)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> ClientResult<T> {
        self.send::<(), T>(Method::GET, path, Some(token), None)
            .await
    }
}

/// Unwraps `{message, data, meta}`; error envelopes carry `data.error`.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ClientResult<T> {
    let envelope: ApiResponse<serde_json::Value> = serde_json::from_slice(body).map_err(|e| {
        if status.is_success() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Api {
                status: status.as_u16(),
                message: status.to_string(),
            }
        }
    })?;

    if !status.is_success() {
        let message = envelope
            .data
            .as_ref()
            .and_then(|data| data.get("error"))
            .and_then(|error| error.as_str())
            .map(str::to_string)
            .unwrap_or(envelope.message);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let data = envelope.data.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
}

impl Backend for ApiClient {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<SignInResponse> {
        let body = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(Method::POST, "/api/auth/sign-in", None, Some(&body))
            .await
    }

    async fn sign_out(&self, token: &str) -> ClientResult<()> {
        let _: serde_json::Value = self
            .send::<(), _>(Method::POST, "/api/auth/sign-out", Some(token), None)
            .await?;
        Ok(())
    }

    async fn current_session(&self, token: &str) -> ClientResult<SessionInfo> {
        self.get("/api/auth/session", token).await
    }

    async fn list_products(&self, token: &str) -> ClientResult<Vec<Product>> {
        let list: ProductList = self.get("/api/products", token).await?;
        Ok(list.items)
    }

    async fn apply_counts(
        &self,
        token: &str,
        request: ApplyCountsRequest,
    ) -> ClientResult<AdjustmentResult> {
        self.send(
            Method::POST,
            "/api/inventory/adjustments",
            Some(token),
            Some(&request),
        )
        .await
    }

    async fn record_sale(
        &self,
        token: &str,
        request: RecordSaleRequest,
    ) -> ClientResult<RecordedSale> {
        self.send(Method::POST, "/api/sales", Some(token), Some(&request))
            .await
    }

    async fn list_invoices(&self, token: &str) -> ClientResult<Vec<Invoice>> {
        let list: InvoiceList = self.get("/api/invoices", token).await?;
        Ok(list.items)
    }

    async fn invoice_receipt(&self, token: &str, invoice_id: Uuid) -> ClientResult<InvoiceReceipt> {
        self.get(&format!("/api/invoices/{invoice_id}/receipt"), token)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_surfaces_server_message() {
        let body = br#"{"message":"Invalid login credentials","data":{"error":"Invalid login credentials"},"meta":null}"#;
        let err = decode_envelope::<SignInResponse>(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn non_json_error_falls_back_to_status() {
        let err = decode_envelope::<ProductList>(StatusCode::BAD_GATEWAY, b"<html>").unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 502, .. }));
    }

    #[test]
    fn success_envelope_decodes_data() {
        let body = br#"{"message":"Invoices","data":[],"meta":{"page":1,"per_page":0,"total":0}}"#;
        let list = decode_envelope::<InvoiceList>(StatusCode::OK, body).unwrap();
        assert!(list.items.is_empty());
    }
}
