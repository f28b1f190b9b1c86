//! Razorpay payment gateway client.
//!
//! Orders are created server-side against the gateway REST API before the
//! client is handed the order descriptor for checkout. When no gateway
//! credentials are configured the application runs in test mode and this
//! client is never constructed; handlers generate local `test_order_`
//! identifiers instead.

use serde::Deserialize;
use serde_json::json;

/// Base URL of the gateway REST API.
const API_BASE: &str = "https://api.razorpay.com/v1";

/// Gateway credentials loaded from the environment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub key_id: String,
    pub key_secret: String,
}

impl GatewayConfig {
    /// Load credentials from `RAZORPAY_KEY_ID` / `RAZORPAY_KEY_SECRET`.
    ///
    /// Returns `None` when either is unset or empty, which puts the
    /// application in test mode.
    pub fn from_env() -> Option<Self> {
        let key_id = std::env::var("RAZORPAY_KEY_ID").ok().filter(|s| !s.is_empty())?;
        let key_secret = std::env::var("RAZORPAY_KEY_SECRET")
            .ok()
            .filter(|s| !s.is_empty())?;
        Some(Self { key_id, key_secret })
    }
}

/// Errors from gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gateway rejected the request ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// An order descriptor as returned by the gateway.
#[derive(Debug, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Thin client over the gateway orders API.
pub struct RazorpayGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl RazorpayGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Public key id, returned to clients so they can open checkout.
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Shared secret used for capture signature verification.
    pub fn key_secret(&self) -> &str {
        &self.config.key_secret
    }

    /// Create a pending order at the gateway.
    ///
    /// `amount` is in minor currency units. The returned order id is the
    /// join key for later capture verification.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .http
            .post(format!("{API_BASE}/orders"))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&json!({
                "amount": amount,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, body });
        }

        Ok(response.json::<GatewayOrder>().await?)
    }
}
