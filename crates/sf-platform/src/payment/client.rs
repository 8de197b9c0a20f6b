//! Payment Processor Client
//!
//! Thin form-encoded HTTP client for a Stripe-style REST API. Only the
//! endpoints the platform needs: products, prices, and checkout sessions.

use serde::Deserialize;
use tracing::info;

use crate::shared::error::{PlatformError, Result};

/// Payment client configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// API base URL (overridable for tests)
    pub api_base: String,
    pub secret_key: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created checkout session
#[derive(Debug, Clone)]
pub struct CheckoutRedirect {
    /// Processor session id ("cs_...")
    pub session_id: String,
    /// URL to redirect the buyer to
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// HTTP client for the payment processor
pub struct PaymentClient {
    http: reqwest::Client,
    config: PaymentConfig,
}

impl PaymentClient {
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn success_url(&self) -> &str {
        &self.config.success_url
    }

    /// Create a product for a course. Returns the processor product id.
    pub async fn create_product(&self, name: &str, course_id: &str) -> Result<String> {
        let params = [
            ("name", name),
            ("metadata[course_id]", course_id),
        ];

        let response: IdResponse = self.post_form("/v1/products", &params).await?;
        info!(product_id = %response.id, course_id = %course_id, "Processor product created");
        Ok(response.id)
    }

    /// Create a one-time price for a product. Returns the price id.
    pub async fn create_price(
        &self,
        product_id: &str,
        amount_cents: i64,
        currency: &str,
    ) -> Result<String> {
        let amount = amount_cents.to_string();
        let params = [
            ("product", product_id),
            ("unit_amount", amount.as_str()),
            ("currency", currency),
        ];

        let response: IdResponse = self.post_form("/v1/prices", &params).await?;
        Ok(response.id)
    }

    /// Create a hosted checkout session. Course and student ids ride along
    /// as metadata so the webhook can correlate without extra lookups.
    pub async fn create_checkout_session(
        &self,
        price_id: &str,
        course_id: &str,
        student_id: &str,
    ) -> Result<CheckoutRedirect> {
        let params = [
            ("mode", "payment"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", self.config.success_url.as_str()),
            ("cancel_url", self.config.cancel_url.as_str()),
            ("metadata[course_id]", course_id),
            ("metadata[student_id]", student_id),
        ];

        let response: SessionResponse = self.post_form("/v1/checkout/sessions", &params).await?;
        let url = response.url.ok_or_else(|| {
            PlatformError::payment("Processor returned a session without a redirect URL")
        })?;

        Ok(CheckoutRedirect {
            session_id: response.id,
            url,
        })
    }

    /// Expire a pending session on the processor side (course unpublished
    /// while a checkout was in flight).
    pub async fn expire_session(&self, session_id: &str) -> Result<()> {
        let path = format!("/v1/checkout/sessions/{}/expire", session_id);
        let _: IdResponse = self.post_form(&path, &[]).await?;
        Ok(())
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);

        let response = self.http
            .post(&url)
            .basic_auth(&self.config.secret_key, Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| PlatformError::payment(format!("Processor request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => format!(
                    "{} ({})",
                    body.error.message.unwrap_or_else(|| "unknown error".to_string()),
                    body.error.error_type.unwrap_or_else(|| status.to_string()),
                ),
                Err(_) => status.to_string(),
            };
            return Err(PlatformError::payment(format!("Processor error: {}", message)));
        }

        response.json().await.map_err(|e| {
            PlatformError::payment(format!("Failed to parse processor response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PaymentClient {
        PaymentClient::new(PaymentConfig {
            api_base: server.uri(),
            secret_key: "sk_test_123".to_string(),
            success_url: "http://localhost:3000/checkout/success".to_string(),
            cancel_url: "http://localhost:3000/checkout/cancel".to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_product() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/products"))
            .and(body_string_contains("name=Rust+for+Beginners"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "prod_123",
                "object": "product",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let product_id = client.create_product("Rust for Beginners", "c-1").await.unwrap();
        assert_eq!(product_id, "prod_123");
    }

    #[tokio::test]
    async fn test_create_checkout_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("metadata%5Bcourse_id%5D=c-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_123",
                "url": "https://checkout.example.com/cs_123",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let redirect = client.create_checkout_session("price_1", "c-1", "s-1").await.unwrap();
        assert_eq!(redirect.session_id, "cs_123");
        assert!(redirect.url.contains("cs_123"));
    }

    #[tokio::test]
    async fn test_processor_error_surfaces_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/prices"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Invalid currency", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.create_price("prod_1", 1999, "zzz").await.unwrap_err();
        assert!(err.to_string().contains("Invalid currency"));
    }
}
