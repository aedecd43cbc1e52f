//! # REST API Client
//!
//! One method per backend endpoint, with the bearer token attached to every
//! request when a session exists.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ApiClient request flow                           │
//! │                                                                         │
//! │  caller ──► validate input (livemart-core) ──► build request            │
//! │                                                   │                     │
//! │                     TokenSource::bearer_token() ──┤ Authorization:      │
//! │                                                   │ Bearer <token>      │
//! │                                                   ▼                     │
//! │                                             reqwest send                │
//! │                                                   │                     │
//! │             2xx ──► decode JSON body ◄────────────┤                     │
//! │         non-2xx ──► ClientError::Http { status, detail } ◄──┘           │
//! │                                                                         │
//! │  No retries. A failure is returned to the caller as-is.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Endpoints
//! | Method | Path                             | Operation                  |
//! |--------|----------------------------------|----------------------------|
//! | POST   | `/auth/login/request-otp`        | `request_login_otp`        |
//! | POST   | `/auth/login/verify-otp`         | `verify_login_otp`         |
//! | POST   | `/auth/register/request-otp`     | `request_registration_otp` |
//! | POST   | `/auth/register/verify-otp`      | `verify_registration_otp`  |
//! | GET    | `/products/`                     | `list_products`            |
//! | POST   | `/products/`                     | `create_product`           |
//! | POST   | `/orders/`                       | `create_retail_order`      |
//! | POST   | configurable wholesale path      | `create_wholesale_order`   |
//! | GET    | `/orders/my-orders`              | `my_orders`                |
//! | GET    | `/orders/retailer`               | `retailer_orders`          |
//! | GET    | `/orders/wholesaler`             | `wholesaler_orders`        |
//! | GET    | `/orders/my-wholesale-orders`    | `my_wholesale_orders`      |
//! | PATCH  | `/orders/{id}/status`            | `update_order_status`      |

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

use livemart_core::validation::{
    validate_email, validate_new_product, validate_otp, validate_password, validate_person_name,
};
use livemart_core::{
    LoginGrant, NewOrder, NewProduct, OrderId, OrderRecord, OrderStatus, Product, Role,
    ValidationError,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Token Source
// =============================================================================

/// Supplies the bearer token for outgoing requests.
pub trait TokenSource: Send + Sync {
    /// The current token, or `None` when logged out.
    fn bearer_token(&self) -> Option<SecretString>;
}

/// Token source for clients that never authenticate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenSource for Anonymous {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}

// =============================================================================
// Request / Response Bodies
// =============================================================================

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyLoginBody<'a> {
    email: &'a str,
    password: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
struct RegistrationBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    otp: Option<&'a str>,
}

#[derive(Serialize)]
struct StatusBody {
    status: OrderStatus,
}

/// Registration form, shared by both registration steps.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Role,
}

impl Registration {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_person_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(self.password.expose_secret())?;
        Ok(())
    }

    fn body<'a>(&'a self, otp: Option<&'a str>) -> RegistrationBody<'a> {
        RegistrationBody {
            name: self.name.trim(),
            email: self.email.trim(),
            password: self.password.expose_secret(),
            role: self.role,
            otp,
        }
    }
}

/// Acknowledgement bodies such as `{"ok": true}` or `{"message": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_ok() -> bool {
    true
}

// =============================================================================
// Api Client
// =============================================================================

/// HTTP client for the LiveMart backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
    wholesale_order_path: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    /// Builds a client from validated configuration.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> ClientResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(ApiClient {
            http,
            base_url: config.base_url()?,
            timeout_secs: config.api.timeout_secs,
            wholesale_order_path: config.api.wholesale_order_path.clone(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Asks the backend to email a login OTP.
    #[instrument(skip(self))]
    pub async fn request_login_otp(&self, email: &str) -> ClientResult<Ack> {
        validate_email(email)?;
        let request = self
            .request(Method::POST, "/auth/login/request-otp")?
            .json(&EmailBody { email: email.trim() });
        self.send(request).await
    }

    /// Exchanges email, password and OTP for a bearer token.
    #[instrument(skip(self, password, otp))]
    pub async fn verify_login_otp(
        &self,
        email: &str,
        password: &SecretString,
        otp: &str,
    ) -> ClientResult<LoginGrant> {
        validate_email(email)?;
        validate_password(password.expose_secret())?;
        validate_otp(otp)?;

        let request = self
            .request(Method::POST, "/auth/login/verify-otp")?
            .json(&VerifyLoginBody {
                email: email.trim(),
                password: password.expose_secret(),
                otp: otp.trim(),
            });
        let grant: LoginGrant = self.send(request).await?;
        debug!(role = %grant.role, "Login verified");
        Ok(grant)
    }

    /// Starts registration; the backend emails an OTP.
    #[instrument(skip(self, form), fields(email = %form.email, role = %form.role))]
    pub async fn request_registration_otp(&self, form: &Registration) -> ClientResult<Ack> {
        form.validate()?;
        let request = self
            .request(Method::POST, "/auth/register/request-otp")?
            .json(&form.body(None));
        self.send(request).await
    }

    /// Completes registration with the emailed OTP.
    #[instrument(skip(self, form, otp), fields(email = %form.email, role = %form.role))]
    pub async fn verify_registration_otp(
        &self,
        form: &Registration,
        otp: &str,
    ) -> ClientResult<Ack> {
        form.validate()?;
        validate_otp(otp)?;
        let request = self
            .request(Method::POST, "/auth/register/verify-otp")?
            .json(&form.body(Some(otp.trim())));
        self.send(request).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let products: Vec<Product> = self.send(self.request(Method::GET, "/products/")?).await?;
        debug!(count = products.len(), "Products fetched");
        Ok(products)
    }

    /// Lists a new product for the logged-in retailer or wholesaler.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> ClientResult<Product> {
        validate_new_product(product)?;
        let request = self.request(Method::POST, "/products/")?.json(product);
        self.send(request).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    #[instrument(skip(self), fields(product_id = %order.product_id, quantity = order.quantity))]
    pub async fn create_retail_order(&self, order: &NewOrder) -> ClientResult<OrderRecord> {
        self.create_order("/orders/", order).await
    }

    #[instrument(skip(self), fields(product_id = %order.product_id, quantity = order.quantity))]
    pub async fn create_wholesale_order(&self, order: &NewOrder) -> ClientResult<OrderRecord> {
        self.create_order(&self.wholesale_order_path, order).await
    }

    /// Orders placed by the logged-in customer.
    pub async fn my_orders(&self) -> ClientResult<Vec<OrderRecord>> {
        self.list_orders("/orders/my-orders").await
    }

    /// Orders received by the logged-in retailer.
    pub async fn retailer_orders(&self) -> ClientResult<Vec<OrderRecord>> {
        self.list_orders("/orders/retailer").await
    }

    /// Orders received by the logged-in wholesaler.
    pub async fn wholesaler_orders(&self) -> ClientResult<Vec<OrderRecord>> {
        self.list_orders("/orders/wholesaler").await
    }

    /// Wholesale orders placed by the logged-in retailer.
    pub async fn my_wholesale_orders(&self) -> ClientResult<Vec<OrderRecord>> {
        self.list_orders("/orders/my-wholesale-orders").await
    }

    /// Moves an order to a new fulfilment state.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> ClientResult<Ack> {
        if !OrderStatus::SETTABLE.contains(&status) {
            return Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::SETTABLE
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            }
            .into());
        }

        let request = self
            .request(Method::PATCH, &format!("/orders/{}/status", id))?
            .json(&StatusBody { status });
        self.send(request).await
    }

    async fn create_order(&self, path: &str, order: &NewOrder) -> ClientResult<OrderRecord> {
        if order.quantity == 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        let request = self.request(Method::POST, path)?.json(order);
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn list_orders(&self, path: &str) -> ClientResult<Vec<OrderRecord>> {
        let orders: Vec<OrderRecord> = self.send(self.request(Method::GET, path)?).await?;
        debug!(count = orders.len(), "Orders fetched");
        Ok(orders)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Joins an endpoint path onto the base URL, keeping any base path prefix.
    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }

    /// Starts a request with the bearer token attached when one is held.
    pub(crate) fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method, url);

        Ok(match self.tokens.bearer_token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let response = Self::check_status(response).await?;
        response.json::<T>().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::from(err)
        }
    }

    async fn check_status(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        warn!(status = status.as_u16(), %message, "Backend rejected request");
        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// Extracts a human message from an error body.
///
/// The backend answers `{"detail": "..."}`; validation failures carry a
/// list in `detail`, which is shown as compact JSON.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(trimmed.to_string()),
        },
        _ => Some(trimmed.to_string()),
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .field("wholesale_order_path", &self.wholesale_order_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    struct FixedToken(&'static str);

    impl TokenSource for FixedToken {
        fn bearer_token(&self) -> Option<SecretString> {
            Some(SecretString::from(self.0.to_string()))
        }
    }

    fn client(tokens: Arc<dyn TokenSource>) -> ApiClient {
        ApiClient::new(&ClientConfig::default(), tokens).unwrap()
    }

    #[test]
    fn test_bearer_attached_when_token_held() {
        let api = client(Arc::new(FixedToken("tok-123")));
        let request = api.request(Method::GET, "/orders/my-orders").unwrap().build().unwrap();

        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer tok-123"
        );
    }

    #[test]
    fn test_no_bearer_when_logged_out() {
        let api = client(Arc::new(Anonymous));
        let request = api.request(Method::GET, "/products/").unwrap().build().unwrap();

        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let mut config = ClientConfig::default();
        config.api.base_url = "https://shop.example.com/api/".to_string();
        let api = ApiClient::new(&config, Arc::new(Anonymous)).unwrap();

        assert_eq!(
            api.endpoint("/orders/").unwrap().as_str(),
            "https://shop.example.com/api/orders/"
        );
    }

    #[test]
    fn test_wholesale_path_is_configurable() {
        let mut config = ClientConfig::default();
        config.api.wholesale_order_path = "/orders/wholesale".to_string();
        let api = ApiClient::new(&config, Arc::new(Anonymous)).unwrap();

        assert_eq!(api.wholesale_order_path, "/orders/wholesale");
        assert_eq!(
            api.endpoint(&api.wholesale_order_path).unwrap().as_str(),
            "http://localhost:8000/orders/wholesale"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ws://localhost:8000".to_string();
        assert!(ApiClient::new(&config, Arc::new(Anonymous)).is_err());
    }

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(
            error_message(r#"{"detail": "Invalid OTP"}"#).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(
            error_message(r#"{"detail": [{"msg": "field required"}]}"#).as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message("   "), None);
    }

    #[test]
    fn test_registration_body_hides_nothing_the_backend_needs() {
        let form = Registration {
            name: " Asha ".to_string(),
            email: "asha@example.com".to_string(),
            password: SecretString::from("pw".to_string()),
            role: Role::Retailer,
        };
        let body = serde_json::to_value(form.body(Some("123456"))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "name": "Asha",
                "email": "asha@example.com",
                "password": "pw",
                "role": "retailer",
                "otp": "123456"
            })
        );
        assert!(!format!("{:?}", form).contains("\"pw\""));
    }

    #[tokio::test]
    async fn test_validation_happens_before_network() {
        // Nothing listens on this port; a validation error proves no request was sent.
        let mut config = ClientConfig::default();
        config.api.base_url = "http://127.0.0.1:9".to_string();
        let api = ApiClient::new(&config, Arc::new(Anonymous)).unwrap();

        let err = api.request_login_otp("not-an-email").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let err = api
            .update_order_status(1, OrderStatus::Unknown)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_ack_defaults() {
        let ack: Ack = serde_json::from_str(r#"{"message": "OTP sent"}"#).unwrap();
        assert!(ack.ok);
        assert_eq!(ack.message.as_deref(), Some("OTP sent"));
    }
}
