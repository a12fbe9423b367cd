//! REST client for the DMS API.
//!
//! The client has an explicit lifecycle: [`DmsApiClient::new`] captures the
//! API base URL and bearer token from configuration, [`init`] builds the
//! request context and [`dispose`] releases it. Calls outside that window
//! fail with [`HarnessError::NotInitialized`].
//!
//! Non-2xx statuses are returned as ordinary [`ApiResponse`]s; only
//! transport failures are errors.
//!
//! [`init`]: DmsApiClient::init
//! [`dispose`]: DmsApiClient::dispose

use super::response::ApiResponse;
use crate::config::{HarnessConfig, ENV_API_BASE_URL, ENV_API_TOKEN};
use crate::model::{
    AppointmentFilter, AppointmentPatch, Credentials, NewAppointment, NewRepairOrder, RepairOrderFilter,
    RepairOrderPatch,
};
use crate::result::{HarnessError, HarnessResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const REPAIR_ORDERS: &str = "/repair-orders";
const APPOINTMENTS: &str = "/appointments";

/// Client for the DMS REST surface
pub struct DmsApiClient {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    context: Option<reqwest::Client>,
}

impl fmt::Debug for DmsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmsApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl DmsApiClient {
    /// Capture API settings from configuration. No connection is made.
    #[must_use]
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            timeout: config.api_timeout,
            context: None,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    /// Build the request context: base URL, bearer token, JSON headers and
    /// request timeout. Calling it again keeps the existing context.
    pub fn init(&mut self) -> HarnessResult<()> {
        if self.context.is_some() {
            return Ok(());
        }
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| HarnessError::config(ENV_API_TOKEN, e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()?;
        self.context = Some(client);
        debug!(base_url = %self.base_url, "api client initialized");
        Ok(())
    }

    /// Release the request context. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.context.take().is_some() {
            debug!(base_url = %self.base_url, "api client disposed");
        }
    }

    fn context(&self, method: &Method, path: &str) -> HarnessResult<&reqwest::Client> {
        self.context.as_ref().ok_or_else(|| HarnessError::NotInitialized {
            operation: format!("{method} {path}"),
        })
    }

    fn request(&self, method: Method, path: &str) -> HarnessResult<RequestBuilder> {
        let client = self.context(&method, path)?;
        Ok(client.request(method, format!("{}{path}", self.base_url)))
    }

    /// Request for `{collection}/{id}` with `id` encoded as one path segment
    fn item_request(&self, method: Method, collection: &str, id: &str) -> HarnessResult<RequestBuilder> {
        let client = self.context(&method, &format!("{collection}/{id}"))?;
        let url = self.item_url(collection, id).map_err(|message| HarnessError::InvalidRequest {
            operation: format!("{method} {collection}/{id}"),
            message,
        })?;
        Ok(client.request(method, url))
    }

    fn item_url(&self, collection: &str, id: &str) -> Result<Url, String> {
        if matches!(id, "" | "." | "..") {
            return Err(format!("{id:?} is not a usable id"));
        }
        let mut url = Url::parse(&format!("{}{collection}", self.base_url))
            .map_err(|e| format!("{ENV_API_BASE_URL} {}: {e}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| format!("{ENV_API_BASE_URL} {} cannot carry a path", self.base_url))?
            .push(id);
        Ok(url)
    }

    async fn execute(&self, builder: RequestBuilder) -> HarnessResult<ApiResponse> {
        let (client, request) = builder.build_split();
        let request = request?;
        let method = request.method().to_string();
        let path = match request.url().query() {
            Some(query) => format!("{}?{query}", request.url().path()),
            None => request.url().path().to_string(),
        };

        let start = Instant::now();
        let response = client.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let elapsed = start.elapsed();

        info!(%method, %path, status, elapsed_ms = elapsed.as_millis() as u64, "api call");
        Ok(ApiResponse::new(method, path, status, elapsed, body))
    }

    async fn get(&self, path: &str) -> HarnessResult<ApiResponse> {
        self.execute(self.request(Method::GET, path)?).await
    }

    async fn get_with_query<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> HarnessResult<ApiResponse> {
        self.execute(self.request(Method::GET, path)?.query(query)).await
    }

    async fn send_json<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> HarnessResult<ApiResponse> {
        self.execute(self.request(method, path)?.json(body)).await
    }

    async fn get_item(&self, collection: &str, id: &str) -> HarnessResult<ApiResponse> {
        self.execute(self.item_request(Method::GET, collection, id)?).await
    }

    async fn patch_item<B: Serialize + ?Sized>(&self, collection: &str, id: &str, body: &B) -> HarnessResult<ApiResponse> {
        self.execute(self.item_request(Method::PATCH, collection, id)?.json(body))
            .await
    }

    async fn delete_item(&self, collection: &str, id: &str) -> HarnessResult<ApiResponse> {
        self.execute(self.item_request(Method::DELETE, collection, id)?).await
    }

    // --- auth ---

    /// `POST /auth/login`. The returned token is not stored.
    pub async fn login(&self, credentials: &Credentials) -> HarnessResult<ApiResponse> {
        self.send_json(Method::POST, "/auth/login", credentials).await
    }

    /// `GET /auth/validate` with the configured token
    pub async fn validate_token(&self) -> HarnessResult<ApiResponse> {
        self.get("/auth/validate").await
    }

    // --- repair orders ---

    pub async fn get_repair_orders(&self) -> HarnessResult<ApiResponse> {
        self.get(REPAIR_ORDERS).await
    }

    pub async fn get_repair_order_by_id(&self, id: &str) -> HarnessResult<ApiResponse> {
        self.get_item(REPAIR_ORDERS, id).await
    }

    pub async fn create_repair_order(&self, order: &NewRepairOrder) -> HarnessResult<ApiResponse> {
        self.send_json(Method::POST, REPAIR_ORDERS, order).await
    }

    /// `PATCH /repair-orders/{id}` with only the patch's set fields
    pub async fn update_repair_order(&self, id: &str, patch: &RepairOrderPatch) -> HarnessResult<ApiResponse> {
        self.patch_item(REPAIR_ORDERS, id, patch).await
    }

    pub async fn delete_repair_order(&self, id: &str) -> HarnessResult<ApiResponse> {
        self.delete_item(REPAIR_ORDERS, id).await
    }

    /// `GET /repair-orders?<filters>`; set criteria are combined with AND
    pub async fn search_repair_orders(&self, filter: &RepairOrderFilter) -> HarnessResult<ApiResponse> {
        self.get_with_query(REPAIR_ORDERS, filter).await
    }

    // --- appointments ---

    pub async fn get_appointments(&self) -> HarnessResult<ApiResponse> {
        self.get(APPOINTMENTS).await
    }

    pub async fn get_appointment_by_id(&self, id: &str) -> HarnessResult<ApiResponse> {
        self.get_item(APPOINTMENTS, id).await
    }

    pub async fn create_appointment(&self, appointment: &NewAppointment) -> HarnessResult<ApiResponse> {
        self.send_json(Method::POST, APPOINTMENTS, appointment).await
    }

    pub async fn update_appointment(&self, id: &str, patch: &AppointmentPatch) -> HarnessResult<ApiResponse> {
        self.patch_item(APPOINTMENTS, id, patch).await
    }

    pub async fn delete_appointment(&self, id: &str) -> HarnessResult<ApiResponse> {
        self.delete_item(APPOINTMENTS, id).await
    }

    pub async fn search_appointments(&self, filter: &AppointmentFilter) -> HarnessResult<ApiResponse> {
        self.get_with_query(APPOINTMENTS, filter).await
    }
}
