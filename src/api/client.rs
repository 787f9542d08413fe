//! Typed REST client.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::protocol::{
    AlertFilters, AlertStatus, DashboardStats, Report, RiskAssessment, SecurityAlert,
    SecuritySettings, SystemMonitoring, Transaction, TransactionFilters, User,
};
use crate::storage::{KeyValueStore, keys};

use super::endpoints;
use super::http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
use super::types::{
    AlertStatusUpdate, ApiResponse, AuthResponse, LoginRequest, Page, PaginatedResponse,
    RegisterRequest,
};

// ============================================================================
// Constants
// ============================================================================

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// User-facing fallback messages by failure class.
pub mod messages {
    /// Transport failure.
    pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
    /// 401.
    pub const UNAUTHORIZED: &str = "Session expired. Please login again.";
    /// 403.
    pub const FORBIDDEN: &str = "You do not have permission to perform this action.";
    /// 404.
    pub const NOT_FOUND: &str = "The requested resource was not found.";
    /// Other failures.
    pub const SERVER_ERROR: &str = "Server error. Please try again later.";
    /// 400 and 422.
    pub const VALIDATION_ERROR: &str = "Please check your input and try again.";

    /// Returns the fallback message for `status`.
    #[must_use]
    pub fn for_status(status: u16) -> &'static str {
        match status {
            400 | 422 => VALIDATION_ERROR,
            401 => UNAUTHORIZED,
            403 => FORBIDDEN,
            404 => NOT_FOUND,
            _ => SERVER_ERROR,
        }
    }
}

// ============================================================================
// Navigator
// ============================================================================

/// Receives client-side route changes requested by the API layer.
///
/// Called with [`endpoints::SIGN_IN_ROUTE`] when the server rejects the
/// session.
pub trait Navigator: Send + Sync {
    /// Moves the user to `route`.
    fn redirect(&self, route: &str);
}

/// Navigator that ignores redirects.
impl Navigator for () {
    fn redirect(&self, _route: &str) {}
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn redirect(&self, route: &str) {
        (**self).redirect(route);
    }
}

// ============================================================================
// ApiClient
// ============================================================================

/// Client for the dashboard REST API.
///
/// Every request carries `Content-Type: application/json` and, when the
/// store holds a token, `Authorization: Bearer <token>`. A 401 response
/// clears the stored tokens and redirects to the sign-in route.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    timeout: Duration,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ApiClient - Constructors
// ============================================================================

impl ApiClient {
    /// Creates a client using [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self::with_transport(config, store, ReqwestTransport::new()?))
    }

    /// Creates a client with a custom transport.
    pub fn with_transport<T>(config: &ClientConfig, store: Arc<dyn KeyValueStore>, transport: T) -> Self
    where
        T: HttpTransport + 'static,
    {
        Self {
            base_url: config.api_url.clone(),
            timeout: config.request_timeout,
            transport: Arc::new(transport),
            store,
            navigator: Arc::new(()),
        }
    }

    /// Sets the navigator notified on session rejection.
    #[must_use]
    pub fn with_navigator<N>(mut self, navigator: N) -> Self
    where
        N: Navigator + 'static,
    {
        self.navigator = Arc::new(navigator);
        self
    }

    /// Returns the API base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

// ============================================================================
// ApiClient - Auth
// ============================================================================

impl ApiClient {
    /// `POST /auth/login`.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        self.call(Method::Post, endpoints::LOGIN, &[], Some(credentials))
            .await
    }

    /// `POST /auth/register`.
    pub async fn register(&self, form: &RegisterRequest) -> Result<AuthResponse> {
        self.call(Method::Post, endpoints::REGISTER, &[], Some(form))
            .await
    }

    /// `POST /auth/logout`.
    pub async fn logout(&self) -> Result<()> {
        let (status, response) = self
            .request::<ApiResponse<Value>, ()>(Method::Post, endpoints::LOGOUT, &[], None)
            .await?;
        response.ensure_success(status)
    }

    /// `GET /auth/profile`.
    pub async fn profile(&self) -> Result<User> {
        self.call::<_, ()>(Method::Get, endpoints::PROFILE, &[], None)
            .await
    }
}

// ============================================================================
// ApiClient - Dashboard Data
// ============================================================================

impl ApiClient {
    /// `GET /dashboard/stats`.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.call::<_, ()>(Method::Get, endpoints::DASHBOARD_STATS, &[], None)
            .await
    }

    /// `GET /transactions`, paged and filtered.
    pub async fn transactions(
        &self,
        filters: &TransactionFilters,
        page: u32,
        limit: u32,
    ) -> Result<Page<Transaction>> {
        let query = page_query(filters, page, limit)?;
        self.call_paged(endpoints::TRANSACTIONS, &query).await
    }

    /// `GET /transactions/:id`.
    pub async fn transaction(&self, id: &str) -> Result<Transaction> {
        let path = endpoints::transaction_details(id);
        self.call::<_, ()>(Method::Get, &path, &[], None).await
    }

    /// `GET /alerts`, paged and filtered.
    pub async fn alerts(
        &self,
        filters: &AlertFilters,
        page: u32,
        limit: u32,
    ) -> Result<Page<SecurityAlert>> {
        let query = page_query(filters, page, limit)?;
        self.call_paged(endpoints::ALERTS, &query).await
    }

    /// `PUT /alerts/:id/status`.
    pub async fn update_alert_status(&self, id: &str, status: AlertStatus) -> Result<SecurityAlert> {
        let path = endpoints::alert_status(id);
        let body = AlertStatusUpdate { status };
        self.call(Method::Put, &path, &[], Some(&body)).await
    }

    /// `GET /settings/security`.
    pub async fn security_settings(&self) -> Result<SecuritySettings> {
        self.call::<_, ()>(Method::Get, endpoints::SECURITY_SETTINGS, &[], None)
            .await
    }

    /// `PUT /settings/security`.
    pub async fn update_security_settings(
        &self,
        settings: &SecuritySettings,
    ) -> Result<SecuritySettings> {
        self.call(Method::Put, endpoints::SECURITY_SETTINGS, &[], Some(settings))
            .await
    }

    /// `GET /monitoring/system`.
    pub async fn system_monitoring(&self) -> Result<SystemMonitoring> {
        self.call::<_, ()>(Method::Get, endpoints::SYSTEM_STATUS, &[], None)
            .await
    }

    /// `GET /monitoring/risk`.
    pub async fn risk_assessment(&self) -> Result<RiskAssessment> {
        self.call::<_, ()>(Method::Get, endpoints::RISK_ASSESSMENT, &[], None)
            .await
    }

    /// `GET /reports`.
    pub async fn reports(&self) -> Result<Vec<Report>> {
        self.call::<_, ()>(Method::Get, endpoints::REPORTS, &[], None)
            .await
    }
}

// ============================================================================
// ApiClient - Request Pipeline
// ============================================================================

impl ApiClient {
    async fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (status, response) = self
            .request::<ApiResponse<T>, B>(method, path, query, body)
            .await?;
        response.into_data(status)
    }

    async fn call_paged<T>(&self, path: &str, query: &[(String, String)]) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        let (status, response) = self
            .request::<PaginatedResponse<T>, ()>(Method::Get, path, query, None)
            .await?;
        response.into_page(status)
    }

    async fn request<R, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<(u16, R)>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, query, body)?;
        debug!(%method, path, "API request");

        let response = self.transport.execute(request).await.inspect_err(|e| {
            error!(%method, path, error = %e, "API request failed");
        })?;

        if !response.is_success() {
            return Err(self.reject(method, path, &response));
        }

        let status = response.status;
        let decoded = serde_json::from_str(&response.body).map_err(|e| {
            warn!(%method, path, error = %e, "Malformed API response");
            Error::protocol(format!("Malformed response from {path}: {e}"))
        })?;
        Ok((status, decoded))
    }

    fn build_request<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let mut url = join(&self.base_url, path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.store.get(keys::AUTH_TOKEN).filter(|t| !t.is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let body = body.map(serde_json::to_string).transpose()?;

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: self.timeout,
        })
    }

    /// Converts a non-2xx response into an error, ending the session on 401.
    fn reject(&self, method: Method, path: &str, response: &HttpResponse) -> Error {
        let status = response.status;
        if status == 401 {
            warn!(path, "Session rejected; clearing credentials");
            self.store.remove(keys::AUTH_TOKEN);
            self.store.remove(keys::REFRESH_TOKEN);
            self.navigator.redirect(endpoints::SIGN_IN_ROUTE);
        }

        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| body.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| messages::for_status(status).to_string());

        error!(%method, path, status, %message, "API request rejected");
        Error::api(status, message)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Appends `path` to the base URL, keeping the base path prefix.
fn join(base: &Url, path: &str) -> Result<Url> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Ok(Url::parse(&joined)?)
}

/// Builds `page`, `limit` and the set filter fields as query pairs.
fn page_query<F: Serialize>(filters: &F, page: u32, limit: u32) -> Result<Vec<(String, String)>> {
    let mut query = vec![
        ("page".to_string(), page.to_string()),
        ("limit".to_string(), limit.to_string()),
    ];

    if let Value::Object(fields) = serde_json::to_value(filters)? {
        for (key, value) in fields {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            };
            query.push((key, value));
        }
    }
    Ok(query)
}

// ============================================================================
// Tests
// ============================================================================
