//! API client for the blood-donation REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests: login/registration, donor profiles, donations, blood
//! requests, bank inventories, the admin dashboard and CSV exports.
//!
//! The client owns the silent-refresh protocol: a request that fails with
//! 401 is retried exactly once after minting a new access token from the
//! stored refresh token. The retry marker lives on an explicit
//! `PendingRequest` wrapper rather than on the transport request itself.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::models::{
    BloodBank, BloodGroup, BloodRequest, DashboardStats, Donation, DonorProfile,
    NewBloodRequest, NewDonation, NewDonorProfile, NewUser, User,
};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Login response: the full credential pair.
#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

/// Refresh response: only a new access token is minted.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// A request description that can be re-issued after a token refresh.
///
/// `retried` marks that the one-shot recovery already ran for this
/// request, so the refresh protocol never recurses.
#[derive(Debug)]
struct PendingRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    query: Vec<(&'static str, String)>,
    accept: Option<&'static str>,
    retried: bool,
}

impl PendingRequest {
    fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
            query: Vec::new(),
            accept: None,
            retried: false,
        }
    }

    fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
            query: Vec::new(),
            accept: None,
            retried: false,
        }
    }

    fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::PATCH,
            path: path.into(),
            body: Some(body),
            query: Vec::new(),
            accept: None,
            retried: false,
        }
    }

    fn with_query(mut self, key: &'static str, value: String) -> Self {
        self.query.push((key, value));
        self
    }

    fn with_accept(mut self, accept: &'static str) -> Self {
        self.accept = Some(accept);
        self
    }

    fn mark_retried(mut self) -> Self {
        self.retried = true;
        self
    }
}

/// What to do with a request that came back 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// Refresh the access token, then re-issue this one request.
    Retry,
    /// No refresh token stored: clear and propagate the original failure.
    FailOriginal,
    /// Already retried once: fail through without touching the tokens again.
    FailThrough,
}

/// The at-most-one-retry rule for unauthorized responses.
fn plan_unauthorized_recovery(already_retried: bool, has_refresh_token: bool) -> Recovery {
    if already_retried {
        Recovery::FailThrough
    } else if has_refresh_token {
        Recovery::Retry
    } else {
        Recovery::FailOriginal
    }
}

/// API client for the blood-donation service.
/// Clone is cheap - reqwest::Client and the token store are Arc-backed,
/// so clones share the connection pool and see the same credentials.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    tokens: Arc<Mutex<TokenStore>>,
}

impl ApiClient {
    /// Create a new API client against `base_url` (e.g.
    /// `http://localhost:8000/api/`), sharing the given token store.
    pub fn new(base_url: &str, tokens: Arc<Mutex<TokenStore>>) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Ok(Self {
            client,
            base_url: base_url.into(),
            tokens,
        })
    }

    /// Lock the shared token store, recovering from a poisoned lock.
    /// The store's operations cannot leave it in a broken state.
    fn lock_tokens(&self) -> MutexGuard<'_, TokenStore> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock_tokens().is_authenticated()
    }

    // ===== Core request path =====

    /// Build and send one attempt of a pending request. The bearer header
    /// is read from the token store at send time, so a retry after a
    /// refresh always carries the newest access token.
    async fn issue(&self, pending: &PendingRequest) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, pending.path);
        let mut request = self.client.request(pending.method.clone(), &url);

        if !pending.query.is_empty() {
            request = request.query(&pending.query);
        }
        if let Some(ref body) = pending.body {
            request = request.json(body);
        }
        if let Some(accept) = pending.accept {
            request = request.header(header::ACCEPT, accept);
        }
        if let Some(bearer) = self.lock_tokens().bearer_value() {
            request = request.header(header::AUTHORIZATION, bearer);
        }

        Ok(request.send().await?)
    }

    /// Send a request, transparently recovering from an expired access
    /// token at most once.
    async fn execute(&self, mut pending: PendingRequest) -> Result<reqwest::Response, ApiError> {
        loop {
            let response = self.issue(&pending).await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Self::check_response(response).await;
            }

            let has_refresh = self.lock_tokens().refresh_token().is_some();
            match plan_unauthorized_recovery(pending.retried, has_refresh) {
                Recovery::FailThrough => {
                    debug!(path = %pending.path, "Retried request still unauthorized");
                    return Err(ApiError::Unauthorized);
                }
                Recovery::FailOriginal => {
                    debug!(path = %pending.path, "Unauthorized with no refresh token");
                    self.clear_tokens_logged();
                    return Err(ApiError::Unauthorized);
                }
                Recovery::Retry => {
                    pending = pending.mark_retried();
                    let refresh = self
                        .lock_tokens()
                        .refresh_token()
                        .map(str::to_string);
                    let Some(refresh) = refresh else {
                        // Cleared by a concurrent failure between the check
                        // and the read; same outcome as FailOriginal.
                        self.clear_tokens_logged();
                        return Err(ApiError::Unauthorized);
                    };

                    match self.refresh_access(&refresh).await {
                        Ok(access) => {
                            if let Err(e) =
                                self.lock_tokens().set_tokens(Some(access), None)
                            {
                                warn!(error = %e, "Failed to persist refreshed token");
                            }
                            debug!(path = %pending.path, "Token refreshed, retrying request");
                            // Loop re-issues exactly this one request.
                        }
                        Err(e) => {
                            // The refresh failure, not the original 401, is
                            // what the caller observes.
                            debug!(path = %pending.path, error = %e, "Silent refresh failed");
                            self.clear_tokens_logged();
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Mint a new access token from the refresh token. Sent without a
    /// bearer header: the expired access token must not ride along.
    async fn refresh_access(&self, refresh: &str) -> Result<String, ApiError> {
        let url = format!("{}auth/token/refresh/", self.base_url);
        debug!("Access token expired, attempting silent refresh");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let parsed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Bad refresh response: {}", e)))?;
        Ok(parsed.access)
    }

    fn clear_tokens_logged(&self) {
        if let Err(e) = self.lock_tokens().clear() {
            warn!(error = %e, "Failed to clear tokens");
        }
    }

    /// Check if a response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        pending: PendingRequest,
    ) -> Result<T, ApiError> {
        let path = pending.path.clone();
        let response = self.execute(pending).await?;
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", path, e))
        })
    }

    async fn request_text(&self, pending: PendingRequest) -> Result<String, ApiError> {
        let response = self.execute(pending).await?;
        Ok(response.text().await?)
    }

    // ===== Authentication =====

    /// Log in and store the returned access/refresh pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let pending = PendingRequest::post(
            "auth/login/",
            serde_json::json!({ "username": username, "password": password }),
        );
        let pair: TokenPair = self.request_json(pending).await?;

        self.lock_tokens()
            .set_tokens(Some(pair.access), Some(pair.refresh))
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to persist tokens: {}", e)))?;
        debug!(username, "Login successful, tokens stored");
        Ok(())
    }

    /// Create a new account. The backend returns the created record
    /// without an id; callers log in separately afterwards.
    pub async fn register(&self, new_user: &NewUser) -> Result<(), ApiError> {
        let body = serde_json::to_value(new_user)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad register payload: {}", e)))?;
        self.execute(PendingRequest::post("auth/register/", body))
            .await?;
        Ok(())
    }

    /// Drop the stored credential pair. Purely local; the backend does not
    /// expose a logout endpoint.
    pub fn logout(&self) {
        self.clear_tokens_logged();
    }

    /// Fetch the currently authenticated user.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.request_json(PendingRequest::get("users/me/")).await
    }

    // ===== Donor profiles =====

    /// List donor profiles, optionally filtered by blood group and
    /// availability (server-side query params).
    pub async fn list_donor_profiles(
        &self,
        blood_group: Option<BloodGroup>,
        available: Option<bool>,
    ) -> Result<Vec<DonorProfile>, ApiError> {
        let mut pending = PendingRequest::get("donor-profiles/");
        if let Some(group) = blood_group {
            pending = pending.with_query("blood_group", group.as_str().to_string());
        }
        if let Some(available) = available {
            pending = pending.with_query("available", available.to_string());
        }
        self.request_json(pending).await
    }

    pub async fn create_donor_profile(
        &self,
        profile: &NewDonorProfile,
    ) -> Result<DonorProfile, ApiError> {
        let body = serde_json::to_value(profile)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad profile payload: {}", e)))?;
        self.request_json(PendingRequest::post("donor-profiles/", body))
            .await
    }

    pub async fn update_donor_profile(
        &self,
        id: i64,
        profile: &NewDonorProfile,
    ) -> Result<DonorProfile, ApiError> {
        let body = serde_json::to_value(profile)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad profile payload: {}", e)))?;
        self.request_json(PendingRequest::patch(format!("donor-profiles/{}/", id), body))
            .await
    }

    // ===== Blood banks =====

    pub async fn list_blood_banks(&self) -> Result<Vec<BloodBank>, ApiError> {
        self.request_json(PendingRequest::get("blood-banks/")).await
    }

    // ===== Blood requests =====

    pub async fn list_blood_requests(&self) -> Result<Vec<BloodRequest>, ApiError> {
        self.request_json(PendingRequest::get("blood-requests/"))
            .await
    }

    pub async fn create_blood_request(
        &self,
        request: &NewBloodRequest,
    ) -> Result<BloodRequest, ApiError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad request payload: {}", e)))?;
        self.request_json(PendingRequest::post("blood-requests/", body))
            .await
    }

    /// Approve a pending blood request (admin only). Returns the updated record.
    pub async fn approve_blood_request(&self, id: i64) -> Result<BloodRequest, ApiError> {
        self.request_json(PendingRequest::post(
            format!("blood-requests/{}/approve/", id),
            serde_json::json!({}),
        ))
        .await
    }

    /// Reject a pending blood request (admin only). Returns the updated record.
    pub async fn reject_blood_request(&self, id: i64) -> Result<BloodRequest, ApiError> {
        self.request_json(PendingRequest::post(
            format!("blood-requests/{}/reject/", id),
            serde_json::json!({}),
        ))
        .await
    }

    // ===== Donations =====

    pub async fn list_donations(&self) -> Result<Vec<Donation>, ApiError> {
        self.request_json(PendingRequest::get("donations/")).await
    }

    pub async fn create_donation(&self, donation: &NewDonation) -> Result<Donation, ApiError> {
        let body = serde_json::to_value(donation)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad donation payload: {}", e)))?;
        self.request_json(PendingRequest::post("donations/", body))
            .await
    }

    /// Approve a donation (admin only). The backend credits the linked
    /// bank's inventory as a side effect.
    pub async fn approve_donation(&self, id: i64) -> Result<Donation, ApiError> {
        self.request_json(PendingRequest::post(
            format!("donations/{}/approve/", id),
            serde_json::json!({}),
        ))
        .await
    }

    // ===== Admin dashboard =====

    pub async fn admin_dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.request_json(PendingRequest::get("admin/dashboard/"))
            .await
    }

    // ===== CSV exports =====

    pub async fn export_donations_csv(&self) -> Result<String, ApiError> {
        self.request_text(PendingRequest::get("donations/export/").with_accept("text/csv"))
            .await
    }

    pub async fn export_blood_requests_csv(&self) -> Result<String, ApiError> {
        self.request_text(PendingRequest::get("blood-requests/export/").with_accept("text/csv"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Refresh protocol decision tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_first_401_with_refresh_token_retries() {
        assert_eq!(plan_unauthorized_recovery(false, true), Recovery::Retry);
    }

    #[test]
    fn test_first_401_without_refresh_token_fails_original() {
        assert_eq!(
            plan_unauthorized_recovery(false, false),
            Recovery::FailOriginal
        );
    }

    #[test]
    fn test_second_401_never_refreshes_again() {
        // Once a request has been retried, no second refresh may occur,
        // whether or not a refresh token is still stored.
        assert_eq!(plan_unauthorized_recovery(true, true), Recovery::FailThrough);
        assert_eq!(plan_unauthorized_recovery(true, false), Recovery::FailThrough);
    }

    // -------------------------------------------------------------------------
    // PendingRequest tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_pending_request_starts_unretried() {
        let pending = PendingRequest::get("users/me/");
        assert!(!pending.retried);
        assert_eq!(pending.method, Method::GET);
        assert!(pending.body.is_none());
    }

    #[test]
    fn test_mark_retried() {
        let pending = PendingRequest::post("donations/", serde_json::json!({})).mark_retried();
        assert!(pending.retried);
    }

    #[test]
    fn test_query_params_accumulate() {
        let pending = PendingRequest::get("donor-profiles/")
            .with_query("blood_group", "O-".to_string())
            .with_query("available", "true".to_string());
        assert_eq!(pending.query.len(), 2);
        assert_eq!(pending.query[0], ("blood_group", "O-".to_string()));
    }

    // -------------------------------------------------------------------------
    // Wire format tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_login_response() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access": "A1", "refresh": "R1"}"#).unwrap();
        assert_eq!(pair.access, "A1");
        assert_eq!(pair.refresh, "R1");
    }

    #[test]
    fn test_parse_refresh_response() {
        let parsed: RefreshResponse = serde_json::from_str(r#"{"access": "A2"}"#).unwrap();
        assert_eq!(parsed.access, "A2");
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let tokens = Arc::new(Mutex::new(TokenStore::new(std::env::temp_dir())));
        let client = ApiClient::new("http://localhost:8000/api", tokens).unwrap();
        assert_eq!(&*client.base_url, "http://localhost:8000/api/");
    }

    #[test]
    fn test_stored_token_is_what_gets_attached() {
        let dir = tempfile::TempDir::new().unwrap();
        let tokens = Arc::new(Mutex::new(TokenStore::new(dir.path().to_path_buf())));
        let client = ApiClient::new("http://localhost:8000/api/", Arc::clone(&tokens)).unwrap();

        tokens
            .lock()
            .unwrap()
            .set_tokens(Some("A1".to_string()), Some("R1".to_string()))
            .unwrap();
        assert_eq!(
            client.lock_tokens().bearer_value().as_deref(),
            Some("Bearer A1")
        );

        // A refresh replaces the access token in place; the header value
        // follows immediately because it is read from the store at send time.
        tokens
            .lock()
            .unwrap()
            .set_tokens(Some("A2".to_string()), None)
            .unwrap();
        assert_eq!(
            client.lock_tokens().bearer_value().as_deref(),
            Some("Bearer A2")
        );

        client.logout();
        assert!(client.lock_tokens().bearer_value().is_none());
    }
}
