//! `/api/auth` endpoints.

use reqwest::Method;
use tracing::{info, warn};

use super::types::{AuthResponse, LoginRequest, RegisterRequest, User};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// Create an account and adopt the issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn register(&self, body: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self
            .request(Method::POST, "/api/auth/register", Some(body), Auth::Skip)
            .await?;
        self.adopt_token(&response);
        info!(user_id = %response.user.id, "registered");
        Ok(response)
    }

    /// Sign in and adopt the issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    pub async fn login(&self, body: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self
            .request(Method::POST, "/api/auth/login", Some(body), Auth::Skip)
            .await?;
        self.adopt_token(&response);
        info!(user_id = %response.user.id, "logged in");
        Ok(response)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the session is not valid.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get("/api/auth/me").await
    }

    /// Sign out. The local token is cleared whether or not the server call
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns the server call's error after the token has been cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .request_unit::<()>(Method::POST, "/api/auth/logout", None, Auth::Bearer)
            .await;
        if let Err(e) = self.session.set_token(None) {
            warn!(error = %e, "failed to clear stored token");
        }
        result
    }

    fn adopt_token(&self, response: &AuthResponse) {
        if let Err(e) = self.session.set_token(Some(response.access_token.clone())) {
            warn!(error = %e, "failed to persist token; continuing with in-memory session");
        }
    }
}
