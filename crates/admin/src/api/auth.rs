//! Authentication endpoints.

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use super::{ApiClient, ApiError, AuthResponse, LoginRequest, RegisterRequest, User};

impl ApiClient {
    /// Log in and store the returned token.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected or the token cannot be stored.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let response: AuthResponse = self.post("/auth/login", &body).await?;
        self.tokens().set_token(&response.token)?;
        info!("Logged in");
        Ok(response)
    }

    /// Create an account and store the returned token.
    ///
    /// # Errors
    ///
    /// Returns error if registration is rejected or the token cannot be stored.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password: password.expose_secret(),
        };
        let response: AuthResponse = self.post("/auth/register", &body).await?;
        self.tokens().set_token(&response.token)?;
        info!("Registered and logged in");
        Ok(response)
    }

    /// Fetch the user the stored token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] (and clears the token) if the
    /// session has expired.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be updated.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.tokens().clear_token()?;
        info!("Logged out");
        Ok(())
    }
}
