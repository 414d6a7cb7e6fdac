//! Application context built once at the composition root.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::instrument;

use crate::api::{ApiClient, AuthResponse, User};
use crate::config::{AdminConfig, Credentials};
use crate::documents::DocumentGenerator;
use crate::error::AppError;
use crate::lookup::LookupCache;
use crate::session::{FileTokenStore, TokenStore};

/// Configuration, token store and backend client, shared between clones.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

struct AppContextInner {
    config: AdminConfig,
    tokens: Arc<dyn TokenStore>,
    api: ApiClient,
}

impl AppContext {
    /// Build a context around an explicit token store.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: AdminConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, AppError> {
        let api = ApiClient::new(&config.api, Arc::clone(&tokens))?;
        Ok(Self {
            inner: Arc::new(AppContextInner {
                config,
                tokens,
                api,
            }),
        })
    }

    /// Build a context persisting the session in the configured token file.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: AdminConfig) -> Result<Self, AppError> {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_file));
        Self::new(config, tokens)
    }

    /// Load configuration from the environment and build a context.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid or the client cannot be built.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_config(AdminConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn tokens(&self) -> &dyn TokenStore {
        self.inner.tokens.as_ref()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.tokens().get_token().is_some()
    }

    /// Log in with explicit credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AppError> {
        Ok(self
            .api()
            .login(&credentials.email, &credentials.password)
            .await?)
    }

    /// Create an account; the new session is stored.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the registration.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, AppError> {
        Ok(self.api().register(username, email, password).await?)
    }

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be updated.
    pub fn logout(&self) -> Result<(), AppError> {
        Ok(self.api().logout()?)
    }

    /// The logged-in user.
    ///
    /// # Errors
    ///
    /// Returns error if the session has expired.
    pub async fn current_user(&self) -> Result<User, AppError> {
        Ok(self.api().current_user().await?)
    }

    /// Fetch reference data and index it.
    ///
    /// # Errors
    ///
    /// Returns error if any reference list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_lookup(&self) -> Result<LookupCache, AppError> {
        let data = self.api().fetch_reference_data().await?;
        Ok(LookupCache::new(data))
    }

    /// Document generator using the configured converter and letterhead.
    ///
    /// # Errors
    ///
    /// Returns error if the converter command is empty.
    pub fn document_generator(&self) -> Result<DocumentGenerator, AppError> {
        Ok(DocumentGenerator::from_config(&self.config().documents)?)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.inner.config)
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}
