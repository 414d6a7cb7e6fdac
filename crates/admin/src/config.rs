//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FUELOPS_API_URL` - Backend base URL (default: `http://localhost:3000/api`)
//! - `FUELOPS_TOKEN_FILE` - Where the session token is persisted
//!   (default: `.fuelops/session.json`)
//! - `FUELOPS_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `FUELOPS_IMPORT_BATCH_SIZE` - Rows per import request (default: 100)
//! - `FUELOPS_OUTPUT_DIR` - Directory for generated PDFs and reports (default: `.`)
//! - `FUELOPS_PDF_COMMAND` - HTML to PDF converter reading stdin and writing
//!   stdout (default: `wkhtmltopdf`)
//! - `FUELOPS_COMPANY_NAME` - Letterhead name printed on documents
//! - `FUELOPS_COMPANY_FOOTER` - Legal footer printed on documents
//! - `FUELOPS_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//!
//! ## Login credentials (only read by `login`)
//! - `FUELOPS_EMAIL`
//! - `FUELOPS_PASSWORD`

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_TOKEN_FILE: &str = ".fuelops/session.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PDF_COMMAND: &str = "wkhtmltopdf";
const DEFAULT_COMPANY_NAME: &str = "Fuelops Distribution";

/// Default number of rows sent per import request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Console configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Backend connection settings
    pub api: ApiConfig,
    /// Session token file
    pub token_file: PathBuf,
    /// Import pipeline settings
    pub import: ImportConfig,
    /// Document and report output settings
    pub documents: DocumentConfig,
    /// Emit JSON formatted logs
    pub log_json: bool,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (ends with `/api`)
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Configuration for a backend at `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("FUELOPS_API_URL", base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// Import pipeline configuration.
#[derive(Debug, Clone, Copy)]
pub struct ImportConfig {
    /// Rows per backend request (always at least 1)
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Document generation configuration.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Directory generated files are written to
    pub output_dir: PathBuf,
    /// HTML to PDF converter command line (program followed by arguments)
    pub pdf_command: String,
    /// Company name on the letterhead
    pub company_name: String,
    /// Legal footer lines
    pub company_footer: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            pdf_command: DEFAULT_PDF_COMMAND.to_string(),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            company_footer: None,
        }
    }
}

/// Login credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from `FUELOPS_EMAIL` / `FUELOPS_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if either variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            email: get_required_env("FUELOPS_EMAIL")?,
            password: SecretString::from(get_required_env("FUELOPS_PASSWORD")?),
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(
            "FUELOPS_API_URL",
            &get_env_or_default("FUELOPS_API_URL", DEFAULT_API_URL),
        )?;
        let timeout_secs = parse_positive(
            "FUELOPS_HTTP_TIMEOUT_SECS",
            &get_env_or_default("FUELOPS_HTTP_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string()),
        )?;
        let batch_size = parse_positive(
            "FUELOPS_IMPORT_BATCH_SIZE",
            &get_env_or_default("FUELOPS_IMPORT_BATCH_SIZE", &DEFAULT_BATCH_SIZE.to_string()),
        )?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            token_file: PathBuf::from(get_env_or_default("FUELOPS_TOKEN_FILE", DEFAULT_TOKEN_FILE)),
            import: ImportConfig {
                batch_size: usize::try_from(batch_size).map_err(|e| {
                    ConfigError::InvalidEnvVar("FUELOPS_IMPORT_BATCH_SIZE".to_string(), e.to_string())
                })?,
            },
            documents: DocumentConfig {
                output_dir: PathBuf::from(get_env_or_default("FUELOPS_OUTPUT_DIR", ".")),
                pdf_command: get_env_or_default("FUELOPS_PDF_COMMAND", DEFAULT_PDF_COMMAND),
                company_name: get_env_or_default("FUELOPS_COMPANY_NAME", DEFAULT_COMPANY_NAME),
                company_footer: get_optional_env("FUELOPS_COMPANY_FOOTER"),
            },
            log_json: get_optional_env("FUELOPS_LOG_JSON").is_some_and(|v| parse_flag(&v)),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse the backend base URL.
///
/// A trailing slash is appended so that joining relative endpoint paths keeps
/// the `/api` prefix.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a strictly positive integer.
fn parse_positive(var_name: &str, value: &str) -> Result<u64, ConfigError> {
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if parsed == 0 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(parsed)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("TEST", "http://localhost:3000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/");
        assert_eq!(url.join("orders").unwrap().path(), "/api/orders");
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        let err = parse_base_url("TEST", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("TEST", "100").unwrap(), 100);
        assert!(parse_positive("TEST", "0").is_err());
        assert!(parse_positive("TEST", "-5").is_err());
        assert!(parse_positive("TEST", "abc").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("no"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "dispatch@example.com".to_string(),
            password: SecretString::from("hunter2-very-secret"),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("dispatch@example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
