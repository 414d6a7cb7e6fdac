//! Session commands.
//!
//! # Environment Variables
//!
//! - `FUELOPS_EMAIL` - Login email when `--email` is not given
//! - `FUELOPS_PASSWORD` - Password for `login` and `register`

use fuelops_admin::AppContext;
use fuelops_admin::api::User;
use fuelops_admin::config::Credentials;
use secrecy::SecretString;

use crate::error::CliError;
use crate::output;

fn password_from_env() -> Result<SecretString, CliError> {
    std::env::var("FUELOPS_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| CliError::InvalidArgument("FUELOPS_PASSWORD is not set".to_string()))
}

fn print_user(user: &User) {
    output::field("Username", output::or_dash(user.username.as_deref()));
    output::field("Email", output::or_dash(user.email.as_deref()));
    output::field("Role", output::or_dash(user.role.as_deref()));
}

/// Log in and store the session token.
pub async fn login(ctx: &AppContext, email: Option<String>) -> Result<(), CliError> {
    let credentials = match email {
        Some(email) => Credentials {
            email,
            password: password_from_env()?,
        },
        None => Credentials::from_env().map_err(fuelops_admin::AppError::from)?,
    };

    tracing::info!("Logging in as {}", credentials.email);
    let response = ctx.login(&credentials).await?;
    output::line("Logged in.");
    if let Some(user) = &response.user {
        print_user(user);
    }
    Ok(())
}

/// Create an account.
pub async fn register(ctx: &AppContext, username: &str, email: &str) -> Result<(), CliError> {
    let password = password_from_env()?;
    let response = ctx.register(username, email, &password).await?;
    output::line(format!("Account created for {email}."));
    if let Some(user) = &response.user {
        print_user(user);
    }
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<(), CliError> {
    ctx.logout()?;
    output::line("Logged out.");
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<(), CliError> {
    if !ctx.is_logged_in() {
        output::line("Not logged in. Run `fuelops login`.");
        return Ok(());
    }
    let user = ctx.current_user().await?;
    print_user(&user);
    Ok(())
}
