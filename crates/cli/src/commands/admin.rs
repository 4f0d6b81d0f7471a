//! Admin provisioning command.
//!
//! Runs the same workflow as `POST /functions/v1/add-admin` but skips the
//! setup key: shell access to the deployment is the credential.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `REMOTE_API_URL`, `REMOTE_SERVICE_KEY` - Identity service access

use std::sync::Arc;

use secrecy::SecretString;

use shopfront_storefront::config::RemoteConfig;
use shopfront_storefront::db::PgAdminUserRepository;
use shopfront_storefront::functions::AdminProvisioner;
use shopfront_storefront::services::IdentityClient;

use super::{CliError, connect};

/// Grant admin access to `email`.
///
/// # Errors
///
/// Returns an error if configuration is missing or any provisioning step
/// fails.
pub async fn add(email: &str, password: String) -> Result<(), CliError> {
    let pool = connect().await?;
    let remote = RemoteConfig::from_env()?;

    let provisioner = AdminProvisioner::new(
        Arc::new(IdentityClient::new(&remote)?),
        Arc::new(PgAdminUserRepository::new(pool)),
    );

    let result = provisioner
        .provision(email, &SecretString::from(password))
        .await?;

    tracing::info!(
        "{}: {} (user {}, role {})",
        result.message(),
        result.email,
        result.admin.user_id,
        result.admin.role
    );
    if result.created_user {
        tracing::info!("A new identity user was created with the given password");
    }
    Ok(())
}
