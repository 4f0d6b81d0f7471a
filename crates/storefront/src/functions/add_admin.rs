//! Admin provisioning.
//!
//! Resolves (or creates) the identity-service user for an email and grants
//! it an admin row. Re-running for an existing admin is a no-op.

use std::sync::Arc;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{AdminUser, Email};

use super::{FunctionError, report_compensation_failure};
use crate::config::setup_key_matches;
use crate::db::AdminUserRepository;
use crate::services::{IdentityProvider, IdentityUser};

/// Minimum password length accepted by the identity service.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Body of `POST /functions/v1/add-admin`.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub setup_key: String,
}

impl std::fmt::Debug for ProvisioningRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("setup_key", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of a successful provisioning call.
#[derive(Debug, Clone)]
pub struct ProvisionedAdmin {
    pub admin: AdminUser,
    pub email: Email,
    /// The identity user was created by this call.
    pub created_user: bool,
    /// The admin row already existed; nothing was written.
    pub already_admin: bool,
}

impl ProvisionedAdmin {
    /// Human-readable summary for the response envelope.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        if self.already_admin {
            "User is already an admin"
        } else {
            "Admin user created successfully"
        }
    }
}

/// Grants admin access to identity-service users.
#[derive(Clone)]
pub struct AdminProvisioner {
    identity: Arc<dyn IdentityProvider>,
    admins: Arc<dyn AdminUserRepository>,
}

impl AdminProvisioner {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, admins: Arc<dyn AdminUserRepository>) -> Self {
        Self { identity, admins }
    }

    /// Provision an admin from an HTTP request, gated by the setup key.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError::Validation`] for missing or malformed fields,
    /// [`FunctionError::InvalidSetupKey`] on a key mismatch (checked before
    /// any remote call), or the underlying error from a failed step.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn provision_with_setup_key(
        &self,
        request: ProvisioningRequest,
        setup_key: &SecretString,
    ) -> Result<ProvisionedAdmin, FunctionError> {
        if request.email.trim().is_empty()
            || request.password.is_empty()
            || request.setup_key.is_empty()
        {
            return Err(FunctionError::Validation(
                "Missing required fields: email, password, setupKey".to_owned(),
            ));
        }

        if !setup_key_matches(setup_key, &request.setup_key) {
            return Err(FunctionError::InvalidSetupKey);
        }

        let password = SecretString::from(request.password);
        self.provision(&request.email, &password).await
    }

    /// Provision an admin without a setup key (operator access).
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError::Validation`] for a bad email or short
    /// password, or the underlying error from a failed step. If the admin row
    /// cannot be written, an identity user created by this call is deleted
    /// first.
    #[instrument(skip(self, password))]
    pub async fn provision(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<ProvisionedAdmin, FunctionError> {
        let email = Email::parse(email)
            .map_err(|e| FunctionError::Validation(format!("Invalid email: {e}")))?;

        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(FunctionError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let (user, created_user) = self.resolve_user(&email, password).await?;

        match self.grant(&user).await {
            Ok((admin, already_admin)) => {
                tracing::info!(
                    user_id = %user.id,
                    created_user,
                    already_admin,
                    "Admin provisioned"
                );
                Ok(ProvisionedAdmin {
                    admin,
                    email,
                    created_user,
                    already_admin,
                })
            }
            Err(e) => {
                if created_user {
                    self.remove_created_user(&user).await;
                }
                Err(e)
            }
        }
    }

    async fn resolve_user(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<(IdentityUser, bool), FunctionError> {
        if let Some(user) = self.identity.find_user_by_email(email).await? {
            return Ok((user, false));
        }

        let user = self.identity.create_user(email, password).await?;
        tracing::info!(user_id = %user.id, "Created identity user");
        Ok((user, true))
    }

    async fn grant(&self, user: &IdentityUser) -> Result<(AdminUser, bool), FunctionError> {
        if let Some(existing) = self.admins.find_by_user_id(user.id).await? {
            return Ok((existing, true));
        }

        let admin = AdminUser::new_default(user.id, Utc::now());
        let inserted = self.admins.insert(&admin).await?;
        Ok((inserted, false))
    }

    async fn remove_created_user(&self, user: &IdentityUser) {
        match self.identity.delete_user(user.id).await {
            Ok(()) => tracing::warn!(user_id = %user.id, "Rolled back identity user"),
            Err(e) => report_compensation_failure("delete identity user", &e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{FakeIdentity, MemoryAdminUsers, TEST_SETUP_KEY};

    struct Harness {
        identity: Arc<FakeIdentity>,
        admins: Arc<MemoryAdminUsers>,
        provisioner: AdminProvisioner,
    }

    fn harness() -> Harness {
        let identity = Arc::new(FakeIdentity::default());
        let admins = Arc::new(MemoryAdminUsers::default());
        let provisioner = AdminProvisioner::new(identity.clone(), admins.clone());
        Harness {
            identity,
            admins,
            provisioner,
        }
    }

    fn request(email: &str, setup_key: &str) -> ProvisioningRequest {
        ProvisioningRequest {
            email: email.to_owned(),
            password: "hunter22".to_owned(),
            setup_key: setup_key.to_owned(),
        }
    }

    fn key() -> SecretString {
        SecretString::from(TEST_SETUP_KEY)
    }

    #[tokio::test]
    async fn test_creates_user_and_admin_row() {
        let h = harness();
        let result = h
            .provisioner
            .provision_with_setup_key(request("Owner@Example.com", TEST_SETUP_KEY), &key())
            .await
            .unwrap();

        assert!(result.created_user);
        assert!(!result.already_admin);
        assert_eq!(result.email.as_str(), "owner@example.com");
        assert_eq!(h.identity.user_count(), 1);
        assert_eq!(h.admins.len(), 1);
        assert!(result.admin.has_permission("manage_admins"));
    }

    #[tokio::test]
    async fn test_is_idempotent() {
        let h = harness();
        h.provisioner
            .provision_with_setup_key(request("owner@example.com", TEST_SETUP_KEY), &key())
            .await
            .unwrap();
        let second = h
            .provisioner
            .provision_with_setup_key(request("OWNER@example.com", TEST_SETUP_KEY), &key())
            .await
            .unwrap();

        assert!(second.already_admin);
        assert_eq!(second.message(), "User is already an admin");
        assert_eq!(h.identity.created_count(), 1);
        assert_eq!(h.admins.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_identity_user_is_reused() {
        let h = harness();
        let user_id = h.identity.seed_user("staff@example.com");

        let result = h
            .provisioner
            .provision("staff@example.com", &SecretString::from("whatever"))
            .await
            .unwrap();

        assert!(!result.created_user);
        assert_eq!(result.admin.user_id, user_id);
        assert_eq!(h.identity.created_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_setup_key_has_no_side_effects() {
        let h = harness();
        let err = h
            .provisioner
            .provision_with_setup_key(request("owner@example.com", "not-the-key"), &key())
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionError::InvalidSetupKey));
        assert_eq!(h.identity.user_count(), 0);
        assert!(h.admins.is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let h = harness();

        let missing = h
            .provisioner
            .provision_with_setup_key(ProvisioningRequest::default(), &key())
            .await
            .unwrap_err();
        assert!(matches!(missing, FunctionError::Validation(_)));

        let bad_email = h
            .provisioner
            .provision("not-an-email", &SecretString::from("hunter22"))
            .await
            .unwrap_err();
        assert!(matches!(bad_email, FunctionError::Validation(_)));

        let short = h
            .provisioner
            .provision("owner@example.com", &SecretString::from("12345"))
            .await
            .unwrap_err();
        assert!(matches!(short, FunctionError::Validation(_)));
        assert_eq!(h.identity.user_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_grant_deletes_created_user() {
        let h = harness();
        h.admins.fail_inserts();

        let err = h
            .provisioner
            .provision("owner@example.com", &SecretString::from("hunter22"))
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionError::Repository(_)));
        assert_eq!(h.identity.created_count(), 1);
        assert_eq!(h.identity.deleted_count(), 1);
        assert_eq!(h.identity.user_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_grant_keeps_preexisting_user() {
        let h = harness();
        h.identity.seed_user("owner@example.com");
        h.admins.fail_inserts();

        h.provisioner
            .provision("owner@example.com", &SecretString::from("hunter22"))
            .await
            .unwrap_err();

        assert_eq!(h.identity.deleted_count(), 0);
        assert_eq!(h.identity.user_count(), 1);
    }

    #[test]
    fn test_request_debug_redacts_secrets() {
        let debug = format!("{:?}", request("a@example.com", TEST_SETUP_KEY));
        assert!(!debug.contains(TEST_SETUP_KEY));
        assert!(!debug.contains("hunter22"));
    }
}
