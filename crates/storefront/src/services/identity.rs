//! Identity service client.
//!
//! Covers the admin user endpoints needed for provisioning and the token
//! lookup used to authenticate uploads and admin routes.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use shopfront_core::{Email, IdentityUserId};

use super::{build_http_client, endpoint, error_message, service_headers};
use crate::config::RemoteConfig;

/// Page size used when scanning the user listing.
pub const USERS_PAGE_SIZE: usize = 1000;

/// Errors that can occur when interacting with the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned an error response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A user account in the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: IdentityUserId,
    /// Phone-only accounts have no email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Operations on the identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Find a user by email, ignoring case.
    async fn find_user_by_email(&self, email: &Email)
    -> Result<Option<IdentityUser>, IdentityError>;

    /// Create a user with a pre-confirmed email.
    async fn create_user(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<IdentityUser, IdentityError>;

    /// Delete a user.
    async fn delete_user(&self, id: IdentityUserId) -> Result<(), IdentityError>;

    /// Resolve a caller's access token. Returns `None` for an invalid or
    /// expired token.
    async fn user_for_token(&self, token: &str) -> Result<Option<IdentityUser>, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<IdentityUser>,
}

#[derive(Debug, Serialize)]
struct CreateUserRequest<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
}

/// REST client for the identity service.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the service key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &RemoteConfig) -> Result<Self, IdentityError> {
        let headers = service_headers(config)
            .map_err(|e| IdentityError::Parse(format!("Invalid service key format: {e}")))?;

        Ok(Self {
            client: build_http_client(headers)?,
            config: config.clone(),
        })
    }

    /// Fetch one page of the user listing (pages start at 1).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn list_users(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<IdentityUser>, IdentityError> {
        let url = endpoint(
            &self.config,
            &format!("auth/v1/admin/users?page={page}&per_page={per_page}"),
        );

        let response = self.client.get(&url).send().await?;
        let page: UserPage = parse_json(response).await?;
        Ok(page.users)
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    #[instrument(skip(self, email))]
    async fn find_user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<IdentityUser>, IdentityError> {
        let mut page = 1;
        loop {
            let users = self.list_users(page, USERS_PAGE_SIZE).await?;
            let short_page = users.len() < USERS_PAGE_SIZE;

            if let Some(user) = users
                .into_iter()
                .find(|u| u.email.as_deref().is_some_and(|e| email.matches(e)))
            {
                return Ok(Some(user));
            }

            if short_page {
                return Ok(None);
            }
            page += 1;
        }
    }

    #[instrument(skip(self, email, password))]
    async fn create_user(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<IdentityUser, IdentityError> {
        let url = endpoint(&self.config, "auth/v1/admin/users");
        let body = CreateUserRequest {
            email: email.as_str(),
            password: password.expose_secret(),
            email_confirm: true,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        parse_json(response).await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: IdentityUserId) -> Result<(), IdentityError> {
        let url = endpoint(&self.config, &format!("auth/v1/admin/users/{id}"));

        let response = self.client.delete(&url).send().await?;
        check_status(response).await.map(|_| ())
    }

    #[instrument(skip(self, token))]
    async fn user_for_token(&self, token: &str) -> Result<Option<IdentityUser>, IdentityError> {
        let url = endpoint(&self.config, "auth/v1/user");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        parse_json(response).await.map(Some)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(IdentityError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, IdentityError> {
    check_status(response)
        .await?
        .json()
        .await
        .map_err(|e| IdentityError::Parse(e.to_string()))
}
