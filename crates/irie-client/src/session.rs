//! Cookie-authenticated REST session against the backend.
//!
//! Owns the HTTP client and its cookie jar. [`Session::login`] obtains the
//! `session_token` cookie, and every later call rides on it, including the
//! WebSocket upgrade via [`Session::cookie_header`].

use std::sync::Arc;

use reqwest::{
    Client, Response, StatusCode, Url,
    cookie::{CookieStore, Jar},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::friend::Friend;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configured base URL did not parse.
    #[error("invalid base url {url:?}: {reason}")]
    BaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Transport-level HTTP failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an unexpected status.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// Response status code.
        status: StatusCode,
        /// Response body, for the log.
        body: String,
    },

    /// Login succeeded at the HTTP level but set no session cookie.
    #[error("login did not produce a session cookie")]
    NoSessionCookie,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthStatus {
    is_authenticated: bool,
}

/// REST client bound to one backend origin.
#[derive(Clone)]
pub struct Session {
    http: Client,
    jar: Arc<Jar>,
    base: Url,
}

impl Session {
    /// Build a session for `base_url` (for example `http://localhost:8080`).
    ///
    /// # Errors
    ///
    /// [`SessionError::BaseUrl`] for an unparseable URL, or
    /// [`SessionError::Http`] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let base = Url::parse(base_url).map_err(|err| SessionError::BaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder().cookie_provider(jar.clone()).build()?;
        Ok(Self { http, jar, base })
    }

    /// Log in with a username (or email) and password.
    ///
    /// On success the backend sets the `session_token` cookie in the jar.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnexpectedStatus`] on rejected credentials and
    /// [`SessionError::NoSessionCookie`] if the backend claims success
    /// without setting the cookie.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let response = self
            .http
            .post(self.endpoint("/api/users/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }
        if self.cookie_header().is_none() {
            return Err(SessionError::NoSessionCookie);
        }
        Ok(())
    }

    /// Whether the session cookie is still valid server-side.
    ///
    /// # Errors
    ///
    /// [`SessionError::Http`] or [`SessionError::UnexpectedStatus`] on
    /// transport or server failure; an expired session is `Ok(false)`.
    pub async fn check_auth(&self) -> Result<bool, SessionError> {
        let response = self.http.get(self.endpoint("/api/users/check-auth")).send().await?;
        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }
        let status: AuthStatus = response.json().await?;
        Ok(status.is_authenticated)
    }

    /// End the session server-side and expire the cookie.
    ///
    /// # Errors
    ///
    /// [`SessionError::Http`] or [`SessionError::UnexpectedStatus`].
    pub async fn logout(&self) -> Result<(), SessionError> {
        let response = self.http.post(self.endpoint("/api/users/logout")).send().await?;
        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }
        Ok(())
    }

    /// Fetch the accepted friends of the logged-in account.
    ///
    /// The backend encodes an empty list as JSON `null`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Http`] or [`SessionError::UnexpectedStatus`].
    pub async fn friends(&self) -> Result<Vec<Friend>, SessionError> {
        let response = self.http.get(self.endpoint("/friends")).send().await?;
        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }
        let friends: Option<Vec<Friend>> = response.json().await?;
        Ok(friends.unwrap_or_default())
    }

    /// The `Cookie` header value for the backend origin, or `None` before
    /// login. The WebSocket upgrade request carries this to authenticate.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        let value = self.jar.cookies(&self.base)?;
        value.to_str().ok().map(str::to_string)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }
}

async fn unexpected(response: Response) -> SessionError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    SessionError::UnexpectedStatus { status, body }
}
