//! Service-account authentication for the Indexing API.
//!
//! Google service accounts authenticate with the OAuth2 JWT-bearer grant:
//! the client signs a short-lived RS256 assertion with the account's private
//! key and trades it at the account's `token_uri` for a bearer token.
//!
//! ```text
//! header  { "alg": "RS256", "typ": "JWT" }
//! claims  { iss: client_email, scope, aud: token_uri, iat, exp: iat + 3600 }
//!
//! POST token_uri
//!   grant_type=urn:ietf:params:oauth:grant-type:jwt-bearer
//!   assertion=<signed JWT>
//! → { "access_token": "...", ... }
//! ```

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// A token exchange slower than this aborts the submit pass.
pub const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("service account credential not set")]
    MissingCredential,
    #[error("invalid service account JSON: {0}")]
    Credential(#[from] serde_json::Error),
    #[error("could not sign assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Anything that can hand out a bearer token.
pub trait TokenProvider {
    fn access_token(&self) -> Result<String, AuthError>;
}

/// The fields of a service-account key file this crate needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccount {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Claims for an assertion issued at `now` (seconds since the epoch).
    pub fn claims(&self, scope: &str, now: i64) -> Claims {
        Claims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Sign the assertion with the account's RSA key.
    pub fn signed_assertion(&self, scope: &str, now: i64) -> Result<String, AuthError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &self.claims(scope, now),
            &key,
        )?;
        Ok(token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// JWT-bearer token exchange for a service account.
///
/// The credential JSON is parsed on first use, so a missing or malformed
/// credential only surfaces when a token is actually needed.
pub struct ServiceAccountAuth {
    http: reqwest::blocking::Client,
    credential: Option<String>,
    scope: String,
}

impl ServiceAccountAuth {
    pub fn new(credential: Option<String>, scope: impl Into<String>) -> Result<Self, AuthError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(TOKEN_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            credential,
            scope: scope.into(),
        })
    }
}

impl TokenProvider for ServiceAccountAuth {
    fn access_token(&self) -> Result<String, AuthError> {
        let json = self
            .credential
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(AuthError::MissingCredential)?;
        let account = ServiceAccount::from_json(json)?;
        let assertion = account.signed_assertion(&self.scope, chrono::Utc::now().timestamp())?;

        debug!(account = %account.client_email, "requesting access token");
        let response = self
            .http
            .post(&account.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }
        let token: TokenResponse = response.json()?;
        Ok(token.access_token)
    }
}
