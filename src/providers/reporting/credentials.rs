//! Bearer credentials for the reporting API.
//!
//! A service-account key document is turned into a short-lived access token by signing a
//! JWT assertion and exchanging it at the key's token endpoint. The token is kept until
//! shortly before it expires; nothing is persisted between runs.

use crate::{AnalyticsError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const LOG_TARGET: &str = "     token";

/// Read-only analytics scope requested for every token.
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are exchanged again.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// How the reporting provider authenticates.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// A bearer token obtained elsewhere
    AccessToken(String),

    /// The raw JSON key document of a service account
    ServiceAccountJson(String),
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: i64,
}

const fn default_token_lifetime() -> i64 {
    DEFAULT_TOKEN_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Exchanges a service-account key for access tokens, caching the latest one.
pub struct ServiceAccount {
    client: reqwest::Client,
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    encoding_key: EncodingKey,
    cached: Mutex<Option<AccessToken>>,
}

impl core::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccount {
    /// Parse a service-account key document.
    ///
    /// Stray carriage returns and line feeds are removed first, since keys pasted into
    /// settings or environment variables often get wrapped.
    pub fn from_json(raw: &str, client: reqwest::Client) -> Result<Self> {
        let cleaned: String = raw.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
        let key: ServiceAccountKey = serde_json::from_str(&cleaned)
            .map_err(|e| AnalyticsError::configuration_with("service account credentials are not a valid key document", e))?;

        if key.client_email.is_empty() {
            return Err(AnalyticsError::configuration("service account credentials have an empty client_email"));
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AnalyticsError::configuration_with("service account private key is not a valid RSA key", e))?;

        Ok(Self {
            client,
            client_email: key.client_email,
            token_uri: key.token_uri,
            key_id: key.private_key_id,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// A valid access token, exchanging a new assertion if the cached one is stale.
    pub async fn access_token(&self, now: DateTime<Utc>) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            log::trace!(target: LOG_TARGET, "Reusing access token for '{}'", self.client_email);
            return Ok(token.token.clone());
        }

        let token = self.exchange(now).await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// A signed RS256 assertion asking for the read-only analytics scope.
    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: ANALYTICS_READONLY_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key_id);

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AnalyticsError::configuration_with("could not sign service account assertion", e))
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<AccessToken> {
        log::info!(target: LOG_TARGET, "Requesting access token for '{}'", self.client_email);

        let assertion = self.assertion(now)?;
        let resp = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AnalyticsError::configuration_with("access token request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_else(|e| {
                log::debug!(target: LOG_TARGET, "Could not read token endpoint error body: {e}");
                String::new()
            });
            return Err(AnalyticsError::configuration(format!(
                "token endpoint rejected the service account assertion with status {status}: {body}"
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AnalyticsError::configuration_with("token endpoint returned an unexpected response", e))?;

        log::debug!(target: LOG_TARGET, "Access token for '{}' valid for {}s", self.client_email, token.expires_in);

        // a negative lifetime means the token is already stale
        let expires_at = TimeDelta::try_seconds(token.expires_in.max(0))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AnalyticsError::configuration(format!("token endpoint returned an invalid expires_in: {}", token.expires_in)))?;

        Ok(AccessToken {
            token: token.access_token,
            expires_at,
        })
    }
}

/// Where bearer tokens come from.
#[derive(Debug)]
pub enum TokenSource {
    Static(String),
    ServiceAccount(ServiceAccount),
}

impl TokenSource {
    pub fn from_credentials(credentials: Credentials, client: reqwest::Client) -> Result<Self> {
        match credentials {
            Credentials::AccessToken(token) if token.is_empty() => Err(AnalyticsError::configuration("access token is empty")),
            Credentials::AccessToken(token) => Ok(Self::Static(token)),
            Credentials::ServiceAccountJson(raw) => Ok(Self::ServiceAccount(ServiceAccount::from_json(&raw, client)?)),
        }
    }

    pub async fn bearer(&self) -> Result<String> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::ServiceAccount(account) => account.access_token(Utc::now()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation};

    const PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/service_account_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../../tests/fixtures/service_account_key.pub.pem");
    const CLIENT_EMAIL: &str = "reporter@analytics-report-test.iam.gserviceaccount.com";
    const TOKEN_URI: &str = "https://oauth2.example.test/token";

    #[derive(Debug, Deserialize)]
    struct DecodedClaims {
        iss: String,
        scope: String,
        aud: String,
        iat: i64,
        exp: i64,
    }

    fn service_account() -> ServiceAccount {
        let json = serde_json::json!({
            "type": "service_account",
            "private_key_id": "0123456789abcdef",
            "private_key": PRIVATE_KEY,
            "client_email": CLIENT_EMAIL,
            "token_uri": TOKEN_URI,
        })
        .to_string();
        ServiceAccount::from_json(&json, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn test_assertion_claims() {
        let now = Utc::now();
        let assertion = service_account().assertion(now).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[TOKEN_URI]);
        validation.set_issuer(&[CLIENT_EMAIL]);
        let decoded =
            jsonwebtoken::decode::<DecodedClaims>(&assertion, &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(), &validation)
                .unwrap();

        assert_eq!(decoded.header.alg, Algorithm::RS256);
        assert_eq!(decoded.header.kid.as_deref(), Some("0123456789abcdef"));
        assert_eq!(decoded.claims.scope, ANALYTICS_READONLY_SCOPE);
        assert_eq!(decoded.claims.iss, CLIENT_EMAIL);
        assert_eq!(decoded.claims.aud, TOKEN_URI);
        assert_eq!(decoded.claims.iat, now.timestamp());
        assert_eq!(decoded.claims.exp - decoded.claims.iat, ASSERTION_LIFETIME_SECS);
    }

    #[test]
    fn test_default_token_uri() {
        let json = serde_json::json!({ "private_key": PRIVATE_KEY, "client_email": CLIENT_EMAIL }).to_string();
        let account = ServiceAccount::from_json(&json, reqwest::Client::new()).unwrap();
        assert_eq!(account.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(account.client_email(), CLIENT_EMAIL);
    }

    #[test]
    fn test_rejects_invalid_json() {
        let err = ServiceAccount::from_json("{not json", reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Configuration { .. }));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let err = ServiceAccount::from_json(r#"{"client_email": "a@b.iam.gserviceaccount.com"}"#, reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Configuration { .. }));
    }

    #[test]
    fn test_rejects_invalid_private_key() {
        let json = r#"{"client_email": "a@b.iam.gserviceaccount.com", "private_key": "not a key"}"#;
        let err = ServiceAccount::from_json(json, reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Configuration { .. }));
    }

    #[test]
    fn test_empty_access_token_is_rejected() {
        let err = TokenSource::from_credentials(Credentials::AccessToken(String::new()), reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_static_bearer() {
        let source = TokenSource::from_credentials(Credentials::AccessToken("abc".into()), reqwest::Client::new()).unwrap();
        assert_eq!(source.bearer().await.unwrap(), "abc");
    }

    #[test]
    fn test_token_freshness_margin() {
        let now = Utc::now();
        let fresh = AccessToken {
            token: "t".into(),
            expires_at: now + TimeDelta::seconds(EXPIRY_MARGIN_SECS + 5),
        };
        let stale = AccessToken {
            token: "t".into(),
            expires_at: now + TimeDelta::seconds(EXPIRY_MARGIN_SECS - 5),
        };

        assert!(fresh.is_fresh(now));
        assert!(!stale.is_fresh(now));
    }
}
