use crate::error::AuthenticationError;
use crate::google_oauth::credentials::ServiceAccountKey;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Stateless Google OAuth endpoints for service accounts.
pub struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    /// Exchange a signed JWT assertion for an access token at the key's `token_uri`.
    pub async fn exchange_service_account(
        key: &ServiceAccountKey,
        scopes: &[&str],
        http_client: &reqwest::Client,
    ) -> Result<AccessToken, AuthenticationError> {
        let assertion = sign_assertion(key, scopes, Utc::now())?;

        let resp = http_client
            .post(key.token_uri.clone())
            .header("Accept", "application/json")
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let (error, description) = match serde_json::from_str::<OauthErrorBody>(&body) {
                Ok(parsed) => (parsed.error, parsed.error_description),
                Err(_) => (
                    status.canonical_reason().unwrap_or("unknown").to_string(),
                    (!body.is_empty()).then_some(body),
                ),
            };
            warn!(
                project_id = %key.project_id,
                status = %status,
                error = %error,
                "token endpoint rejected service-account credential"
            );
            return Err(AuthenticationError::Rejected {
                status,
                error,
                description,
            });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthenticationError::InvalidResponse(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(AuthenticationError::InvalidResponse(
                "empty access_token".to_string(),
            ));
        }

        let expires_in = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        debug!(expires_in, "token response received");
        let expires_at = token_expiry(Utc::now(), expires_in)?;
        info!(
            "Project_ID: {}, Service-account access token issued",
            key.project_id
        );
        Ok(AccessToken::new(
            token.access_token,
            token.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at,
        ))
    }
}

/// Absolute expiry for a relative `expires_in`; rejects negative or out-of-range values.
fn token_expiry(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, AuthenticationError> {
    if expires_in < 0 {
        return Err(AuthenticationError::InvalidResponse(format!(
            "negative expires_in {expires_in}"
        )));
    }
    TimeDelta::try_seconds(expires_in)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| {
            AuthenticationError::InvalidResponse(format!("expires_in {expires_in} out of range"))
        })
}

/// Build the RS256 assertion Google expects for the jwt-bearer grant.
fn sign_assertion(
    key: &ServiceAccountKey,
    scopes: &[&str],
    now: DateTime<Utc>,
) -> Result<String, AuthenticationError> {
    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        sub: &key.client_email,
        aud: key.token_uri.as_str(),
        scope: scopes.join(" "),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();
    Ok(jsonwebtoken::encode(&header, &claims, key.signing_key())?)
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    scope: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OauthErrorBody {
    error: String,
    error_description: Option<String>,
}

/// Bearer token issued for the service account.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub(crate) fn new(
        secret: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            secret: secret.into(),
            token_type: token_type.into(),
            expires_at,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FIRESTORE_SCOPES;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::Value;

    fn key() -> ServiceAccountKey {
        let payload: Value =
            serde_json::from_str(include_str!("../../tests/fixtures/service_account.json"))
                .unwrap();
        ServiceAccountKey::from_payload(&payload).unwrap()
    }

    fn decode_segment(segment: &str) -> Value {
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
    }

    #[test]
    fn assertion_carries_service_account_claims() {
        let key = key();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let jwt = sign_assertion(&key, FIRESTORE_SCOPES, now).unwrap();

        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header = decode_segment(parts[0]);
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["kid"], "0123456789abcdef");

        let claims = decode_segment(parts[1]);
        assert_eq!(claims["iss"], key.client_email.as_str());
        assert_eq!(claims["sub"], key.client_email.as_str());
        assert_eq!(claims["aud"], "https://oauth2.googleapis.com/token");
        assert_eq!(claims["iat"], 1_700_000_000);
        assert_eq!(claims["exp"], 1_700_003_600);
        assert_eq!(
            claims["scope"],
            "https://www.googleapis.com/auth/datastore https://www.googleapis.com/auth/cloud-platform"
        );
    }

    #[test]
    fn expiry_is_relative_to_now() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let expires_at = token_expiry(now, 3599).unwrap();
        assert_eq!(expires_at.timestamp(), 1_700_003_599);
    }

    #[test]
    fn out_of_range_expiry_is_an_invalid_response() {
        let now = Utc::now();
        for expires_in in [i64::MAX, i64::MAX / 1000, -1] {
            let err = token_expiry(now, expires_in).unwrap_err();
            assert!(matches!(err, AuthenticationError::InvalidResponse(_)));
        }
    }

    #[test]
    fn access_token_debug_hides_secret() {
        let token = AccessToken {
            secret: "ya29.secret-value".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: Utc::now() + TimeDelta::seconds(60),
        };
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("ya29"));
        assert!(!token.is_expired());
    }
}
