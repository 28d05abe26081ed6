//! Service account token source
//!
//! Implements the JWT-bearer grant (RFC 7523) with an RS256 assertion signed
//! by the service account's private key.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::common::{ProviderError, ProviderResult};
use crate::config::defaults;
use crate::credentials::AdcDocument;
use crate::exchange;
use crate::mapper::TokenResponse;

/// `grant_type` of the JWT-bearer grant
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime accepted by Google's token endpoint
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Key material of a `service_account` ADC document
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ServiceAccountKey {
    #[zeroize(skip)]
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    #[zeroize(skip)]
    pub private_key_id: String,
    #[serde(default = "defaults::token_url")]
    #[zeroize(skip)]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl ServiceAccountKey {
    pub fn from_document(document: &AdcDocument) -> ProviderResult<Self> {
        serde_json::from_value(Value::Object(document.fields().clone())).map_err(|e| {
            ProviderError::CredentialsUnavailable(format!(
                "invalid service account key in {}: {}",
                document.path().display(),
                e
            ))
        })
    }

    pub fn claims(&self, scopes: &[String], now: DateTime<Utc>) -> AssertionClaims {
        let iat = now.timestamp();
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: scopes.join(" "),
            aud: self.token_uri.clone(),
            iat,
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        }
    }

    /// Signed assertion for the given scopes
    pub fn assertion(&self, scopes: &[String], now: DateTime<Utc>) -> ProviderResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        if !self.private_key_id.is_empty() {
            header.kid = Some(self.private_key_id.clone());
        }

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| ProviderError::SigningFailed(e.to_string()))?;

        jsonwebtoken::encode(&header, &self.claims(scopes, now), &key)
            .map_err(|e| ProviderError::SigningFailed(e.to_string()))
    }

    pub async fn token(&self, client: &Client, scopes: &[String]) -> ProviderResult<TokenResponse> {
        info!(account = %self.client_email, "Exchanging service account assertion");

        let assertion = self.assertion(scopes, Utc::now())?;
        let raw = exchange::post_form(
            client,
            &self.token_uri,
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())],
        )
        .await?;
        TokenResponse::parse(&raw.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = include_str!("testdata/service_account_key.pem");

    fn key(token_uri: &str) -> ServiceAccountKey {
        let doc = json!({
            "type": "service_account",
            "client_email": "deployer@example.iam.gserviceaccount.com",
            "private_key": TEST_KEY,
            "private_key_id": "key-1",
            "token_uri": token_uri,
        });
        let document = AdcDocument::parse("sa.json", doc.to_string()).unwrap();
        ServiceAccountKey::from_document(&document).unwrap()
    }

    fn decode_segment(segment: &str) -> Value {
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
    }

    #[test]
    fn test_claims() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let scopes = vec!["a".to_string(), "b".to_string()];
        let claims = key("https://oauth2.googleapis.com/token").claims(&scopes, now);

        assert_eq!(claims.iss, "deployer@example.iam.gserviceaccount.com");
        assert_eq!(claims.scope, "a b");
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_assertion_is_signed_jwt() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let sa = key("https://oauth2.googleapis.com/token");
        let jwt = sa.assertion(&["openid".to_string()], now).unwrap();

        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(!parts[2].is_empty());

        let header = decode_segment(parts[0]);
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["kid"], "key-1");

        let claims = decode_segment(parts[1]);
        assert_eq!(claims["iss"], "deployer@example.iam.gserviceaccount.com");
        assert_eq!(claims["iat"], now.timestamp());
    }

    #[test]
    fn test_missing_token_uri_defaults_to_google() {
        let doc = json!({"client_email": "sa@example.com", "private_key": "pem"});
        let document = AdcDocument::parse("sa.json", doc.to_string()).unwrap();
        let sa = ServiceAccountKey::from_document(&document).unwrap();
        assert_eq!(sa.token_uri, defaults::GOOGLE_TOKEN_URL);
    }

    #[test]
    fn test_missing_private_key_rejected() {
        let document =
            AdcDocument::parse("sa.json", r#"{"client_email":"sa@example.com"}"#.to_string())
                .unwrap();
        assert!(matches!(
            ServiceAccountKey::from_document(&document),
            Err(ProviderError::CredentialsUnavailable(_))
        ));
    }

    #[test]
    fn test_bad_key_fails_signing() {
        let doc = json!({"client_email": "sa@example.com", "private_key": "not a pem"});
        let document = AdcDocument::parse("sa.json", doc.to_string()).unwrap();
        let sa = ServiceAccountKey::from_document(&document).unwrap();
        assert!(matches!(
            sa.assertion(&[], Utc::now()),
            Err(ProviderError::SigningFailed(_))
        ));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let sa = key("https://oauth2.googleapis.com/token");
        let rendered = format!("{:?}", sa);
        assert!(!rendered.contains("BEGIN PRIVATE KEY"));
        assert!(rendered.contains(r#"private_key: "[REDACTED]""#));
        assert!(!rendered.contains(sa.private_key.as_str()));

        // No line of the base64 key body may appear either
        for line in TEST_KEY.lines().filter(|l| !l.starts_with("-----")) {
            assert!(!rendered.contains(line), "key body leaked: {}", line);
        }
    }

    #[tokio::test]
    async fn test_token_posts_jwt_bearer_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
            ))
            .and(body_string_contains("assertion="))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"access_token":"ya29.sa","expires_in":3599,"token_type":"Bearer"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let sa = key(&format!("{}/token", server.uri()));
        let token = sa.token(&Client::new(), &defaults::scopes()).await.unwrap();
        assert_eq!(token.access_token, "ya29.sa");
        assert_eq!(token.token_type, "Bearer");
    }
}
