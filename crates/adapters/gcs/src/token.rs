//! OAuth2 访问令牌
//!
//! 服务账号以 RS256 签名的 JWT 断言换取访问令牌（RFC 7523），
//! 令牌在过期前一分钟内刷新。

use async_trait::async_trait;
use catalog_errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ServiceAccountKey;
use crate::error::{map_status_error, map_transport_error};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// 访问令牌来源
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> AppResult<String>;
}

/// 固定令牌，用于本地模拟器
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

/// JWT 断言 claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// 服务账号令牌来源
pub struct ServiceAccountTokenSource {
    http: reqwest::Client,
    key: ServiceAccountKey,
    scope: String,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(http: reqwest::Client, key: ServiceAccountKey, scope: impl Into<String>) -> AppResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| AppError::config(format!("Invalid service account private key: {}", e)))?;

        Ok(Self {
            http,
            key,
            scope: scope.into(),
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// 生成签名后的 JWT 断言
    pub fn assertion(&self, now: DateTime<Utc>) -> AppResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token assertion: {}", e)))
    }

    async fn fetch(&self) -> AppResult<CachedToken> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;

        debug!(token_uri = %self.key.token_uri, "Requesting access token");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Requesting access token"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body, "Requesting access token"));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(e, "Decoding access token response"))?;

        info!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Access token obtained"
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> AppResult<String> {
        // 持锁刷新，并发请求只会触发一次令牌交换
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
    use secrecy::Secret;

    const PRIVATE_KEY: &str = include_str!("../tests/fixtures/service_account_key.pem");
    const PUBLIC_KEY: &str = include_str!("../tests/fixtures/service_account_key.pub.pem");

    fn key() -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "uploader@toko.iam.gserviceaccount.com".to_string(),
            private_key_id: Some("kid-1".to_string()),
            private_key: Secret::new(PRIVATE_KEY.to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    #[test]
    fn test_assertion_is_verifiable() {
        let source = ServiceAccountTokenSource::new(reqwest::Client::new(), key(), "scope-a").unwrap();
        let jwt = source.assertion(Utc::now()).unwrap();

        let header = decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("kid-1"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        let decoded = decode::<AssertionClaims>(
            &jwt,
            &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.claims.iss, "uploader@toko.iam.gserviceaccount.com");
        assert_eq!(decoded.claims.scope, "scope-a");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, ASSERTION_LIFETIME_SECS);
    }

    #[test]
    fn test_invalid_private_key_rejected() {
        let mut bad = key();
        bad.private_key = Secret::new("not a pem".to_string());
        let err = ServiceAccountTokenSource::new(reqwest::Client::new(), bad, "scope")
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_cached_token_freshness() {
        let now = Utc::now();
        let token = CachedToken {
            value: "t".to_string(),
            expires_at: now + Duration::seconds(120),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(61)));
    }

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken("owner".to_string());
        assert_eq!(source.access_token().await.unwrap(), "owner");
    }
}
