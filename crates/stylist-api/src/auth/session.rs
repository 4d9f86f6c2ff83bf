//! Firebase ID token verification against the provider JWKS
//!
//! Firebase signs ID tokens with RS256 and publishes the rotating public keys
//! as a JWKS document. Keys are cached per `kid`; a token naming a `kid` that
//! is not cached (or whose entry expired) triggers a refetch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use stylist_core::{constants::FIREBASE_ISSUER_PREFIX, AppError};
use tokio::sync::RwLock;

const DEFAULT_CACHE_TTL_SECONDS: i64 = 3600;
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// The verified caller, attached to request extensions by the session guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
}

/// Verifies a bearer token and resolves it to a session.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Session, AppError>;
}

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>,
    #[serde(rename = "e")]
    pub exponent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    expires_at: DateTime<Utc>,
}

pub struct FirebaseSessionVerifier {
    jwks_url: String,
    project_id: String,
    http_client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CachedKey>>>,
    cache_ttl_seconds: i64,
}

impl FirebaseSessionVerifier {
    pub fn new(jwks_url: String, project_id: String) -> Result<Self, anyhow::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            jwks_url,
            project_id,
            http_client,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        })
    }

    pub fn issuer(&self) -> String {
        format!("{}{}", FIREBASE_ISSUER_PREFIX, self.project_id)
    }

    async fn fetch_jwks(&self) -> Result<Jwks, AppError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to fetch JWKS");
                AppError::Unauthorized("Unable to verify session".to_string())
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "JWKS endpoint returned error");
            return Err(AppError::Unauthorized(
                "Unable to verify session".to_string(),
            ));
        }

        response.json::<Jwks>().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse JWKS");
            AppError::Unauthorized("Unable to verify session".to_string())
        })
    }

    /// Refetch the key set and replace the cache with every RSA key in it.
    async fn refresh_keys(&self) -> Result<(), AppError> {
        let jwks = self.fetch_jwks().await?;
        let expires_at = Utc::now() + chrono::Duration::seconds(self.cache_ttl_seconds);

        let mut fresh = HashMap::new();
        for jwk in jwks.keys {
            let (Some(kid), Some(n), Some(e)) = (&jwk.key_id, &jwk.modulus, &jwk.exponent) else {
                continue;
            };
            if jwk.key_type != "RSA" {
                continue;
            }
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    fresh.insert(kid.clone(), CachedKey { key, expires_at });
                }
                Err(e) => tracing::warn!(kid = %kid, error = %e, "Skipping unusable JWK"),
            }
        }

        tracing::debug!(keys = fresh.len(), "JWKS refreshed");
        *self.cache.write().await = fresh;
        Ok(())
    }

    async fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        let cache = self.cache.read().await;
        cache
            .get(kid)
            .filter(|cached| cached.expires_at > Utc::now())
            .map(|cached| cached.key.clone())
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AppError> {
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }

        self.refresh_keys().await?;

        self.cached_key(kid).await.ok_or_else(|| {
            tracing::debug!(kid = %kid, "Token signed with unknown key");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

#[async_trait]
impl SessionVerifier for FirebaseSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Session, AppError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|_| AppError::Unauthorized("Invalid token format".to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Unauthorized(
                "Unsupported token algorithm".to_string(),
            ));
        }
        let kid = header
            .kid
            .ok_or_else(|| AppError::Unauthorized("Token is missing a key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

        let data = decode::<FirebaseClaims>(token, &key, &validation).map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                ErrorKind::InvalidIssuer => {
                    AppError::Unauthorized("Invalid token issuer".to_string())
                }
                ErrorKind::InvalidAudience => {
                    AppError::Unauthorized("Invalid token audience".to_string())
                }
                _ => AppError::Unauthorized("Invalid or expired token".to_string()),
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthorized("Invalid token subject".to_string()));
        }

        Ok(Session {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}
