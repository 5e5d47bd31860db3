//! JWT token issuance and validation
//!
//! Tokens are stateless bearer credentials: validity rests solely on the
//! signature, the embedded expiry and the issuer claim.

use crate::config::{JwtConfig, SigningAlgorithm};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upper bound on `jwt.expires_in_secs` (one day)
pub const MAX_TOKEN_VALIDITY_SECS: i64 = 86_400;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Concatenated role names of the subject
    pub scope: String,
}

/// Pre-computed signing and verification keys
///
/// These are expensive to create, so they are built once at startup and
/// shared through `AppState`.
#[derive(Clone)]
pub struct JwtKeys {
    algorithm: Algorithm,
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Symmetric HS256 keys from a shared secret
    pub fn hs256(secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    /// Asymmetric RS256 keys from PEM encoded key material
    pub fn rs256_from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self> {
        let encoding = EncodingKey::from_rsa_pem(private_pem).context("Invalid RSA private key")?;
        let decoding = DecodingKey::from_rsa_pem(public_pem).context("Invalid RSA public key")?;

        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding: Arc::new(encoding),
            decoding: Arc::new(decoding),
        })
    }

    /// Build keys for the configured algorithm, reading PEM files if needed
    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        match config.algorithm {
            SigningAlgorithm::HS256 => Ok(Self::hs256(&config.secret)),
            SigningAlgorithm::RS256 => {
                let private_path = config
                    .private_key_path
                    .as_deref()
                    .context("jwt.private_key_path is required for RS256")?;
                let public_path = config
                    .public_key_path
                    .as_deref()
                    .context("jwt.public_key_path is required for RS256")?;

                let private_pem = std::fs::read(private_path)
                    .with_context(|| format!("Failed to read {}", private_path))?;
                let public_pem = std::fs::read(public_path)
                    .with_context(|| format!("Failed to read {}", public_path))?;

                Self::rs256_from_pem(&private_pem, &public_pem)
            }
        }
    }
}

/// A freshly signed token and the validity window it was minted with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Builds, signs and verifies access tokens
///
/// Cloning is cheap: keys are behind `Arc`.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: JwtKeys,
    issuer: Arc<str>,
    expires_in_secs: i64,
}

impl TokenIssuer {
    pub fn new(keys: JwtKeys, issuer: impl Into<String>, expires_in_secs: i64) -> Self {
        Self {
            keys,
            issuer: Arc::from(issuer.into()),
            expires_in_secs,
        }
    }

    /// Create from configuration
    ///
    /// Call this once at application startup and store in AppState.
    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        if !(1..=MAX_TOKEN_VALIDITY_SECS).contains(&config.expires_in_secs) {
            anyhow::bail!(
                "jwt.expires_in_secs must be between 1 and {}, got {}",
                MAX_TOKEN_VALIDITY_SECS,
                config.expires_in_secs
            );
        }

        let keys = JwtKeys::from_config(config)?;
        Ok(Self::new(keys, config.issuer.clone(), config.expires_in_secs))
    }

    /// Sign a token for `subject` carrying `scope`, valid from `now`
    pub fn issue(&self, subject: &str, scope: &str, now: DateTime<Utc>) -> Result<IssuedToken> {
        let exp = now + Duration::seconds(self.expires_in_secs);

        let claims = Claims {
            iss: self.issuer.to_string(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            scope: scope.to_string(),
        };

        let token = encode(&Header::new(self.keys.algorithm), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))?;

        Ok(IssuedToken {
            token,
            expires_in: self.expires_in_secs,
        })
    }

    /// Verify signature, expiry and issuer, returning the claims
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.keys.algorithm);
        validation.set_issuer(&[&*self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data = decode::<Claims>(token, &self.keys.decoding, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

        Ok(token_data.claims)
    }

    #[inline]
    pub fn expires_in_secs(&self) -> i64 {
        self.expires_in_secs
    }

    #[inline]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use proptest::prelude::*;

    fn create_test_issuer() -> TokenIssuer {
        TokenIssuer::new(JwtKeys::hs256("test-secret"), "backend", 300)
    }

    #[test]
    fn test_issue_and_decode() {
        let issuer = create_test_issuer();
        let now = Utc::now();

        let issued = issuer.issue("user-1", "ADMIN", now).unwrap();
        let claims = issuer.decode(&issued.token).unwrap();

        assert_eq!(issued.expires_in, 300);
        assert_eq!(claims.iss, "backend");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.scope, "ADMIN");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = create_test_issuer();
        let long_ago = Utc::now() - Duration::hours(1);

        let issued = issuer.issue("user-1", "BASIC", long_ago).unwrap();
        assert!(issuer.decode(&issued.token).is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = TokenIssuer::new(JwtKeys::hs256("another-secret"), "backend", 300);
        let issued = other.issue("user-1", "BASIC", Utc::now()).unwrap();

        assert!(create_test_issuer().decode(&issued.token).is_err());
    }

    #[test]
    fn test_token_from_other_issuer_rejected() {
        let other = TokenIssuer::new(JwtKeys::hs256("test-secret"), "someone-else", 300);
        let issued = other.issue("user-1", "BASIC", Utc::now()).unwrap();

        assert!(create_test_issuer().decode(&issued.token).is_err());
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!(create_test_issuer().decode("invalid.token.here").is_err());
    }

    #[test]
    fn test_from_default_config() {
        let issuer = TokenIssuer::from_config(&AppConfig::default().jwt).unwrap();
        assert_eq!(issuer.issuer(), "backend");
        assert_eq!(issuer.expires_in_secs(), 300);
    }

    #[test]
    fn test_rs256_requires_key_paths() {
        let mut config = AppConfig::default().jwt;
        config.algorithm = SigningAlgorithm::RS256;
        assert!(JwtKeys::from_config(&config).is_err());

        config.private_key_path = Some("/nonexistent/private.pem".to_string());
        config.public_key_path = Some("/nonexistent/public.pem".to_string());
        assert!(JwtKeys::from_config(&config).is_err());
    }

    fn rs256_config() -> JwtConfig {
        let mut config = AppConfig::default().jwt;
        config.algorithm = SigningAlgorithm::RS256;
        config.private_key_path = Some(
            concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/jwt_rs256_private.pem").to_string(),
        );
        config.public_key_path = Some(
            concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/jwt_rs256_public.pem").to_string(),
        );
        config
    }

    #[test]
    fn test_rs256_issue_and_decode_from_pem_files() {
        let issuer = TokenIssuer::from_config(&rs256_config()).unwrap();
        let now = Utc::now();

        let issued = issuer.issue("user-1", "ADMIN", now).unwrap();
        let header = jsonwebtoken::decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);

        let claims = issuer.decode(&issued.token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.scope, "ADMIN");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_hs256_issuer_rejects_rs256_token() {
        let rs256 = TokenIssuer::from_config(&rs256_config()).unwrap();
        let issued = rs256.issue("user-1", "ADMIN", Utc::now()).unwrap();

        let hs256 = TokenIssuer::from_config(&AppConfig::default().jwt).unwrap();
        assert!(hs256.decode(&issued.token).is_err());
    }

    #[test]
    fn test_rs256_issuer_rejects_hs256_token() {
        let hs256 = TokenIssuer::from_config(&AppConfig::default().jwt).unwrap();
        let issued = hs256.issue("user-1", "ADMIN", Utc::now()).unwrap();

        let rs256 = TokenIssuer::from_config(&rs256_config()).unwrap();
        assert!(rs256.decode(&issued.token).is_err());
    }

    #[test]
    fn test_validity_window_must_be_bounded() {
        let mut config = AppConfig::default().jwt;
        for bad in [0, -300, MAX_TOKEN_VALIDITY_SECS + 1, i64::MAX] {
            config.expires_in_secs = bad;
            assert!(TokenIssuer::from_config(&config).is_err(), "accepted {}", bad);
        }

        config.expires_in_secs = MAX_TOKEN_VALIDITY_SECS;
        assert!(TokenIssuer::from_config(&config).is_ok());
    }

    #[test]
    fn test_rs256_rejects_garbage_pem() {
        assert!(JwtKeys::rs256_from_pem(b"not a key", b"not a key").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Property: decoding an issued token yields the subject and scope it was issued with
        #[test]
        fn prop_issue_decode_round_trip(
            subject in "[a-zA-Z0-9-]{1,40}",
            scope in "[A-Z_]{0,30}",
        ) {
            let issuer = create_test_issuer();
            let issued = issuer.issue(&subject, &scope, Utc::now()).unwrap();
            let claims = issuer.decode(&issued.token).unwrap();

            prop_assert_eq!(claims.sub, subject);
            prop_assert_eq!(claims.scope, scope);
            prop_assert_eq!(claims.exp - claims.iat, issued.expires_in);
        }
    }
}
