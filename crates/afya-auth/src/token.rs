//! JWT issuing and validation.

use std::str::FromStr;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use afya_settings::AuthSettings;

use crate::errors::AuthError;
use crate::verify::verify_password;

/// Claims embedded in every issued token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity.
    pub sub: String,
    /// Granted scopes. Order carries no meaning.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Absolute expiry as a Unix timestamp (seconds).
    pub exp: i64,
}

/// The authenticated identity extracted from a valid token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Subject identity.
    pub subject: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

impl Identity {
    /// Whether this identity carries the given scope.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// A freshly signed token.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    /// The encoded JWT.
    pub access_token: String,
    /// Absolute expiry as a Unix timestamp (seconds).
    pub expires_at: i64,
}

/// Issues and validates bearer tokens for the configured service account.
///
/// Stateless beyond the shared signing secret: no issued-token registry and
/// no revocation list. A token stays valid until its natural expiry.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_minutes: u64,
    service_account: String,
    service_password: String,
    service_password_hash: Option<String>,
}

impl TokenService {
    /// Build a token service from auth settings.
    ///
    /// An unrecognized algorithm name falls back to HS256 with a warning
    /// rather than refusing to start.
    #[must_use]
    pub fn new(settings: &AuthSettings) -> Self {
        let algorithm = Algorithm::from_str(&settings.algorithm).unwrap_or_else(|_| {
            warn!(algorithm = %settings.algorithm, "unknown signing algorithm, using HS256");
            Algorithm::HS256
        });
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            algorithm,
            ttl_minutes: settings.token_ttl_minutes,
            service_account: settings.service_account.clone(),
            service_password: settings.service_password.clone(),
            service_password_hash: settings.service_password_hash.clone(),
        }
    }

    /// Verify credentials and sign a token for `subject`.
    ///
    /// Fails with [`AuthError::Unauthenticated`] when the subject is not the
    /// configured service account or the password does not verify.
    pub fn issue(
        &self,
        subject: &str,
        password: &str,
        scopes: Vec<String>,
    ) -> Result<IssuedToken, AuthError> {
        if subject != self.service_account {
            debug!(subject, "token request for unknown subject");
            return Err(AuthError::Unauthenticated);
        }
        if !verify_password(
            password,
            self.service_password_hash.as_deref(),
            &self.service_password,
        ) {
            debug!(subject, "password verification failed");
            return Err(AuthError::Unauthenticated);
        }

        let expires_at = Utc::now().timestamp() + self.ttl_minutes as i64 * 60;
        let claims = Claims {
            sub: subject.to_owned(),
            scopes,
            exp: expires_at,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)?;
        Ok(IssuedToken {
            access_token: token,
            expires_at,
        })
    }

    /// Validate a token and extract the identity it carries.
    ///
    /// Fails with [`AuthError::Unauthenticated`] on a bad signature, a past
    /// expiry (no leeway), or a missing/empty subject claim.
    pub fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!(error = %e, "token validation failed");
            AuthError::Unauthenticated
        })?;
        if data.claims.sub.is_empty() {
            debug!("token has empty subject claim");
            return Err(AuthError::Unauthenticated);
        }
        Ok(Identity {
            subject: data.claims.sub,
            scopes: data.claims.scopes,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
