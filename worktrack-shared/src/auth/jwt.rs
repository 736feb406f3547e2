//! JWT issue and validation.
//!
//! Tokens are signed with HS256 and carry the caller's username, user id
//! and email plus an absolute expiry timestamp. The expiry lives in the
//! signed payload, so validation needs nothing but the secret — the server
//! holds no session state. Token lifetime is chosen by the caller
//! (configured in the API layer, default 30 minutes).
//!
//! # Example
//!
//! ```
//! use worktrack_shared::auth::jwt::{create_token, validate_token, Claims};
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let claims = Claims::new(
//!     "alice".to_string(),
//!     Uuid::new_v4(),
//!     "a@x.com".to_string(),
//!     Duration::minutes(30),
//! );
//! let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
//! let validated = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
//! assert_eq!(validated.sub, "alice");
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into every token
const ISSUER: &str = "worktrack";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims carried by an access token.
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`) plus the user id and email
/// needed to resolve the caller without a database lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username
    pub sub: String,

    /// Authenticated user's id
    pub user_id: Uuid,

    /// Authenticated user's email
    pub email: String,

    /// Issuer - always "worktrack"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring `expires_in` from now.
    pub fn new(username: String, user_id: Uuid, email: String, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: username,
            user_id,
            email,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Whether the embedded expiry is in the past.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a compact JWT string.
///
/// The secret should be at least 32 bytes for HS256; the API layer enforces
/// this at configuration time.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token's signature, issuer and expiry and returns its claims.
///
/// This check is the sole gate in front of every protected endpoint, so
/// every failure mode collapses to an error here and a 401 upstream.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
