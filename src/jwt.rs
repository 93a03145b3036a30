//! JWT token generation and validation.
//!
//! Two independent HMAC secrets are used: one for access tokens (15 minutes)
//! and one for refresh tokens (7 days). Decoding verifies the signature and
//! the algorithm family only; expiry is checked by the caller.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived access token (15 minutes)
    Access,
    /// Long-lived refresh token (7 days), only ever used to mint access tokens
    Refresh,
}

impl TokenKind {
    /// Lifetime of a token of this kind, in seconds.
    pub fn duration_secs(self) -> u64 {
        match self {
            TokenKind::Access => ACCESS_TOKEN_DURATION_SECS,
            TokenKind::Refresh => REFRESH_TOKEN_DURATION_SECS,
        }
    }
}

/// Access token duration: 15 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Signing algorithm used for every token this server issues.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted when decoding. Anything outside the HMAC family is rejected.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT claims shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id, decimal)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Token kind
    pub typ: TokenKind,
}

impl Claims {
    /// Build the claims for a token of `kind` issued to `user_id` at `now`.
    pub fn new(user_id: i64, kind: TokenKind, now: u64) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + kind.duration_secs(),
            typ: kind,
        }
    }

    /// The user id carried in `sub`, if it is numeric.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    /// A token is expired strictly after its `exp` second.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.exp
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    /// Cookie lifetime matching the token lifetime.
    pub fn max_age(&self) -> u64 {
        self.claims.typ.duration_secs()
    }
}

/// Access and refresh token minted together at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Encoding and decoding key derived from one secret.
#[derive(Clone)]
struct SigningSecret {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningSecret {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

/// Configuration for JWT operations. Built once at startup and never mutated.
#[derive(Clone)]
pub struct JwtConfig {
    access: SigningSecret,
    refresh: SigningSecret,
}

impl JwtConfig {
    /// Create a new JWT configuration with one secret per token kind.
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: SigningSecret::new(access_secret),
            refresh: SigningSecret::new(refresh_secret),
        }
    }

    fn secret(&self, kind: TokenKind) -> &SigningSecret {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Sign a token of the given kind for a user.
    pub fn issue(&self, user_id: i64, kind: TokenKind, now: u64) -> Result<IssuedToken, JwtError> {
        let claims = Claims::new(user_id, kind, now);
        let token = encode(&claims, &self.secret(kind).encoding_key)?;
        Ok(IssuedToken { token, claims })
    }

    /// Generate a new access token, used when a refresh token is redeemed.
    pub fn issue_access(&self, user_id: i64, now: u64) -> Result<IssuedToken, JwtError> {
        self.issue(user_id, TokenKind::Access, now)
    }

    /// Generate the access and refresh tokens handed out at login.
    pub fn issue_pair(&self, user_id: i64, now: u64) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenKind::Access, now)?,
            refresh: self.issue(user_id, TokenKind::Refresh, now)?,
        })
    }

    /// Decode a token signed with the access secret. Does not check expiry.
    pub fn decode_access(&self, token: &str) -> Result<Claims, JwtError> {
        decode(token, &self.access.decoding_key)
    }

    /// Decode a token signed with the refresh secret. Does not check expiry.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        decode(token, &self.refresh.decoding_key)
    }
}

/// Sign `claims` with HS256.
pub fn encode(claims: &Claims, key: &EncodingKey) -> Result<String, JwtError> {
    jsonwebtoken::encode(&Header::new(SIGNING_ALGORITHM), claims, key).map_err(JwtError::Encoding)
}

/// Verify the signature of `token` and return its claims.
///
/// Only HMAC algorithms are accepted. `exp` is not validated here.
pub fn decode(token: &str, key: &DecodingKey) -> Result<Claims, JwtError> {
    let header = jsonwebtoken::decode_header(token).map_err(|_| JwtError::MalformedToken)?;
    if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
        return Err(JwtError::UnexpectedSigningMethod(header.alg));
    }

    let mut validation = Validation::new(header.alg);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.validate_exp = false;
    validation.leeway = 0;

    jsonwebtoken::decode::<Claims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => JwtError::SignatureInvalid,
            ErrorKind::InvalidAlgorithm => JwtError::UnexpectedSigningMethod(header.alg),
            // Claims are deserialized only after the signature verified.
            ErrorKind::Json(_) => JwtError::UnrecognizedClaims,
            _ => JwtError::MalformedToken,
        })
}

/// Current Unix time in seconds.
pub fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Token could not be parsed as a signed JWT
    MalformedToken,
    /// Signature verified but the payload does not match the claims shape
    UnrecognizedClaims,
    /// Header names an algorithm outside the HMAC family
    UnexpectedSigningMethod(Algorithm),
    /// Signature does not match the secret
    SignatureInvalid,
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::MalformedToken => write!(f, "Malformed token"),
            JwtError::UnrecognizedClaims => write!(f, "Unrecognized token claims"),
            JwtError::UnexpectedSigningMethod(alg) => {
                write!(f, "Unexpected signing method: {:?}", alg)
            }
            JwtError::SignatureInvalid => write!(f, "Invalid token signature"),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
