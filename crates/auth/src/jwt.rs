//! HS256 JWT decoding behind a validator trait.
//!
//! Signature verification is delegated to `jsonwebtoken`; temporal checks go
//! through [`validate_claims`] with an explicit `now` so they stay
//! deterministic and testable.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use vidaplena_core::TenantId;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};
use crate::{PrincipalId, Role};

/// Token validation seam used by the HTTP middleware.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// RFC 7519 wire shape (numeric timestamps).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: PrincipalId,
    tenant_id: TenantId,
    #[serde(default)]
    roles: Vec<Role>,
    iat: i64,
    exp: i64,
}

/// HS256 (shared secret) validator.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            decoding: DecodingKey::from_secret(&secret),
            encoding: EncodingKey::from_secret(&secret),
        }
    }

    /// Mint a token for the given claims.
    ///
    /// The platform has no sign-in flow; this exists for dev tooling and
    /// tests that need a bearer token.
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, TokenValidationError> {
        let wire = WireClaims {
            sub: claims.sub,
            tenant_id: claims.tenant_id,
            roles: claims.roles.clone(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        // Temporal checks are ours (deterministic, explicit `now`), so the
        // library only verifies the signature and shape.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<WireClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        let claims = JwtClaims {
            sub: data.claims.sub,
            tenant_id: data.claims.tenant_id,
            roles: data.claims.roles,
            issued_at: timestamp(data.claims.iat)?,
            expires_at: timestamp(data.claims.exp)?,
        };

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenValidationError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| TokenValidationError::Malformed(format!("bad timestamp: {secs}")))
}
