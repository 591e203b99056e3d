//! Bearer token verification for consumers of the ingested data.
//!
//! Tokens are HS256 JWTs signed with a pre-shared secret. The verifier is
//! built from the secret plus the issuer the token itself declares, so any
//! issuer sharing the secret is accepted. `exp` is enforced when present.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    sub: Option<String>,
}

/// Verify an `Authorization` header value and return the caller's subject.
pub fn verify_bearer(authorization: Option<&str>, secret: &str) -> AuthResult<String> {
    let token = authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingBearer)?;

    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let issuer = declared_issuer(token)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    if let Some(iss) = issuer {
        validation.set_issuer(&[iss]);
    }

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;

    data.claims
        .sub
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::MissingSubject)
}

/// Read `iss` without checking the signature.
fn declared_issuer(token: &str) -> AuthResult<Option<String>> {
    let mut peek = Validation::new(Algorithm::HS256);
    peek.insecure_disable_signature_validation();
    peek.validate_exp = false;
    peek.validate_aud = false;
    peek.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &peek)?;
    Ok(data.claims.iss)
}
