/// HTTP middleware utilities for blog-service
///
/// Resolves the current actor from a Bearer token. A request without an
/// Authorization header is the anonymous identity (published posts are
/// world-readable); a malformed or expired token is rejected outright
/// rather than downgraded to anonymous.
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::models::{Identity, Role};

/// JWT algorithm - RS256 only, no symmetric fallback
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

static DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Token claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Actor role: "user" or "admin"
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Install the RSA public key used to verify identity tokens.
///
/// Must be called once at startup, before the server accepts requests.
pub fn initialize_identity_key(public_key_pem: &str) -> anyhow::Result<()> {
    let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid identity public key: {}", e))?;

    DECODING_KEY
        .set(key)
        .map_err(|_| anyhow::anyhow!("identity key already initialized"))?;

    Ok(())
}

fn identity_from_token(token: &str) -> Result<Identity, Error> {
    let key = DECODING_KEY
        .get()
        .ok_or_else(|| ErrorUnauthorized("identity verification not configured"))?;

    let validation = Validation::new(JWT_ALGORITHM);
    let data = decode::<Claims>(token, key, &validation)
        .map_err(|_| ErrorUnauthorized("Invalid or expired token"))?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| ErrorUnauthorized("Invalid user ID"))?;

    Ok(Identity {
        id: Some(user_id),
        role: role_from_claim(&data.claims.role),
    })
}

/// Unknown role claims degrade to ordinary-user privilege, never to admin
fn role_from_claim(claim: &str) -> Role {
    match claim {
        "admin" => Role::Admin,
        _ => Role::User,
    }
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        let result = match auth_header {
            None => Ok(Identity::anonymous()),
            Some(value) => match value.strip_prefix("Bearer ") {
                Some(token) => identity_from_token(token),
                None => Err(ErrorUnauthorized("Invalid Authorization scheme")),
            },
        };

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_fall_back_to_user_privilege() {
        assert_eq!(role_from_claim("admin"), Role::Admin);
        assert_eq!(role_from_claim("user"), Role::User);
        assert_eq!(role_from_claim("superuser"), Role::User);
    }
}
