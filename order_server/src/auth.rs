//! Bearer-token authentication.
//!
//! Customers authenticate with an HS256 JWT in the `Authorization: Bearer <token>` header. The token's subject is the
//! user id. Add [`JwtClaims`] to a handler's arguments to require a valid token; requests without one are rejected
//! with `401` before the handler runs.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use order_engine::db_types::UserId;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The claims carried in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The user id, as a decimal string.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JwtClaims {
    pub user_id: UserId,
    /// Unix timestamp
    pub expires_at: i64,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity: config.token_validity,
        }
    }

    /// Issues an access token for the user. If `validity` is `None`, the configured token lifetime is used.
    pub fn issue_token(&self, user_id: UserId, validity: Option<Duration>) -> Result<String, ServerError> {
        let now = Utc::now();
        let exp = now + validity.unwrap_or(self.validity);
        let claims = TokenClaims { sub: user_id.to_string(), exp: exp.timestamp(), iat: now.timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ValidationError("token has expired".into()),
            ErrorKind::InvalidSignature => AuthError::ValidationError("signature has failed verification".into()),
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        let claims = data.claims;
        let user_id = claims
            .sub
            .parse::<UserId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| AuthError::PoorlyFormattedToken(format!("'{}' is not a valid user id", claims.sub)))?;
        Ok(JwtClaims { user_id, expires_at: claims.exp })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let value = req.headers().get(header::AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    value.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<TokenIssuer>>() {
            Some(issuer) => bearer_token(req).and_then(|token| issuer.validate(token)).map_err(|e| {
                debug!("🔐️ Rejecting request to {}. {e}", req.path());
                ServerError::from(e)
            }),
            None => {
                error!("🔐️ No token issuer has been configured. Every authenticated request will fail.");
                Err(ServerError::ConfigurationError("No token issuer configured".into()))
            },
        };
        ready(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&AuthConfig::new(secret))
    }

    #[test]
    fn issue_and_validate() {
        let issuer = issuer("a-test-secret-that-is-long-enough-for-hs256");
        let token = issuer.issue_token(42, None).unwrap();
        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert!(claims.expires_at > Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issuer("a-test-secret-that-is-long-enough-for-hs256").issue_token(42, None).unwrap();
        let err = issuer("another-secret-that-is-long-enough-for-hs256").validate(&token).unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(_)));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = issuer("a-test-secret-that-is-long-enough-for-hs256");
        let token = issuer.issue_token(42, Some(Duration::hours(-2))).unwrap();
        assert!(matches!(issuer.validate(&token), Err(AuthError::ValidationError(_))));
        assert!(matches!(issuer.validate("not.a.token"), Err(AuthError::PoorlyFormattedToken(_))));
    }
}
