use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;
use super::model::AuthenticatedUser;
use crate::core::error::AppError;

/// Verifies RS256 ID tokens issued by the identity provider
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // Standard claims (iss/aud/exp validated by jsonwebtoken)
    sub: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = self.leeway;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        claims_to_user(claims)
    }
}

fn claims_to_user(claims: Claims) -> Result<AuthenticatedUser, AppError> {
    if claims.sub.is_empty() {
        return Err(AppError::Auth("Token subject is empty".to_string()));
    }

    if let Some(user_id) = &claims.user_id {
        if user_id != &claims.sub {
            return Err(AppError::Auth("Token user_id does not match subject".to_string()));
        }
    }

    Ok(AuthenticatedUser {
        uid: claims.sub,
        email: claims.email,
        claims_role: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(value: serde_json::Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_claims_map_to_user() {
        let user = claims_to_user(claims(serde_json::json!({
            "sub": "worker-1",
            "user_id": "worker-1",
            "email": "w1@example.com",
            "role": "worker"
        })))
        .unwrap();

        assert_eq!(user.uid, "worker-1");
        assert_eq!(user.email.as_deref(), Some("w1@example.com"));
        assert_eq!(user.claims_role.as_deref(), Some("worker"));
    }

    #[test]
    fn test_mismatched_user_id_is_rejected() {
        let result = claims_to_user(claims(serde_json::json!({
            "sub": "worker-1",
            "user_id": "someone-else"
        })));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let result = claims_to_user(claims(serde_json::json!({"sub": ""})));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let validator = JwtValidator::new(
            Arc::new(JwksClient::new("http://127.0.0.1:9/jwks", Duration::from_secs(60))),
            "https://securetoken.google.com/demo".to_string(),
            "demo".to_string(),
            Duration::from_secs(0),
        );

        let result = validator.validate_token("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
