use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{
    auth::{claims::Claims, dto::AuthResponse, repo_types::User},
    config::JwtConfig,
    error::AppError,
    state::AppState,
};

/// HS256 signing/verification keys plus the issuing profile.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    lifetime_ms: i64,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            lifetime_ms: cfg.expiration_ms,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation
    }

    fn sign(&self, subject: &str, issued_at: OffsetDateTime) -> anyhow::Result<AuthResponse> {
        let exp = issued_at
            .checked_add(Duration::milliseconds(self.lifetime_ms))
            .ok_or_else(|| anyhow::anyhow!("token lifetime {} ms overflows", self.lifetime_ms))?;
        let claims = Claims {
            sub: subject.to_owned(),
            iat: issued_at.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(AuthResponse {
            token,
            expires_in_ms: self.lifetime_ms,
        })
    }

    /// Issues a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> anyhow::Result<AuthResponse> {
        let issued = self.sign(&user.email, OffsetDateTime::now_utc())?;
        debug!(user_id = user.id, "jwt signed");
        Ok(issued)
    }

    /// Signature, issuer/audience, expiry and subject must all match `expected`.
    /// Malformed input is reported as `false`, never as an error.
    pub fn validate(&self, token: &str, expected: &User) -> bool {
        let claims = match decode::<Claims>(token, &self.decoding, &self.validation()) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "jwt rejected");
                return false;
            }
        };
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let valid = claims.sub == expected.email && claims.exp > now;
        if !valid {
            warn!(user_id = expected.id, "jwt subject mismatch or expired");
        }
        valid
    }

    /// Returns the subject of a verified token.
    pub fn extract_subject(&self, token: &str) -> Result<String, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation())
            .map(|data| data.claims.sub)
            .map_err(|e| {
                debug!(error = %e, "jwt rejected");
                AppError::InvalidToken
            })
    }
}
