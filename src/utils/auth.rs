use crate::config::{AppConfig, DEFAULT_JWT_SECRET};
use crate::error::AppError;
use crate::models::claims::{Claims, IdentityClaim};
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

pub const TOKEN_COOKIE: &str = "token";

/// Issues and verifies identity tokens and builds the cookie that carries them.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
    production: bool,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration, production: bool) -> Self {
        TokenService {
            secret: secret.to_string(),
            ttl,
            production,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::days(config.token_ttl_days),
            config.production,
        )
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }

    /// Sign `identity` as of `now`. Client-supplied `iat`/`exp` attributes are dropped.
    pub fn issue(&self, mut identity: IdentityClaim, now: DateTime<Utc>) -> Result<String, AppError> {
        identity.attributes.remove("iat");
        identity.attributes.remove("exp");

        let iat = now.timestamp();
        let claims = Claims {
            identity,
            iat,
            exp: iat + self.ttl.num_seconds(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?)
    }

    /// Check signature and expiry, returning the signed claims unchanged.
    /// A token stops being valid at the start of its `exp` second.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AppError::InvalidToken("ExpiredSignature".to_string()));
        }
        Ok(claims)
    }

    pub fn cookie(&self, token: String) -> Cookie<'static> {
        self.cookie_builder(token).finish()
    }

    /// Expires the token cookie on the client.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        self.cookie_builder(String::new())
            .max_age(CookieDuration::ZERO)
            .finish()
    }

    fn cookie_builder(&self, value: String) -> actix_web::cookie::CookieBuilder<'static> {
        let same_site = if self.production {
            SameSite::None
        } else {
            SameSite::Strict
        };

        Cookie::build(TOKEN_COOKIE, value)
            .path("/")
            .http_only(true)
            .secure(self.production)
            .same_site(same_site)
    }
}

/// The verified identity must be the one named in the path.
pub fn ensure_owner(claims: &Claims, email: &str) -> Result<(), AppError> {
    match claims.email() {
        Some(own) if own == email => Ok(()),
        _ => Err(AppError::NotOwner),
    }
}
