use crate::error::{AppError, Result};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts},
    http::request::Parts,
    Json,
};
use std::convert::Infallible;

/// Spotify access token from the `Authorization: Bearer` header, if any.
///
/// The browser front-end historically sent the token in the JSON body as
/// `accessToken`, so handlers combine both through [`BearerToken::resolve`].
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(BearerToken(token))
    }
}

impl BearerToken {
    /// Header token first, then the body field.
    pub fn resolve(self, body_token: Option<String>) -> Result<String> {
        self.0
            .or_else(|| body_token.filter(|t| !t.trim().is_empty()))
            .ok_or(AppError::MissingToken)
    }

    /// Unwraps a JSON body extraction. An unreadable body from a caller with
    /// no header token is reported as a missing token, since the body was
    /// the only other place one could have come from.
    pub fn json_body<T>(&self, body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
        match body {
            Ok(Json(value)) => Ok(value),
            Err(_) if self.0.is_none() => Err(AppError::MissingToken),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_wins_over_body() {
        let token = BearerToken(Some("header".into()))
            .resolve(Some("body".into()))
            .unwrap();
        assert_eq!(token, "header");
    }

    #[test]
    fn test_body_fallback_and_missing() {
        assert_eq!(BearerToken(None).resolve(Some("body".into())).unwrap(), "body");
        assert!(matches!(
            BearerToken(None).resolve(Some("  ".into())),
            Err(AppError::MissingToken)
        ));
        assert!(matches!(BearerToken(None).resolve(None), Err(AppError::MissingToken)));
    }

    #[test]
    fn test_json_body_rejections() {
        let bad = || Json::<serde_json::Value>::from_bytes(b"{not json");

        assert!(matches!(
            BearerToken(None).json_body(bad()),
            Err(AppError::MissingToken)
        ));
        assert!(matches!(
            BearerToken(Some("t".into())).json_body(bad()),
            Err(AppError::Validation(_))
        ));

        let ok = Json::<serde_json::Value>::from_bytes(br#"{"a":1}"#);
        assert_eq!(BearerToken(None).json_body(ok).unwrap()["a"], 1);
    }
}
