use crate::services::SpotifyAuth;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn login(State(state): State<Arc<AppState>>) -> Redirect {
    match state.auth.authorize_url(&SpotifyAuth::generate_state()) {
        Ok(url) => Redirect::to(&url),
        Err(e) => {
            tracing::error!("Failed to build authorize URL: {}", e);
            Redirect::to("/#error=login_unavailable")
        }
    }
}

async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    if params.state.is_none() {
        return Redirect::to("/#error=state_mismatch");
    }

    if let Some(error) = params.error {
        tracing::warn!("Spotify authorization declined: {}", error);
        return Redirect::to("/#error=access_denied");
    }

    let Some(code) = params.code else {
        return Redirect::to("/#error=invalid_token");
    };

    match state.auth.exchange_code(&code).await {
        Ok(grant) => {
            let mut fragment = format!("/#access_token={}", grant.access_token);
            if let Some(refresh) = grant.refresh_token {
                fragment.push_str(&format!("&refresh_token={}", refresh));
            }
            Redirect::to(&fragment)
        }
        Err(e) => {
            tracing::error!("Error getting token: {}", e);
            Redirect::to("/#error=invalid_token")
        }
    }
}
