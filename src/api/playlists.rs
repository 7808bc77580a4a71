use crate::api::middleware::BearerToken;
use crate::error::{AppError, Result};
use crate::models::{
    CreatePlaylistRequest, CreatePlaylistResponse, ParsePromptRequest, ParsePromptResponse,
    QueryDescriptor, SearchByBpmRequest, SearchByCriteriaRequest, TracksResponse, UserProfile,
};
use crate::services::{normalizer::normalize, playlists::publish_playlist, PromptInterpreter};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn playlist_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search-by-bpm", post(search_by_bpm))
        .route("/parse-prompt", post(parse_prompt))
        .route("/search-by-criteria", post(search_by_criteria))
        .route("/create-playlist", post(create_playlist))
        .route("/me", get(me))
}

fn interpreter(state: &AppState) -> Result<&PromptInterpreter> {
    state.interpreter.as_deref().ok_or(AppError::AiUnavailable)
}

async fn search_by_bpm(
    State(state): State<Arc<AppState>>,
    bearer: BearerToken,
    body: std::result::Result<Json<SearchByBpmRequest>, JsonRejection>,
) -> Result<Json<TracksResponse>> {
    let req = bearer.json_body(body)?;
    let token = bearer.resolve(req.access_token.clone())?;

    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if req.min_bpm >= req.max_bpm {
        return Err(AppError::Validation(
            "minBpm must be lower than maxBpm".to_string(),
        ));
    }

    let descriptor = QueryDescriptor::from_range(req.min_bpm as i32, req.max_bpm as i32);
    let tracks = state
        .aggregator
        .search(&token, &descriptor, req.limit)
        .await
        .map_err(|e| e.during("Failed to search tracks"))?;

    Ok(Json(TracksResponse { tracks }))
}

async fn parse_prompt(
    State(state): State<Arc<AppState>>,
    bearer: BearerToken,
    body: std::result::Result<Json<ParsePromptRequest>, JsonRejection>,
) -> Result<Json<ParsePromptResponse>> {
    let req = bearer.json_body(body)?;
    bearer.resolve(req.access_token.clone())?;

    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if req.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt must not be blank".to_string()));
    }

    let parsed = interpreter(&state)?
        .interpret(req.prompt.trim())
        .await
        .map_err(|e| e.during("Failed to interpret prompt"))?;

    Ok(Json(ParsePromptResponse {
        descriptor: normalize(&parsed.criteria),
        criteria: parsed.criteria,
        suggested_name: parsed.suggested_name,
    }))
}

async fn search_by_criteria(
    State(state): State<Arc<AppState>>,
    bearer: BearerToken,
    body: std::result::Result<Json<SearchByCriteriaRequest>, JsonRejection>,
) -> Result<Json<TracksResponse>> {
    let req = bearer.json_body(body)?;
    let token = bearer.resolve(req.access_token.clone())?;

    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let criteria = match req.prompt.as_deref().map(str::trim) {
        Some(prompt) if !prompt.is_empty() => {
            interpreter(&state)?
                .interpret(prompt)
                .await
                .map_err(|e| e.during("Failed to interpret prompt"))?
                .criteria
        }
        _ => req.criteria.unwrap_or_default(),
    };

    let descriptor = normalize(&criteria);
    tracing::info!(
        "Searching {}-{} BPM, genres {:?}, energy {}",
        descriptor.bpm_min,
        descriptor.bpm_max,
        descriptor.genres,
        descriptor.target_energy
    );

    let tracks = state
        .aggregator
        .search(&token, &descriptor, req.limit)
        .await
        .map_err(|e| e.during("Failed to search tracks"))?;

    Ok(Json(TracksResponse { tracks }))
}

async fn create_playlist(
    State(state): State<Arc<AppState>>,
    bearer: BearerToken,
    body: std::result::Result<Json<CreatePlaylistRequest>, JsonRejection>,
) -> Result<Json<CreatePlaylistResponse>> {
    let req = bearer.json_body(body)?;
    let token = bearer.resolve(req.access_token.clone())?;

    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let playlist = publish_playlist(state.catalog.as_ref(), &token, req.name.trim(), &req.track_uris)
        .await
        .map_err(|e| e.during("Failed to create playlist"))?;

    Ok(Json(CreatePlaylistResponse {
        success: true,
        playlist,
    }))
}

async fn me(State(state): State<Arc<AppState>>, bearer: BearerToken) -> Result<Json<UserProfile>> {
    let token = bearer.resolve(None)?;

    let user = state
        .catalog
        .current_user(&token)
        .await
        .map_err(|e| e.during("Failed to load profile"))?;

    Ok(Json(UserProfile {
        id: user.id,
        display_name: user.display_name,
    }))
}
