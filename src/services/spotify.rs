use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

/// Upper bound on ids per audio-features call and URIs per add-items call
pub const SPOTIFY_BATCH_LIMIT: usize = 100;
/// Upper bound on `limit` for the recommendations endpoint
pub const MAX_RECOMMENDATIONS: usize = 100;
/// Combined track + genre seeds accepted by the recommendations endpoint
pub const MAX_SEEDS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: SpotifyAlbum,
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub tempo: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    tracks: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct AudioFeaturesResponse {
    audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub seed_tracks: Vec<String>,
    pub seed_genres: Vec<String>,
    pub target_tempo: f64,
    pub min_tempo: i32,
    pub max_tempo: i32,
    pub target_energy: f64,
    pub limit: usize,
}

impl RecommendationRequest {
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.seed_tracks.is_empty() {
            params.push(("seed_tracks", self.seed_tracks.join(",")));
        }
        if !self.seed_genres.is_empty() {
            params.push(("seed_genres", self.seed_genres.join(",")));
        }
        params.push(("target_tempo", self.target_tempo.to_string()));
        params.push(("min_tempo", self.min_tempo.to_string()));
        params.push(("max_tempo", self.max_tempo.to_string()));
        params.push(("target_energy", self.target_energy.to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }
}

/// The slice of the Spotify Web API this service relies on.
/// All calls are authenticated with the user's bearer token.
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    async fn top_tracks(&self, token: &str, limit: usize) -> Result<Vec<SpotifyTrack>>;

    async fn recommendations(
        &self,
        token: &str,
        request: &RecommendationRequest,
    ) -> Result<Vec<SpotifyTrack>>;

    /// One entry per requested id, in request order; `None` where Spotify has no analysis.
    async fn audio_features(&self, token: &str, ids: &[String])
        -> Result<Vec<Option<AudioFeatures>>>;

    async fn current_user(&self, token: &str) -> Result<SpotifyUser>;

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<SpotifyPlaylist>;

    async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    base_url: String,
    client: Client,
}

impl SpotifyClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Spotify(format!("{} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Spotify API error on {}: {} - {}", what, status, body);
            return Err(AppError::Spotify(format!(
                "{} returned status: {} - {}",
                what, status, body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Spotify(format!("Failed to read {} response: {}", what, e)))?;

        serde_json::from_str(&text).map_err(|e| {
            AppError::Spotify(format!(
                "Failed to parse {} response: {} - Response: {}",
                what,
                e,
                snippet(&text)
            ))
        })
    }
}

/// First 200 characters of a response body, for error messages.
fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}

#[async_trait]
impl MusicCatalog for SpotifyClient {
    async fn top_tracks(&self, token: &str, limit: usize) -> Result<Vec<SpotifyTrack>> {
        let request = self
            .client
            .get(self.url("me/top/tracks"))
            .bearer_auth(token)
            .query(&[("limit", limit.to_string()), ("time_range", "medium_term".to_string())]);

        let page: Paging<SpotifyTrack> = self.send(request, "top tracks").await?;
        tracing::debug!("Fetched {} top tracks", page.items.len());
        Ok(page.items)
    }

    async fn recommendations(
        &self,
        token: &str,
        request: &RecommendationRequest,
    ) -> Result<Vec<SpotifyTrack>> {
        tracing::debug!("Requesting recommendations: {:?}", request);

        let http = self
            .client
            .get(self.url("recommendations"))
            .bearer_auth(token)
            .query(&request.query_params());

        let response: RecommendationsResponse = self.send(http, "recommendations").await?;
        Ok(response.tracks)
    }

    async fn audio_features(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>> {
        let mut features = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(SPOTIFY_BATCH_LIMIT) {
            let request = self
                .client
                .get(self.url("audio-features"))
                .bearer_auth(token)
                .query(&[("ids", chunk.join(","))]);

            let response: AudioFeaturesResponse = self.send(request, "audio features").await?;
            features.extend(response.audio_features);
        }

        Ok(features)
    }

    async fn current_user(&self, token: &str) -> Result<SpotifyUser> {
        let request = self.client.get(self.url("me")).bearer_auth(token);
        self.send(request, "current user").await
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<SpotifyPlaylist> {
        let request = self
            .client
            .post(self.url(&format!("users/{}/playlists", user_id)))
            .bearer_auth(token)
            .json(&json!({
                "name": name,
                "description": description,
                "public": public,
            }));

        self.send(request, "create playlist").await
    }

    async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        let request = self
            .client
            .post(self.url(&format!("playlists/{}/tracks", playlist_id)))
            .bearer_auth(token)
            .json(&json!({ "uris": uris }));

        // Only the snapshot id comes back
        let _snapshot: serde_json::Value = self.send(request, "add tracks").await?;
        Ok(())
    }
}
