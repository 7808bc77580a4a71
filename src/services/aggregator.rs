use crate::error::Result;
use crate::models::{QueryDescriptor, Track};
use crate::services::spotify::{
    AudioFeatures, MusicCatalog, RecommendationRequest, SpotifyTrack, MAX_RECOMMENDATIONS,
    MAX_SEEDS,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Candidates requested per track the caller asked for
const OVERFETCH_FACTOR: usize = 3;

/// Finds tempo-matched tracks: recommendations, then tempo lookup, then filtering.
pub struct TrackAggregator {
    catalog: Arc<dyn MusicCatalog>,
}

impl TrackAggregator {
    pub fn new(catalog: Arc<dyn MusicCatalog>) -> Self {
        Self { catalog }
    }

    /// Seed ids from the user's medium-term top tracks.
    pub async fn seed_track_ids(&self, token: &str) -> Result<Vec<String>> {
        let top = self.catalog.top_tracks(token, MAX_SEEDS).await?;
        Ok(top.into_iter().take(MAX_SEEDS).map(|t| t.id).collect())
    }

    /// Seed from the user's top tracks, then aggregate.
    pub async fn search(
        &self,
        token: &str,
        descriptor: &QueryDescriptor,
        limit: usize,
    ) -> Result<Vec<Track>> {
        let seeds = self.seed_track_ids(token).await?;
        self.aggregate(token, descriptor, &seeds, limit).await
    }

    pub async fn aggregate(
        &self,
        token: &str,
        descriptor: &QueryDescriptor,
        seeds: &[String],
        limit: usize,
    ) -> Result<Vec<Track>> {
        let request = build_request(descriptor, seeds, limit);
        let candidates = self.catalog.recommendations(token, &request).await?;

        info!(
            "Got {} recommendation candidates for {}-{} BPM",
            candidates.len(),
            descriptor.bpm_min,
            descriptor.bpm_max
        );

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = candidates.iter().map(|t| t.id.clone()).collect();
        let features = self.catalog.audio_features(token, &ids).await?;

        let tracks: Vec<Track> = join_tempos(candidates, &features)
            .into_iter()
            .filter(|t| t.tempo_within(descriptor.bpm_min, descriptor.bpm_max))
            .take(limit)
            .collect();

        debug!("{} tracks left after tempo filtering", tracks.len());

        Ok(tracks)
    }
}

fn build_request(descriptor: &QueryDescriptor, seeds: &[String], limit: usize) -> RecommendationRequest {
    // A genre seed takes one of the five seed slots
    let (seed_genres, track_slots) = match descriptor.genres.first() {
        Some(genre) => (vec![genre_seed(genre)], MAX_SEEDS - 1),
        None => (Vec::new(), MAX_SEEDS),
    };

    RecommendationRequest {
        seed_tracks: seeds.iter().take(track_slots).cloned().collect(),
        seed_genres,
        target_tempo: descriptor.target_tempo(),
        min_tempo: descriptor.bpm_min,
        max_tempo: descriptor.bpm_max,
        target_energy: descriptor.target_energy,
        limit: (limit * OVERFETCH_FACTOR).clamp(1, MAX_RECOMMENDATIONS),
    }
}

/// Spotify genre seeds are lower-case slugs such as "hip-hop".
fn genre_seed(genre: &str) -> String {
    genre
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Pair each candidate with the tempo at the same position in the lookup response.
///
/// Spotify is expected to answer in request order. When the id at a position
/// disagrees, the tempo is looked up by id instead.
fn join_tempos(candidates: Vec<SpotifyTrack>, features: &[Option<AudioFeatures>]) -> Vec<Track> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| {
            let tempo = match features.get(index).and_then(Option::as_ref) {
                Some(f) if f.id == candidate.id => Some(f.tempo),
                Some(f) => {
                    warn!(
                        "Audio features out of order at {}: expected {}, got {}",
                        index, candidate.id, f.id
                    );
                    tempo_by_id(features, &candidate.id)
                }
                None => None,
            };
            to_track(candidate, tempo)
        })
        .collect()
}

fn tempo_by_id(features: &[Option<AudioFeatures>], id: &str) -> Option<f64> {
    features
        .iter()
        .flatten()
        .find(|f| f.id == id)
        .map(|f| f.tempo)
}

fn to_track(track: SpotifyTrack, tempo: Option<f64>) -> Track {
    Track {
        artists: track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        image: track.album.images.into_iter().next().map(|i| i.url),
        bpm: tempo.filter(|t| t.is_finite()).map(|t| t.round() as i32),
        id: track.id,
        name: track.name,
        album: track.album.name,
        uri: track.uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::spotify::{
        SpotifyAlbum, SpotifyArtist, SpotifyImage, SpotifyPlaylist, SpotifyUser,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn spotify_track(id: &str) -> SpotifyTrack {
        SpotifyTrack {
            id: id.to_string(),
            name: format!("Song {}", id),
            artists: vec![
                SpotifyArtist { name: "First".to_string() },
                SpotifyArtist { name: "Second".to_string() },
            ],
            album: SpotifyAlbum {
                name: "Album".to_string(),
                images: vec![SpotifyImage { url: format!("https://img.test/{}", id) }],
            },
            uri: format!("spotify:track:{}", id),
        }
    }

    fn features(id: &str, tempo: f64) -> Option<AudioFeatures> {
        Some(AudioFeatures { id: id.to_string(), tempo })
    }

    #[derive(Default)]
    struct FakeCatalog {
        candidates: Vec<SpotifyTrack>,
        features: Vec<Option<AudioFeatures>>,
        fail_features: bool,
        recommendation_requests: Mutex<Vec<RecommendationRequest>>,
        feature_calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl MusicCatalog for FakeCatalog {
        async fn top_tracks(&self, _token: &str, limit: usize) -> Result<Vec<SpotifyTrack>> {
            Ok((0..limit + 2).map(|i| spotify_track(&format!("top{}", i))).collect())
        }

        async fn recommendations(
            &self,
            _token: &str,
            request: &RecommendationRequest,
        ) -> Result<Vec<SpotifyTrack>> {
            self.recommendation_requests.lock().unwrap().push(request.clone());
            Ok(self.candidates.clone())
        }

        async fn audio_features(
            &self,
            _token: &str,
            ids: &[String],
        ) -> Result<Vec<Option<AudioFeatures>>> {
            self.feature_calls.lock().unwrap().push(ids.to_vec());
            if self.fail_features {
                return Err(AppError::Spotify("500 Internal Server Error".into()));
            }
            Ok(self.features.clone())
        }

        async fn current_user(&self, _token: &str) -> Result<SpotifyUser> {
            unimplemented!()
        }

        async fn create_playlist(
            &self,
            _token: &str,
            _user_id: &str,
            _name: &str,
            _description: &str,
            _public: bool,
        ) -> Result<SpotifyPlaylist> {
            unimplemented!()
        }

        async fn add_tracks(&self, _token: &str, _playlist_id: &str, _uris: &[String]) -> Result<()> {
            unimplemented!()
        }
    }

    fn catalog_with_tempos(tempos: &[f64]) -> FakeCatalog {
        let ids: Vec<String> = (0..tempos.len()).map(|i| format!("c{}", i)).collect();
        FakeCatalog {
            candidates: ids.iter().map(|id| spotify_track(id)).collect(),
            features: ids.iter().zip(tempos).map(|(id, t)| features(id, *t)).collect(),
            ..Default::default()
        }
    }

    fn seeds(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("seed{}", i)).collect()
    }

    #[tokio::test]
    async fn test_filters_out_of_range_tempos() {
        let catalog = Arc::new(catalog_with_tempos(&[150.0, 139.0, 160.0, 161.0, 145.0, 152.0]));
        let aggregator = TrackAggregator::new(catalog.clone());
        let descriptor = QueryDescriptor::from_range(140, 160);

        let tracks = aggregator
            .aggregate("token", &descriptor, &seeds(5), 10)
            .await
            .unwrap();

        let bpms: Vec<i32> = tracks.iter().filter_map(|t| t.bpm).collect();
        assert_eq!(bpms, vec![150, 160, 145, 152]);
        assert!(!bpms.contains(&139));
        assert!(!bpms.contains(&161));
        assert!(tracks.len() <= 10);
    }

    #[tokio::test]
    async fn test_truncates_to_limit_in_upstream_order() {
        let catalog = Arc::new(catalog_with_tempos(&[120.0; 12]));
        let aggregator = TrackAggregator::new(catalog.clone());
        let descriptor = QueryDescriptor::from_range(100, 140);

        let tracks = aggregator
            .aggregate("token", &descriptor, &seeds(5), 4)
            .await
            .unwrap();

        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn test_empty_recommendations_skip_tempo_lookup() {
        let catalog = Arc::new(FakeCatalog::default());
        let aggregator = TrackAggregator::new(catalog.clone());

        let tracks = aggregator
            .aggregate("token", &QueryDescriptor::from_range(140, 160), &seeds(5), 10)
            .await
            .unwrap();

        assert!(tracks.is_empty());
        assert_eq!(catalog.recommendation_requests.lock().unwrap().len(), 1);
        assert!(catalog.feature_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_features_drop_candidate() {
        let mut catalog = catalog_with_tempos(&[150.0, 150.0, 150.0]);
        catalog.features[1] = None;
        catalog.features.truncate(2);
        let catalog = Arc::new(catalog);
        let aggregator = TrackAggregator::new(catalog.clone());

        let tracks = aggregator
            .aggregate("token", &QueryDescriptor::from_range(140, 160), &seeds(1), 10)
            .await
            .unwrap();

        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c0"]);
        assert!(tracks.iter().all(|t| t.bpm.is_some()));
    }

    #[tokio::test]
    async fn test_tempo_lookup_uses_candidate_ids() {
        let catalog = Arc::new(catalog_with_tempos(&[150.0, 151.0]));
        let aggregator = TrackAggregator::new(catalog.clone());

        aggregator
            .aggregate("token", &QueryDescriptor::from_range(140, 160), &seeds(5), 10)
            .await
            .unwrap();

        let calls = catalog.feature_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec!["c0".to_string(), "c1".to_string()]);
    }

    #[tokio::test]
    async fn test_reordered_features_matched_by_id() {
        let mut catalog = catalog_with_tempos(&[150.0, 170.0]);
        catalog.features.swap(0, 1);
        let catalog = Arc::new(catalog);
        let aggregator = TrackAggregator::new(catalog.clone());

        let tracks = aggregator
            .aggregate("token", &QueryDescriptor::from_range(140, 160), &seeds(5), 10)
            .await
            .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "c0");
        assert_eq!(tracks[0].bpm, Some(150));
    }

    #[tokio::test]
    async fn test_tempo_lookup_failure_is_an_error() {
        let mut catalog = catalog_with_tempos(&[150.0]);
        catalog.fail_features = true;
        let aggregator = TrackAggregator::new(Arc::new(catalog));

        let result = aggregator
            .aggregate("token", &QueryDescriptor::from_range(140, 160), &seeds(5), 10)
            .await;

        assert!(matches!(result, Err(AppError::Spotify(_))));
    }

    #[tokio::test]
    async fn test_request_overfetches_and_targets_midpoint() {
        let catalog = Arc::new(FakeCatalog::default());
        let aggregator = TrackAggregator::new(catalog.clone());

        aggregator
            .aggregate("token", &QueryDescriptor::from_range(118, 138), &seeds(5), 10)
            .await
            .unwrap();
        aggregator
            .aggregate("token", &QueryDescriptor::from_range(118, 138), &seeds(5), 50)
            .await
            .unwrap();

        let requests = catalog.recommendation_requests.lock().unwrap();
        assert_eq!(requests[0].limit, 30);
        assert_eq!(requests[0].target_tempo, 128.0);
        assert_eq!((requests[0].min_tempo, requests[0].max_tempo), (118, 138));
        assert_eq!(requests[0].seed_tracks.len(), 5);
        assert!(requests[0].seed_genres.is_empty());
        assert_eq!(requests[1].limit, MAX_RECOMMENDATIONS);
    }

    #[tokio::test]
    async fn test_genre_takes_a_seed_slot() {
        let catalog = Arc::new(FakeCatalog::default());
        let aggregator = TrackAggregator::new(catalog.clone());
        let mut descriptor = QueryDescriptor::from_range(160, 180);
        descriptor.genres = vec!["Drum and Bass".to_string(), "jungle".to_string()];

        aggregator
            .aggregate("token", &descriptor, &seeds(5), 10)
            .await
            .unwrap();

        let requests = catalog.recommendation_requests.lock().unwrap();
        assert_eq!(requests[0].seed_genres, vec!["drum-and-bass".to_string()]);
        assert_eq!(requests[0].seed_tracks.len(), 4);
        assert!(requests[0].seed_tracks.len() + requests[0].seed_genres.len() <= MAX_SEEDS);
    }

    #[tokio::test]
    async fn test_search_seeds_from_top_tracks() {
        let catalog = Arc::new(FakeCatalog::default());
        let aggregator = TrackAggregator::new(catalog.clone());

        aggregator
            .search("token", &QueryDescriptor::from_range(100, 140), 10)
            .await
            .unwrap();

        let requests = catalog.recommendation_requests.lock().unwrap();
        assert_eq!(
            requests[0].seed_tracks,
            vec!["top0", "top1", "top2", "top3", "top4"]
        );
    }

    #[test]
    fn test_track_conversion() {
        let track = to_track(spotify_track("x"), Some(127.5));
        assert_eq!(track.artists, "First, Second");
        assert_eq!(track.album, "Album");
        assert_eq!(track.image.as_deref(), Some("https://img.test/x"));
        assert_eq!(track.bpm, Some(128));
    }
}
