use crate::error::Result;
use crate::models::PlaylistInfo;
use crate::services::spotify::{MusicCatalog, SPOTIFY_BATCH_LIMIT};
use tracing::info;

pub const PLAYLIST_DESCRIPTION: &str = "Created with BPM Playlist Generator";

/// Create a public playlist in the user's account and fill it with `uris` in order.
pub async fn publish_playlist(
    catalog: &dyn MusicCatalog,
    token: &str,
    name: &str,
    uris: &[String],
) -> Result<PlaylistInfo> {
    let user = catalog.current_user(token).await?;

    let playlist = catalog
        .create_playlist(token, &user.id, name, PLAYLIST_DESCRIPTION, true)
        .await?;

    for chunk in uris.chunks(SPOTIFY_BATCH_LIMIT) {
        catalog.add_tracks(token, &playlist.id, chunk).await?;
    }

    info!(
        "Created playlist '{}' ({}) with {} tracks for {}",
        playlist.name,
        playlist.id,
        uris.len(),
        user.id
    );

    Ok(PlaylistInfo {
        id: playlist.id,
        name: playlist.name,
        url: playlist.external_urls.spotify,
    })
}
