pub mod auth;
pub mod middleware;
pub mod playlists;

pub use auth::auth_routes;
pub use playlists::playlist_routes;
