pub mod aggregator;
pub mod auth;
pub mod normalizer;
pub mod playlists;
pub mod prompt_parser;
pub mod spotify;

pub use aggregator::TrackAggregator;
pub use auth::SpotifyAuth;
pub use prompt_parser::{ClaudeClient, LanguageModel, PromptInterpreter};
pub use spotify::{MusicCatalog, SpotifyClient};
