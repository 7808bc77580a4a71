pub mod criteria;
pub mod playlist;
pub mod track;

pub use criteria::{Criteria, EnergyLevel, QueryDescriptor, TempoHint};
pub use playlist::{
    CreatePlaylistRequest, CreatePlaylistResponse, ParsePromptRequest, ParsePromptResponse,
    PlaylistInfo, SearchByBpmRequest, SearchByCriteriaRequest, UserProfile,
};
pub use track::{Track, TracksResponse};
