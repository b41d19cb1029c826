pub mod artist;
pub mod ids;
pub mod playlist;
pub mod track;

pub use artist::{ArtistInfo, ArtistProfile, ArtistRef, UNKNOWN_GENRE};
pub use ids::{AlbumId, ArtistId, PlaylistId};
pub use playlist::{
    PlaylistReport, PlaylistSummary, TrackFailure, DEFAULT_PLAYLIST_NAME, PLACEHOLDER_COVER,
};
pub use track::{ArtworkSet, LyricsRef, LyricsSource, TrackRecord, PLACEHOLDER_ARTIST_IMAGE};
