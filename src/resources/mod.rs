//! Catalog resources: their raw shapes, envelope shapes and normalizers.
//!
//! Each resource is a zero-sized marker implementing [`Resource`], which ties
//! the wire type to its flat record and to the way its endpoint wraps pages.

mod models;
mod normalize;
mod votes;

pub use models::*;
pub use normalize::*;
pub use votes::{normalize_vote, votes_to_map, VoteEntry, VoteType, VotesState};

use serde::de::DeserializeOwned;

use crate::comments::{normalize_comment, CommentRecord};
use crate::fetcher::EnvelopeShape;

/// A paginated API resource.
pub trait Resource: Send + Sync + 'static {
    /// Item type inside the page envelope.
    type Raw: DeserializeOwned + Send;
    /// Flat record handed to the aggregate.
    type Record: Send + 'static;

    /// Used in log messages.
    const NAME: &'static str;
    const ENVELOPE: EnvelopeShape = EnvelopeShape::Plain;

    fn normalize(raw: Self::Raw) -> Self::Record;
}

macro_rules! resource {
    ($marker:ident, $name:literal, $raw:ty, $record:ty, $normalize:path) => {
        resource!($marker, $name, $raw, $record, $normalize, EnvelopeShape::Plain);
    };
    ($marker:ident, $name:literal, $raw:ty, $record:ty, $normalize:path, $envelope:expr) => {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $marker;

        impl Resource for $marker {
            type Raw = $raw;
            type Record = $record;
            const NAME: &'static str = $name;
            const ENVELOPE: EnvelopeShape = $envelope;

            fn normalize(raw: Self::Raw) -> Self::Record {
                $normalize(raw)
            }
        }
    };
}

resource!(Songs, "songs", RawSong, SongRecord, normalize_song);
resource!(Artists, "artists", RawArtist, ArtistRecord, normalize_artist);
resource!(Genres, "genres", RawGenre, GenreRecord, normalize_genre);
resource!(Tribes, "tribes", RawTribe, TribeRecord, normalize_tribe);
resource!(Countries, "countries", RawCountry, CountryRecord, normalize_country);
resource!(Users, "users", RawUser, UserRecord, normalize_user);
resource!(Comments, "comments", CommentRecord, CommentRecord, normalize_comment);
resource!(
    Votes,
    "votes",
    RawVote,
    VoteEntry,
    normalize_vote,
    EnvelopeShape::Data
);
resource!(
    FavoriteSongs,
    "favorites",
    RawFavorite,
    FavoriteSongRecord,
    normalize_favorite,
    EnvelopeShape::Body
);
