//! A user's per-song votes, reduced into a map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::models::{RawVote, SongId};
use crate::fetcher::Aggregate;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "UPVOTE",
            VoteType::Downvote => "DOWNVOTE",
        }
    }
}

/// One vote, as normalized from the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteEntry {
    pub song_id: Option<SongId>,
    pub vote_type: Option<VoteType>,
}

pub fn normalize_vote(raw: RawVote) -> VoteEntry {
    VoteEntry {
        song_id: raw.song_id.or_else(|| raw.song.and_then(|s| s.resolved_id())),
        vote_type: raw.vote_type.or(raw.legacy_type),
    }
}

/// `song_id -> vote` for one user. A `None` value means the API reported the
/// song with no active vote.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VotesState {
    votes: HashMap<SongId, Option<VoteType>>,
}

impl VotesState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies entries in order; later entries for the same song win.
    pub fn extend<I: IntoIterator<Item = VoteEntry>>(&mut self, entries: I) {
        for entry in entries {
            match entry.song_id {
                Some(song_id) => {
                    self.votes.insert(song_id, entry.vote_type);
                }
                None => tracing::debug!("Skipping vote without a song id"),
            }
        }
    }

    /// The active vote on `song_id`, if any.
    pub fn vote_for(&self, song_id: SongId) -> Option<VoteType> {
        self.votes.get(&song_id).copied().flatten()
    }

    pub fn contains(&self, song_id: SongId) -> bool {
        self.votes.contains_key(&song_id)
    }

    /// Records a local change, e.g. after casting or removing a vote.
    pub fn set(&mut self, song_id: SongId, vote: Option<VoteType>) {
        self.votes.insert(song_id, vote);
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<SongId, Option<VoteType>> {
        &self.votes
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }
}

impl Aggregate<VoteEntry> for VotesState {
    fn extend_page(&mut self, items: Vec<VoteEntry>) {
        self.extend(items);
    }
}

/// Reduces a flat vote list into a `VotesState`.
pub fn votes_to_map<I: IntoIterator<Item = VoteEntry>>(entries: I) -> VotesState {
    let mut state = VotesState::new();
    state.extend(entries);
    state
}
