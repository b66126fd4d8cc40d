use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::models::{CommentRecord, SongRef, UserRef};
use crate::fetcher::Aggregate;
use crate::resources::{SongId, UserId};

/// All comments written by one user.
#[derive(Clone, Debug)]
pub struct UserComments {
    pub user: UserRef,
    pub comments: Vec<Arc<CommentRecord>>,
    pub comments_by_song: HashMap<SongId, Vec<Arc<CommentRecord>>>,
}

/// All comments posted on one song.
#[derive(Clone, Debug)]
pub struct SongComments {
    pub song: SongRef,
    pub comments: Vec<Arc<CommentRecord>>,
    pub comments_by_user: HashMap<UserId, Vec<Arc<CommentRecord>>>,
}

/// Bidirectional comment index.
///
/// Each added comment is stored once in `all_comments`, once in its user's
/// bucket (and that bucket's per-song list) and once in its song's bucket
/// (and that bucket's per-user list). Lookups for unknown ids return empty
/// results.
#[derive(Clone, Debug, Default)]
pub struct CommentIndex {
    all_comments: Vec<Arc<CommentRecord>>,
    users: HashMap<UserId, UserComments>,
    songs: HashMap<SongId, SongComments>,
}

impl CommentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_comments<I: IntoIterator<Item = CommentRecord>>(&mut self, batch: I) {
        for comment in batch {
            let comment = Arc::new(comment);
            let user_id = comment.user.id;
            let song_id = comment.song.song_id;

            self.all_comments.push(comment.clone());

            let user_bucket = self.users.entry(user_id).or_insert_with(|| UserComments {
                user: comment.user.clone(),
                comments: Vec::new(),
                comments_by_song: HashMap::new(),
            });
            user_bucket.comments.push(comment.clone());
            user_bucket
                .comments_by_song
                .entry(song_id)
                .or_default()
                .push(comment.clone());

            let song_bucket = self.songs.entry(song_id).or_insert_with(|| SongComments {
                song: comment.song.clone(),
                comments: Vec::new(),
                comments_by_user: HashMap::new(),
            });
            song_bucket.comments.push(comment.clone());
            song_bucket
                .comments_by_user
                .entry(user_id)
                .or_default()
                .push(comment);
        }
    }

    /// Drops every comment and bucket.
    pub fn clear(&mut self) {
        self.all_comments.clear();
        self.users.clear();
        self.songs.clear();
    }

    pub fn all_comments(&self) -> &[Arc<CommentRecord>] {
        &self.all_comments
    }

    pub fn len(&self) -> usize {
        self.all_comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_comments.is_empty()
    }

    pub fn user(&self, user_id: UserId) -> Option<&UserComments> {
        self.users.get(&user_id)
    }

    pub fn song(&self, song_id: SongId) -> Option<&SongComments> {
        self.songs.get(&song_id)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn comments_by_user(&self, user_id: UserId) -> &[Arc<CommentRecord>] {
        self.users
            .get(&user_id)
            .map(|bucket| bucket.comments.as_slice())
            .unwrap_or(&[])
    }

    pub fn comments_by_song(&self, song_id: SongId) -> &[Arc<CommentRecord>] {
        self.songs
            .get(&song_id)
            .map(|bucket| bucket.comments.as_slice())
            .unwrap_or(&[])
    }

    pub fn user_comments_on_song(&self, user_id: UserId, song_id: SongId) -> &[Arc<CommentRecord>] {
        self.users
            .get(&user_id)
            .and_then(|bucket| bucket.comments_by_song.get(&song_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct users who commented on `song_id`, in order of their first comment.
    pub fn commenters_on_song(&self, song_id: SongId) -> Vec<&UserRef> {
        let mut seen = HashSet::new();
        self.comments_by_song(song_id)
            .iter()
            .filter(|c| seen.insert(c.user.id))
            .map(|c| &c.user)
            .collect()
    }

    /// Distinct songs `user_id` commented on, in order of their first comment.
    pub fn songs_commented_by_user(&self, user_id: UserId) -> Vec<&SongRef> {
        let mut seen = HashSet::new();
        self.comments_by_user(user_id)
            .iter()
            .filter(|c| seen.insert(c.song.song_id))
            .map(|c| &c.song)
            .collect()
    }

    /// Checks that user buckets, song buckets and cross-maps all hold the
    /// same number of comments as `all_comments`.
    pub fn is_consistent(&self) -> bool {
        let total = self.all_comments.len();
        let by_user: usize = self.users.values().map(|b| b.comments.len()).sum();
        let by_song: usize = self.songs.values().map(|b| b.comments.len()).sum();
        let user_cross: usize = self
            .users
            .values()
            .flat_map(|b| b.comments_by_song.values())
            .map(Vec::len)
            .sum();
        let song_cross: usize = self
            .songs
            .values()
            .flat_map(|b| b.comments_by_user.values())
            .map(Vec::len)
            .sum();

        by_user == total && by_song == total && user_cross == total && song_cross == total
    }
}

impl Aggregate<CommentRecord> for CommentIndex {
    fn extend_page(&mut self, items: Vec<CommentRecord>) {
        self.add_comments(items);
    }
}
