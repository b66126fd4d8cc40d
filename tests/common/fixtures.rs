//! JSON fixtures served by the mock API

use super::constants::*;
use serde_json::{json, Value};

/// `count` songs with ids `1..=count`.
pub fn songs(count: i64) -> Vec<Value> {
    (1..=count)
        .map(|id| {
            json!({
                "songId": id,
                "title": format!("Song {}", id),
                "upvotes": id,
                "artist": { "id": 10, "name": "The Test Band" },
                "genre": { "id": 20, "name": "Highlife" }
            })
        })
        .collect()
}

fn comment(id: i64, user_id: i64, username: &str, song_id: i64, content: &str) -> Value {
    json!({
        "id": id,
        "content": content,
        "createdAt": "2024-03-01T10:00:00Z",
        "user": { "id": user_id, "username": username },
        "song": { "songId": song_id, "title": format!("Song {}", song_id) }
    })
}

/// Five comments by two users over three songs.
pub fn comments() -> Vec<Value> {
    vec![
        comment(1, USER_1_ID, "alice", SONG_1_ID, "  Great track "),
        comment(2, USER_2_ID, "bob", SONG_1_ID, "Agreed"),
        comment(3, USER_1_ID, "alice", SONG_2_ID, "Love the drums"),
        comment(4, USER_1_ID, "alice", SONG_1_ID, "Still on repeat"),
        comment(5, USER_2_ID, "bob", SONG_3_ID, "Meh"),
    ]
}

/// Votes of one user. The later vote on `SONG_1_ID` overrides the first.
pub fn votes() -> Vec<Value> {
    vec![
        json!({ "id": 1, "songId": SONG_1_ID, "voteType": "UPVOTE" }),
        json!({ "id": 2, "song": { "songId": SONG_2_ID }, "voteType": "DOWNVOTE" }),
        json!({ "id": 3, "songId": SONG_3_ID, "voteType": null }),
        json!({ "id": 4, "songId": SONG_1_ID, "voteType": "DOWNVOTE" }),
    ]
}

pub fn favorites() -> Vec<Value> {
    vec![
        json!({
            "id": 7,
            "createdAt": "2024-01-01T00:00:00Z",
            "song": { "songId": SONG_1_ID, "title": "Song 101" }
        }),
        json!({
            "id": 8,
            "createdAt": "2024-01-02T00:00:00Z",
            "song": { "songId": SONG_2_ID, "title": "Song 102" }
        }),
    ]
}
