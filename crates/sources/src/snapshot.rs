//! An offline data source read from a JSON document.
//!
//! ```json
//! {
//!   "posts": { "<community>": [ { "id": 1, "owner_id": -7, ... } ] },
//!   "comments": { "-7_1": [ { "text": "...", "likes": { "count": 3 } } ] },
//!   "descriptions": { "<community>": "..." }
//! }
//! ```
//!
//! Comment lists are keyed `<owner_id>_<post_id>`, the way VK spells post ids.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use lr_core::record::{OwnerId, PostId};
use lr_core::RawRecord;
use serde::{Deserialize, Serialize};

use crate::{DataSource, FetchError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSource {
    posts: HashMap<String, Vec<RawRecord>>,
    comments: HashMap<String, Vec<RawRecord>>,
    descriptions: HashMap<String, String>,
}

impl SnapshotSource {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FetchError> {
        serde_json::from_reader(reader)
            .map_err(|e| FetchError::Malformed(format!("snapshot: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| FetchError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn with_posts(mut self, collection: &str, posts: Vec<RawRecord>) -> Self {
        self.posts.insert(collection.to_string(), posts);
        self
    }

    pub fn with_comments(mut self, owner_id: OwnerId, post_id: PostId, comments: Vec<RawRecord>) -> Self {
        self.comments.insert(comment_key(owner_id, post_id), comments);
        self
    }

    pub fn with_description(mut self, collection: &str, description: &str) -> Self {
        self.descriptions
            .insert(collection.to_string(), description.to_string());
        self
    }
}

fn comment_key(owner_id: OwnerId, post_id: PostId) -> String {
    format!("{owner_id}_{post_id}")
}

impl DataSource for SnapshotSource {
    fn fetch_batch(&self, collection: &str, count: u32) -> Result<Vec<RawRecord>, FetchError> {
        let posts = self
            .posts
            .get(collection)
            .ok_or_else(|| FetchError::Unavailable(format!("no posts for `{collection}`")))?;
        Ok(posts.iter().take(count as usize).cloned().collect())
    }

    fn fetch_nested(
        &self,
        parent_id: PostId,
        owner_id: OwnerId,
        desired_count: u32,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let key = comment_key(owner_id, parent_id);
        match self.comments.get(&key) {
            Some(comments) => Ok(comments.iter().take(desired_count as usize).cloned().collect()),
            // A post nobody commented on has no entry.
            None if desired_count == 0 => Ok(Vec::new()),
            None => Err(FetchError::Unavailable(format!("no comments for post `{key}`"))),
        }
    }

    fn fetch_description(&self, collection: &str) -> Result<String, FetchError> {
        self.descriptions
            .get(collection)
            .cloned()
            .ok_or_else(|| FetchError::Unavailable(format!("no description for `{collection}`")))
    }
}
