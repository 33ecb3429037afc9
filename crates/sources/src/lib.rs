//! Data sources feeding the ranking walk: the VK HTTP API and offline snapshots.

use lr_core::record::{OwnerId, PostId};
use lr_core::RawRecord;

pub mod response;
pub mod snapshot;
pub mod vk;

pub use snapshot::SnapshotSource;
pub use vk::{VkConfig, VkSource};

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("not available from this source: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// True when the failure happened below the API, on the network.
    pub fn is_connectivity(&self) -> bool {
        match self {
            FetchError::Transport(err) => err.is_connect() || err.is_timeout() || err.is_request(),
            _ => false,
        }
    }
}

/// A remote collection of posts, each carrying its own comment collection.
///
/// Every call is one request: there is no paging and no retrying. Any error is
/// terminal for the caller's run.
pub trait DataSource {
    /// Up to `count` of the most recent posts of `collection` (a community
    /// short name), in source order.
    fn fetch_batch(&self, collection: &str, count: u32) -> Result<Vec<RawRecord>, FetchError>;

    /// Comments of one post, in the order the source returns them.
    fn fetch_nested(
        &self,
        parent_id: PostId,
        owner_id: OwnerId,
        desired_count: u32,
    ) -> Result<Vec<RawRecord>, FetchError>;

    /// Free-text description of the community.
    fn fetch_description(&self, collection: &str) -> Result<String, FetchError>;
}

impl<S: DataSource + ?Sized> DataSource for &S {
    fn fetch_batch(&self, collection: &str, count: u32) -> Result<Vec<RawRecord>, FetchError> {
        (**self).fetch_batch(collection, count)
    }

    fn fetch_nested(
        &self,
        parent_id: PostId,
        owner_id: OwnerId,
        desired_count: u32,
    ) -> Result<Vec<RawRecord>, FetchError> {
        (**self).fetch_nested(parent_id, owner_id, desired_count)
    }

    fn fetch_description(&self, collection: &str) -> Result<String, FetchError> {
        (**self).fetch_description(collection)
    }
}
