use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{RecordError, Score};

pub type PostId = i64;
pub type OwnerId = i64;

/// A post or comment exactly as the data source returned it.
///
/// Fields are read lazily so that a record missing an optional field (the
/// likes block on a deleted comment, say) can still be ranked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Builds a record from a JSON value, `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// `likes.count`, or `None` when any part of the path is absent or not an integer.
    pub fn likes_count(&self) -> Option<Score> {
        self.0
            .get("likes")
            .and_then(|likes| likes.get("count"))
            .and_then(Value::as_i64)
    }

    pub fn text(&self) -> Result<&str, RecordError> {
        self.required("text")?
            .as_str()
            .ok_or(RecordError::WrongType { field: "text", expected: "string" })
    }

    pub fn id(&self) -> Result<PostId, RecordError> {
        self.required_i64("id")
    }

    pub fn owner_id(&self) -> Result<OwnerId, RecordError> {
        self.required_i64("owner_id")
    }

    /// `comments.count` of a post: how many comments to request for it.
    pub fn comments_count(&self) -> Result<u32, RecordError> {
        let count = self
            .required("comments")?
            .get("count")
            .ok_or(RecordError::MissingField("comments.count"))?;
        count
            .as_u64()
            .and_then(|c| u32::try_from(c).ok())
            .ok_or(RecordError::WrongType {
                field: "comments.count",
                expected: "non-negative integer",
            })
    }

    fn required(&self, field: &'static str) -> Result<&Value, RecordError> {
        self.0.get(field).ok_or(RecordError::MissingField(field))
    }

    fn required_i64(&self, field: &'static str) -> Result<i64, RecordError> {
        self.required(field)?
            .as_i64()
            .ok_or(RecordError::WrongType { field, expected: "integer" })
    }
}
