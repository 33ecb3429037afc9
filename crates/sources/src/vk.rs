use std::time::Duration;

use lr_core::record::{OwnerId, PostId};
use lr_core::RawRecord;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::response::{group_description, items, parse_envelope};
use crate::{DataSource, FetchError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VkConfig {
    pub endpoint: String,
    pub api_version: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub timeout_secs: u64,
}

impl Default for VkConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.vk.com/method/".to_string(),
            api_version: "5.131".to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Blocking client for the VK wall and groups methods.
pub struct VkSource {
    cfg: VkConfig,
    client: Client,
}

impl VkSource {
    pub fn new(cfg: VkConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self { cfg, client })
    }

    fn call(&self, method: &str, params: &[(&str, String)]) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}{}", self.cfg.endpoint, method);
        debug!(%method, "calling api");
        let body = self
            .client
            .get(&url)
            .query(&[
                ("access_token", self.cfg.token.as_str()),
                ("v", self.cfg.api_version.as_str()),
            ])
            .query(params)
            .send()?
            .error_for_status()?
            .text()?;
        parse_envelope(&body)
    }
}

impl DataSource for VkSource {
    fn fetch_batch(&self, collection: &str, count: u32) -> Result<Vec<RawRecord>, FetchError> {
        let response = self.call(
            "wall.get",
            &[("domain", collection.to_string()), ("count", count.to_string())],
        )?;
        let posts = items(response)?;
        info!(%collection, posts = posts.len(), "fetched wall batch");
        Ok(posts)
    }

    fn fetch_nested(
        &self,
        parent_id: PostId,
        owner_id: OwnerId,
        desired_count: u32,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let response = self.call(
            "wall.getComments",
            &[
                ("post_id", parent_id.to_string()),
                ("owner_id", owner_id.to_string()),
                ("need_likes", "1".to_string()),
                ("count", desired_count.to_string()),
            ],
        )?;
        let comments = items(response)?;
        debug!(post_id = parent_id, owner_id, comments = comments.len(), "fetched comments");
        Ok(comments)
    }

    fn fetch_description(&self, collection: &str) -> Result<String, FetchError> {
        let response = self.call(
            "groups.getById",
            &[
                ("group_id", collection.to_string()),
                ("fields", "description".to_string()),
            ],
        )?;
        group_description(&response)
    }
}
