//! Follower counts for the configured social profiles
//!
//! Lookups go to the external service on every call. Any failure is logged
//! and reported as an unknown count so the page can show a placeholder.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ProfileKind, SiteConfig};
use crate::helpers::encode_query;

/// Why a follower lookup failed
#[derive(Error, Debug)]
pub enum FollowerError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("follower count missing from response")]
    MissingCount,
}

/// Follower count of one profile, `None` when it could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Followers {
    pub user: Option<String>,
    pub followers: Option<u64>,
}

/// Client for Medium's public profile endpoint
#[derive(Debug, Clone)]
pub struct MediumClient {
    http: reqwest::Client,
    base_url: String,
}

impl MediumClient {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the follower count of a Medium user
    pub async fn followers(&self, user: &str) -> Result<u64, FollowerError> {
        let url = format!("{}/@{}?format=json", self.base_url, encode_query(user));
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_followers(&body)
    }

    /// Fetch the follower count, degrading to an unknown count on failure
    pub async fn lookup(&self, user: Option<&str>) -> Followers {
        let Some(user) = user else {
            return Followers {
                user: None,
                followers: None,
            };
        };

        let followers = match self.followers(user).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!("Failed to fetch Medium followers for {}: {}", user, e);
                None
            }
        };

        Followers {
            user: Some(user.to_string()),
            followers,
        }
    }
}

/// Medium user name of the first Medium profile
pub fn medium_user(config: &SiteConfig) -> Option<&str> {
    config
        .profile(ProfileKind::Medium)
        .and_then(|profile| profile.kind.username(&profile.to))
}

/// Parse a `?format=json` profile response.
///
/// The body starts with a `])}while(1);</x>` guard before the JSON object.
fn parse_followers(body: &str) -> Result<u64, FollowerError> {
    let start = body.find('{').ok_or(FollowerError::MissingCount)?;
    let value: serde_json::Value = serde_json::from_str(&body[start..])?;

    let user_id = value
        .pointer("/payload/user/userId")
        .and_then(|v| v.as_str())
        .ok_or(FollowerError::MissingCount)?;

    value
        .pointer(&format!(
            "/payload/references/SocialStats/{}/usersFollowedByCount",
            user_id
        ))
        .and_then(|v| v.as_u64())
        .ok_or(FollowerError::MissingCount)
}
