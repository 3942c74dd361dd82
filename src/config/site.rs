//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Writing
    pub render_drafts: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Home page
    /// Slugs of the projects featured on the home page
    #[serde(default)]
    pub latest_projects: Vec<String>,

    #[serde(default)]
    pub social: SocialConfig,

    #[serde(default)]
    pub feed: FeedConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            render_drafts: false,
            highlight: HighlightConfig::default(),

            latest_projects: Vec::new(),
            social: SocialConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Contact e-mail derived from the first `Email` profile
    pub fn email(&self) -> Option<&str> {
        self.social
            .profiles
            .iter()
            .find(|p| p.kind == ProfileKind::Email)
            .map(|p| p.to.trim_start_matches("mailto:"))
    }

    /// First profile of the given kind
    pub fn profile(&self, kind: ProfileKind) -> Option<&Profile> {
        self.social.profiles.iter().find(|p| p.kind == kind)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Social profiles shown in the site header and used for feed metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub twitter_handle: Option<String>,
    pub profiles: Vec<Profile>,
    /// Where follower counts for the Medium profile are looked up
    pub medium_url: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            twitter_handle: None,
            profiles: Vec::new(),
            medium_url: "https://medium.com".to_string(),
        }
    }
}

/// A link to one of the author's profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub to: String,
    pub label: String,
    pub kind: ProfileKind,
}

/// Kind of a social profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    LinkedIn,
    Github,
    Discord,
    Medium,
    Twitter,
    Email,
    Website,
}

impl ProfileKind {
    /// User name embedded in the profile URL, if the service has one
    pub fn username<'a>(&self, to: &'a str) -> Option<&'a str> {
        match self {
            ProfileKind::Medium => to.rsplit('@').next().filter(|u| *u != to),
            ProfileKind::Github | ProfileKind::LinkedIn | ProfileKind::Twitter => to
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|u| !u.is_empty()),
            ProfileKind::Email => Some(to.trim_start_matches("mailto:")),
            ProfileKind::Discord | ProfileKind::Website => None,
        }
    }
}

/// Feed generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub enable: bool,
    /// Feed title, defaults to "<author>'s Blog"
    pub title: Option<String>,
    /// Feed description, defaults to the site description
    pub description: Option<String>,
    pub limit: usize,
    pub include_projects: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: true,
            title: None,
            description: None,
            limit: 20,
            include_projects: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.feed.limit, 20);
        assert_eq!(config.social.medium_url, "https://medium.com");
        assert!(config.email().is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Abdul Jaseem C K
author: Abdul Jaseem
url: https://drak.tbag.life
latest_projects:
  - alpha
  - beta
social:
  twitter_handle: "@kmuenster"
  profiles:
    - to: https://github.com/ajaseem129/
      label: Github
      kind: github
    - to: mailto:someone@example.com
      label: Email
      kind: email
feed:
  limit: 5
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.author, "Abdul Jaseem");
        assert_eq!(config.latest_projects, vec!["alpha", "beta"]);
        assert_eq!(config.email(), Some("someone@example.com"));
        assert_eq!(config.feed.limit, 5);
        assert!(config.feed.enable);

        let github = config.profile(ProfileKind::Github).unwrap();
        assert_eq!(github.kind.username(&github.to), Some("ajaseem129"));
    }

    #[test]
    fn test_medium_username() {
        let kind = ProfileKind::Medium;
        assert_eq!(
            kind.username("https://medium.com/@konstantinmuenster"),
            Some("konstantinmuenster")
        );
        assert_eq!(kind.username("https://medium.com/"), None);
    }
}
