//! Feed generation - RSS 2.0 and JSON Feed documents

mod json;
mod rss;

use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use std::fs;

use crate::content::{ContentEntry, ContentRepository, ContentType};
use crate::helpers::full_url_for;
use crate::Folio;

pub use json::to_json;
pub use rss::to_rss;

/// Output file of the RSS document, relative to the public directory
pub const RSS_FILE: &str = "rss.xml";
/// Output file of the JSON Feed document
pub const JSON_FILE: &str = "rss.json";

/// Feed author
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
    pub link: String,
}

/// Channel-level feed data shared by both output formats
#[derive(Debug, Clone)]
pub struct Feed<'a> {
    pub title: String,
    pub description: String,
    pub id: String,
    pub link: String,
    pub language: String,
    pub image: String,
    pub favicon: String,
    pub copyright: String,
    pub updated: DateTime<Utc>,
    pub rss_link: String,
    pub json_link: String,
    pub author: Author,
    pub items: Vec<&'a ContentEntry>,
}

/// Builds feeds from a repository
pub struct FeedGenerator<'a> {
    folio: &'a Folio,
    now: DateTime<Utc>,
}

impl<'a> FeedGenerator<'a> {
    pub fn new(folio: &'a Folio) -> Self {
        Self::with_now(folio, Utc::now())
    }

    /// Use a fixed generation time
    pub fn with_now(folio: &'a Folio, now: DateTime<Utc>) -> Self {
        Self { folio, now }
    }

    /// Collect the channel data and the newest entries
    pub fn build<'r>(&self, repository: &'r ContentRepository) -> Feed<'r> {
        let config = &self.folio.config;
        let base_url = full_url_for(config, "/");
        let base = base_url.trim_end_matches('/');

        let mut items = repository.list(ContentType::BlogPost);
        if config.feed.include_projects {
            items.extend(repository.list(ContentType::Project));
            items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        }
        items.truncate(config.feed.limit);

        Feed {
            title: config
                .feed
                .title
                .clone()
                .unwrap_or_else(|| format!("{}'s Blog", config.author)),
            description: config
                .feed
                .description
                .clone()
                .unwrap_or_else(|| config.description.clone()),
            id: base_url.clone(),
            link: base_url.clone(),
            language: config.language.clone(),
            image: format!("{}/favicon.ico", base),
            favicon: format!("{}/favicon.ico", base),
            copyright: format!(
                "All rights reserved {}, {}",
                self.now.year(),
                config.author
            ),
            updated: self.now,
            rss_link: format!("{}/{}", base, RSS_FILE),
            json_link: format!("{}/{}", base, JSON_FILE),
            author: Author {
                name: config.author.clone(),
                email: config.email().map(str::to_string),
                link: base_url.clone(),
            },
            items,
        }
    }

    /// Write `rss.xml` and `rss.json` into the public directory
    pub fn write(&self, repository: &ContentRepository) -> Result<()> {
        let feed = self.build(repository);
        fs::create_dir_all(&self.folio.public_dir)?;

        tracing::info!("Writing {} in public directory...", RSS_FILE);
        fs::write(self.folio.public_dir.join(RSS_FILE), to_rss(&feed))?;

        tracing::info!("Writing {} in public directory...", JSON_FILE);
        fs::write(self.folio.public_dir.join(JSON_FILE), to_json(&feed)?)?;

        tracing::info!("Generated feeds with {} items", feed.items.len());
        Ok(())
    }
}

/// Convert root-relative URLs in HTML content to absolute URLs
fn absolutize_urls(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Absolute URL of an entry's first banner image
fn banner_url(entry: &ContentEntry, base_url: &str) -> Option<String> {
    entry.banner_images().first().map(|image| {
        if image.starts_with("http://") || image.starts_with("https://") {
            image.clone()
        } else {
            format!("{}/{}", base_url, image.trim_start_matches('/'))
        }
    })
}
