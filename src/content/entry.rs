//! Content entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::CompiledBody;

/// The kinds of content the site publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Project,
    BlogPost,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Project, ContentType::BlogPost];

    /// Directory under the content root holding this type
    pub fn dir_name(&self) -> &'static str {
        match self {
            ContentType::Project => "projects",
            ContentType::BlogPost => "blog",
        }
    }

    /// URL prefix of entry pages
    pub fn route(&self) -> &'static str {
        match self {
            ContentType::Project => "/projects",
            ContentType::BlogPost => "/blog",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Project => "project",
            ContentType::BlogPost => "post",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" | "projects" => Ok(ContentType::Project),
            "post" | "posts" | "blog" => Ok(ContentType::BlogPost),
            other => Err(format!(
                "Unknown content type: {}. Available: project, post",
                other
            )),
        }
    }
}

/// A project or blog post with metadata and compiled body
#[derive(Debug, Clone, Serialize)]
pub struct ContentEntry {
    /// URL-safe identity, unique per content type
    pub slug: String,

    #[serde(rename = "type")]
    pub content_type: ContentType,

    pub title: String,

    pub summary: String,

    pub category: String,

    pub tags: Vec<String>,

    /// Publication date
    pub published_at: DateTime<Utc>,

    /// Last updated date
    pub updated_at: Option<DateTime<Utc>>,

    /// Project role, e.g. "Design & Development"
    pub role: Option<String>,

    pub emoji: Option<String>,

    /// Project domains shown next to the category
    pub domain: Vec<String>,

    /// Raw body (after front-matter)
    #[serde(skip)]
    pub raw: String,

    /// Compiled body
    pub compiled: CompiledBody,

    /// Source file path (relative to the content root)
    pub source: String,

    #[serde(skip)]
    pub full_source: PathBuf,

    /// URL path, e.g. `/blog/hello-world`
    pub path: String,

    /// Full permalink URL
    pub permalink: String,

    /// Custom front-matter fields
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl ContentEntry {
    /// Rendered HTML of the body
    pub fn render(&self) -> &str {
        self.compiled.render()
    }

    pub fn banner_images(&self) -> &[String] {
        self.compiled.banner_images()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Metadata-only view of an entry used in listings
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary<'a> {
    pub slug: &'a str,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: &'a str,
    pub summary: &'a str,
    pub category: &'a str,
    pub tags: &'a [String],
    pub domain: &'a [String],
    pub published_at: DateTime<Utc>,
    pub path: &'a str,
    pub banner_images: &'a [String],
    pub reading_time: usize,
}

impl<'a> From<&'a ContentEntry> for EntrySummary<'a> {
    fn from(entry: &'a ContentEntry) -> Self {
        Self {
            slug: &entry.slug,
            content_type: entry.content_type,
            title: &entry.title,
            summary: &entry.summary,
            category: &entry.category,
            tags: &entry.tags,
            domain: &entry.domain,
            published_at: entry.published_at,
            path: &entry.path,
            banner_images: entry.compiled.banner_images(),
            reading_time: entry.compiled.reading_time(),
        }
    }
}
