//! Generator module - serializes the repository into the public directory

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::content::{ContentEntry, ContentRepository, ContentType, EntrySummary};
use crate::feed::FeedGenerator;
use crate::helpers::tweet_url;
use crate::Folio;

/// Directory below the public directory holding the JSON content indexes
pub const CONTENT_OUTPUT_DIR: &str = "content";

/// A full entry document, as served for a single page
#[derive(Debug, Serialize)]
pub struct EntryDocument<'a> {
    #[serde(flatten)]
    pub summary: EntrySummary<'a>,
    pub html: &'a str,
    pub excerpt: Option<&'a str>,
    pub updated_at: Option<String>,
    pub role: Option<&'a str>,
    pub emoji: Option<&'a str>,
    pub permalink: &'a str,
    pub share_url: String,
}

impl<'a> EntryDocument<'a> {
    pub fn new(entry: &'a ContentEntry, folio: &Folio) -> Self {
        Self {
            summary: EntrySummary::from(entry),
            html: entry.render(),
            excerpt: entry.compiled.excerpt(),
            updated_at: entry.updated_at.map(|d| d.to_rfc3339()),
            role: entry.role.as_deref(),
            emoji: entry.emoji.as_deref(),
            permalink: &entry.permalink,
            share_url: tweet_url(entry, &folio.config),
        }
    }
}

/// Listing document for one content type
#[derive(Debug, Serialize)]
pub struct IndexDocument<'a> {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub count: usize,
    /// Entries featured on the home page, in listing order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub featured: Vec<&'a str>,
    pub entries: Vec<EntrySummary<'a>>,
}

impl<'a> IndexDocument<'a> {
    pub fn new(
        repository: &'a ContentRepository,
        content_type: ContentType,
        folio: &Folio,
    ) -> Self {
        let entries: Vec<EntrySummary> = repository
            .list(content_type)
            .into_iter()
            .map(EntrySummary::from)
            .collect();

        let featured = match content_type {
            ContentType::Project => repository
                .select(content_type, &folio.config.latest_projects)
                .into_iter()
                .map(|e| e.slug.as_str())
                .collect(),
            ContentType::BlogPost => Vec::new(),
        };

        Self {
            content_type,
            count: entries.len(),
            featured,
            entries,
        }
    }
}

/// Writes the static output of a pipeline run
pub struct Generator {
    folio: Folio,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Self {
        Self {
            folio: folio.clone(),
        }
    }

    /// Generate all output files
    pub fn generate(&self, repository: &ContentRepository) -> Result<()> {
        fs::create_dir_all(&self.folio.public_dir)?;

        for content_type in ContentType::ALL {
            self.generate_index(repository, content_type)?;
            self.generate_entries(repository, content_type)?;
        }

        if self.folio.config.feed.enable {
            FeedGenerator::new(&self.folio).write(repository)?;
        }

        Ok(())
    }

    fn content_dir(&self) -> PathBuf {
        self.folio.public_dir.join(CONTENT_OUTPUT_DIR)
    }

    /// Write `content/<type>.json`
    fn generate_index(
        &self,
        repository: &ContentRepository,
        content_type: ContentType,
    ) -> Result<()> {
        let dir = self.content_dir();
        fs::create_dir_all(&dir)?;

        let index = IndexDocument::new(repository, content_type, &self.folio);
        let output_path = dir.join(format!("{}.json", content_type.dir_name()));
        fs::write(&output_path, serde_json::to_string_pretty(&index)?)?;
        tracing::info!("Generated {:?} ({} entries)", output_path, index.count);

        Ok(())
    }

    /// Write `content/<type>/<slug>.json` for every entry
    fn generate_entries(
        &self,
        repository: &ContentRepository,
        content_type: ContentType,
    ) -> Result<()> {
        let dir = self.content_dir().join(content_type.dir_name());
        if dir.exists() {
            // Stale documents of removed entries must not survive a run
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;

        for entry in repository.iter(content_type) {
            let document = EntryDocument::new(entry, &self.folio);
            let output_path = dir.join(format!("{}.json", entry.slug));
            fs::write(&output_path, serde_json::to_string_pretty(&document)?)?;
            tracing::debug!("Generated {:?}", output_path);
        }

        Ok(())
    }
}
