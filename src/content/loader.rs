//! Content loader - reads and compiles entries from the content directory

use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

use super::repository::RepositoryError;
use super::{BundleError, Bundler, ContentEntry, ContentType, FrontMatter, ParseError};
use crate::helpers::{full_url_for, url_for};
use crate::Folio;

/// Why a single file was left out of the repository
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("entry is not published")]
    Draft,
}

/// Loads content entries from the content directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
    bundler: Bundler,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Self {
        let bundler = Bundler::new(&folio.config.highlight);
        Self { folio, bundler }
    }

    /// Load all entries of one type, in file-name order.
    ///
    /// Files that fail to parse or compile are logged and skipped. Only a
    /// directory that cannot be enumerated is an error.
    pub fn load(&self, content_type: ContentType) -> Result<Vec<ContentEntry>, RepositoryError> {
        let dir = self.folio.content_dir.join(content_type.dir_name());
        if !dir.exists() {
            tracing::debug!("No {} directory at {:?}", content_type, dir);
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();

        for entry in WalkDir::new(&dir).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(RepositoryError::Io {
                        path: dir,
                        source: e
                            .into_io_error()
                            .unwrap_or_else(|| io::Error::other("filesystem loop")),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable path in {:?}: {}", dir, e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !is_content_file(path) {
                continue;
            }

            match self.load_entry(content_type, path) {
                Ok(content) => {
                    tracing::debug!("Loaded {} {:?} from {:?}", content_type, content.slug, path);
                    entries.push(content);
                }
                Err(EntryError::Draft) => {
                    tracing::debug!("Skipping unpublished {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to load {} {:?}: {}", content_type, path, e);
                }
            }
        }

        Ok(entries)
    }

    /// Load a single entry from a file
    pub fn load_entry(
        &self,
        content_type: ContentType,
        path: &Path,
    ) -> Result<ContentEntry, EntryError> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        if !fm.published && !self.folio.config.render_drafts {
            return Err(EntryError::Draft);
        }

        let compiled = self.bundler.bundle(body, &fm)?;

        let file_modified = fs::metadata(path)?
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);
        let published_at = fm
            .parse_published()?
            .unwrap_or_else(|| file_modified.unwrap_or_else(Utc::now));
        let updated_at = fm.parse_updated()?;

        let source = path
            .strip_prefix(&self.folio.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        // validate() has already checked both fields are present
        let title = fm.display_title().unwrap_or_default().to_string();
        let slug = fm.slug.as_deref().unwrap_or_default().trim().to_string();

        let route = format!("{}/{}", content_type.route(), slug);
        let path_url = url_for(&self.folio.config, &route);
        let permalink = full_url_for(&self.folio.config, &route);

        Ok(ContentEntry {
            slug,
            content_type,
            title,
            summary: fm.summary.unwrap_or_default(),
            category: fm.category.unwrap_or_default(),
            tags: fm.tags,
            published_at,
            updated_at,
            role: fm.role,
            emoji: fm.emoji,
            domain: fm.domain,
            raw: body.to_string(),
            compiled,
            source,
            full_source: path.to_path_buf(),
            path: path_url,
            permalink,
            extra: fm.extra,
        })
    }
}

/// Check if a file is a markdown/MDX file
fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "md" | "mdx" | "markdown"))
        .unwrap_or(false)
}
