//! Content repository - the loaded set of projects and blog posts

use indexmap::IndexMap;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::loader::ContentLoader;
use super::{ContentEntry, ContentType};
use crate::Folio;

/// Repository-level failures
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Cannot read content directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No {content_type} with slug {slug:?}")]
    NotFound {
        content_type: ContentType,
        slug: String,
    },
}

/// All entries of one pipeline run, keyed by slug per content type.
///
/// Built once and never mutated; a new run builds a new repository.
#[derive(Debug, Clone, Default)]
pub struct ContentRepository {
    projects: IndexMap<String, ContentEntry>,
    posts: IndexMap<String, ContentEntry>,
}

impl ContentRepository {
    /// Scan the content directory and build the repository
    pub fn load(folio: &Folio) -> Result<Self, RepositoryError> {
        let root = &folio.content_dir;
        let metadata = std::fs::metadata(root).map_err(|source| RepositoryError::Io {
            path: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(RepositoryError::Io {
                path: root.clone(),
                source: io::Error::other("not a directory"),
            });
        }

        let loader = ContentLoader::new(folio);
        let mut entries = Vec::new();
        for content_type in ContentType::ALL {
            entries.extend(loader.load(content_type)?);
        }

        let repository = Self::from_entries(entries);
        tracing::info!(
            "Loaded {} projects and {} posts",
            repository.len(ContentType::Project),
            repository.len(ContentType::BlogPost)
        );
        Ok(repository)
    }

    /// Build a repository from already loaded entries.
    ///
    /// A slug may only be used once per content type: the first entry keeps
    /// it and later duplicates are dropped with a warning.
    pub fn from_entries(entries: impl IntoIterator<Item = ContentEntry>) -> Self {
        let mut repository = Self::default();
        for entry in entries {
            let map = repository.map_mut(entry.content_type);
            if let Some(existing) = map.get(&entry.slug) {
                tracing::warn!(
                    "Duplicate {} slug {:?} in {:?}, already used by {:?}; skipping",
                    entry.content_type,
                    entry.slug,
                    entry.source,
                    existing.source
                );
                continue;
            }
            map.insert(entry.slug.clone(), entry);
        }
        repository
    }

    fn map(&self, content_type: ContentType) -> &IndexMap<String, ContentEntry> {
        match content_type {
            ContentType::Project => &self.projects,
            ContentType::BlogPost => &self.posts,
        }
    }

    fn map_mut(&mut self, content_type: ContentType) -> &mut IndexMap<String, ContentEntry> {
        match content_type {
            ContentType::Project => &mut self.projects,
            ContentType::BlogPost => &mut self.posts,
        }
    }

    /// Entries in load order
    pub fn iter(&self, content_type: ContentType) -> impl Iterator<Item = &ContentEntry> {
        self.map(content_type).values()
    }

    /// Entries sorted by publication date, newest first (ties by slug)
    pub fn list(&self, content_type: ContentType) -> Vec<&ContentEntry> {
        let mut entries: Vec<_> = self.iter(content_type).collect();
        entries.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        entries
    }

    /// Look up an entry by slug
    pub fn get(
        &self,
        content_type: ContentType,
        slug: &str,
    ) -> Result<&ContentEntry, RepositoryError> {
        self.map(content_type)
            .get(slug)
            .ok_or_else(|| RepositoryError::NotFound {
                content_type,
                slug: slug.to_string(),
            })
    }

    /// Entries matching a predicate, in listing order
    pub fn filter<F>(&self, content_type: ContentType, predicate: F) -> Vec<&ContentEntry>
    where
        F: Fn(&ContentEntry) -> bool,
    {
        self.list(content_type)
            .into_iter()
            .filter(|&entry| predicate(entry))
            .collect()
    }

    /// Entries whose slug is one of `slugs`, in listing order
    pub fn select(&self, content_type: ContentType, slugs: &[String]) -> Vec<&ContentEntry> {
        self.filter(content_type, |entry| slugs.contains(&entry.slug))
    }

    /// The `n` most recent entries
    pub fn latest(&self, content_type: ContentType, n: usize) -> Vec<&ContentEntry> {
        let mut entries = self.list(content_type);
        entries.truncate(n);
        entries
    }

    /// Tag usage counts, most used first
    pub fn tags(&self, content_type: ContentType) -> Vec<(String, usize)> {
        count_values(self.iter(content_type).flat_map(|e| e.tags.iter()))
    }

    /// Category usage counts, most used first
    pub fn categories(&self, content_type: ContentType) -> Vec<(String, usize)> {
        count_values(
            self.iter(content_type)
                .map(|e| &e.category)
                .filter(|c| !c.is_empty()),
        )
    }

    pub fn len(&self, content_type: ContentType) -> usize {
        self.map(content_type).len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.posts.is_empty()
    }
}

fn count_values<'a>(values: impl Iterator<Item = &'a String>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    let mut counts: Vec<_> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    counts.sort_by_key(|(name, count)| (Reverse(*count), name.clone()));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::test_util::write;
    use std::fs;

    fn project(slug: &str, date: &str, tags: &str) -> String {
        format!(
            "---\nname: Project {slug}\nslug: {slug}\ncategory: Web\ntags: [{tags}]\npublishedAt: {date}\n---\nAbout {slug}.\n"
        )
    }

    fn site() -> (tempfile::TempDir, Folio) {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "content/projects/a.mdx", &project("alpha", "2023-01-01", "rust, cli"));
        write(tmp.path(), "content/projects/b.mdx", &project("beta", "2023-06-01", "rust"));
        write(
            tmp.path(),
            "content/blog/first.md",
            "---\ntitle: First\nslug: first\npublishedAt: 2022-03-04\n---\nHi\n",
        );
        let folio = Folio::with_config(tmp.path(), SiteConfig::default());
        (tmp, folio)
    }

    #[test]
    fn test_list_sorted_newest_first() {
        let (_tmp, folio) = site();
        let repo = ContentRepository::load(&folio).unwrap();

        let slugs: Vec<_> = repo
            .list(ContentType::Project)
            .iter()
            .map(|e| e.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["beta", "alpha"]);

        let listing = repo.list(ContentType::Project);
        for pair in listing.windows(2) {
            assert!(pair[0].published_at >= pair[1].published_at);
        }
        assert_eq!(repo.len(ContentType::BlogPost), 1);
    }

    #[test]
    fn test_metadata_matches_source() {
        let (_tmp, folio) = site();
        let repo = ContentRepository::load(&folio).unwrap();
        let alpha = repo.get(ContentType::Project, "alpha").unwrap();
        assert_eq!(alpha.title, "Project alpha");
        assert_eq!(alpha.tags, vec!["rust", "cli"]);
        assert_eq!(alpha.category, "Web");
    }

    #[test]
    fn test_get_not_found() {
        let (_tmp, folio) = site();
        let repo = ContentRepository::load(&folio).unwrap();
        let err = repo.get(ContentType::BlogPost, "alpha").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_malformed_entry_skipped() {
        let (tmp, folio) = site();
        write(tmp.path(), "content/projects/c.mdx", "---\nname: No Slug\n---\n");
        write(
            tmp.path(),
            "content/projects/d.mdx",
            "---\nname: Bad Export\nslug: bad-export\n---\nexport const bannerImages = [\n",
        );
        let repo = ContentRepository::load(&folio).unwrap();
        assert_eq!(repo.len(ContentType::Project), 2);
        assert!(repo.get(ContentType::Project, "bad-export").is_err());
    }

    #[test]
    fn test_duplicate_slug_first_wins() {
        let (tmp, folio) = site();
        write(tmp.path(), "content/projects/z.mdx", &project("alpha", "2024-01-01", "go"));
        let repo = ContentRepository::load(&folio).unwrap();
        assert_eq!(repo.len(ContentType::Project), 2);
        let alpha = repo.get(ContentType::Project, "alpha").unwrap();
        assert_eq!(alpha.source, "projects/a.mdx");
    }

    #[test]
    fn test_same_slug_across_types_allowed() {
        let (tmp, folio) = site();
        write(
            tmp.path(),
            "content/blog/alpha.md",
            "---\ntitle: Alpha notes\nslug: alpha\n---\n",
        );
        let repo = ContentRepository::load(&folio).unwrap();
        assert!(repo.get(ContentType::Project, "alpha").is_ok());
        assert!(repo.get(ContentType::BlogPost, "alpha").is_ok());
    }

    #[test]
    fn test_load_is_idempotent() {
        let (_tmp, folio) = site();
        let first = ContentRepository::load(&folio).unwrap();
        let second = ContentRepository::load(&folio).unwrap();
        for content_type in ContentType::ALL {
            let a: Vec<_> = first
                .list(content_type)
                .iter()
                .map(|e| (e.slug.clone(), e.content_type))
                .collect();
            let b: Vec<_> = second
                .list(content_type)
                .iter()
                .map(|e| (e.slug.clone(), e.content_type))
                .collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_filter_select_latest() {
        let (_tmp, folio) = site();
        let repo = ContentRepository::load(&folio).unwrap();

        let cli = repo.filter(ContentType::Project, |e| e.has_tag("CLI"));
        assert_eq!(cli.len(), 1);
        assert_eq!(cli[0].slug, "alpha");

        let featured = repo.select(
            ContentType::Project,
            &["alpha".to_string(), "missing".to_string()],
        );
        assert_eq!(featured.len(), 1);

        let latest = repo.latest(ContentType::Project, 1);
        assert_eq!(latest[0].slug, "beta");
        assert_eq!(repo.latest(ContentType::Project, 10).len(), 2);
    }

    #[test]
    fn test_tag_and_category_counts() {
        let (_tmp, folio) = site();
        let repo = ContentRepository::load(&folio).unwrap();
        assert_eq!(
            repo.tags(ContentType::Project),
            vec![("rust".to_string(), 2), ("cli".to_string(), 1)]
        );
        assert_eq!(
            repo.categories(ContentType::Project),
            vec![("Web".to_string(), 2)]
        );
        assert!(repo.categories(ContentType::BlogPost).is_empty());
    }

    #[test]
    fn test_missing_content_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(tmp.path(), SiteConfig::default());
        let err = ContentRepository::load(&folio).unwrap_err();
        assert!(matches!(err, RepositoryError::Io { .. }));
    }

    #[test]
    fn test_empty_content_root() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("content")).unwrap();
        let folio = Folio::with_config(tmp.path(), SiteConfig::default());
        let repo = ContentRepository::load(&folio).unwrap();
        assert!(repo.is_empty());
    }
}
