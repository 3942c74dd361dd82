//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::{ContentRepository, ContentType};
use crate::helpers::short_date;
use crate::Folio;

/// List site content by kind
pub fn run(folio: &Folio, kind: &str) -> Result<()> {
    let repository = ContentRepository::load(folio)?;
    print!("{}", render(&repository, kind)?);
    Ok(())
}

/// Format a listing of entries, tags or categories
pub fn render(repository: &ContentRepository, kind: &str) -> Result<String> {
    let mut out = String::new();

    match kind {
        "tag" | "tags" | "category" | "categories" => {
            let is_tags = kind.starts_with("tag");
            let label = if is_tags { "Tags" } else { "Categories" };
            for content_type in ContentType::ALL {
                let counts = if is_tags {
                    repository.tags(content_type)
                } else {
                    repository.categories(content_type)
                };
                writeln!(out, "{} in {}s ({}):", label, content_type, counts.len())?;
                for (name, count) in counts {
                    writeln!(out, "  {} ({})", name, count)?;
                }
            }
        }
        other => {
            let content_type: ContentType = other.parse().map_err(anyhow::Error::msg)?;
            let entries = repository.list(content_type);
            let heading = match content_type {
                ContentType::Project => "Projects",
                ContentType::BlogPost => "Posts",
            };
            writeln!(out, "{} ({}):", heading, entries.len())?;
            for entry in entries {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    short_date(&entry.published_at),
                    entry.title,
                    entry.source
                )?;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::entry;

    fn repo() -> ContentRepository {
        ContentRepository::from_entries(vec![
            entry(ContentType::Project, "alpha", "2023-01-01"),
            entry(ContentType::Project, "beta", "2023-06-01"),
        ])
    }

    #[test]
    fn test_list_projects() {
        let out = render(&repo(), "projects").unwrap();
        assert_eq!(
            out,
            "Projects (2):\n  2023-06-01 - Title beta [projects/beta.mdx]\n  2023-01-01 - Title alpha [projects/alpha.mdx]\n"
        );
    }

    #[test]
    fn test_list_tags() {
        let out = render(&repo(), "tags").unwrap();
        assert!(out.contains("Tags in projects (1):\n  rust (2)\n"));
        assert!(out.contains("Tags in posts (0):\n"));
    }

    #[test]
    fn test_unknown_kind() {
        assert!(render(&repo(), "pages").is_err());
    }
}
