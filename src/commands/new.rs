//! Create a new project or blog post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::ContentType;
use crate::Folio;

/// Create a new content file and return its path
pub fn create_entry(
    folio: &Folio,
    title: &str,
    content_type: ContentType,
    slug: Option<&str>,
) -> Result<PathBuf> {
    let now = chrono::Utc::now();
    let slug = slug
        .map(str::to_string)
        .unwrap_or_else(|| slug::slugify(title));
    if slug.is_empty() || slug::slugify(&slug) != slug {
        anyhow::bail!("Slug is not URL-safe: {:?}", slug);
    }

    let target_dir = folio.content_dir.join(content_type.dir_name());
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.mdx", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let date = now.format("%Y-%m-%d").to_string();
    let title = yaml_string(title);
    let content = match content_type {
        ContentType::Project => format!(
            r#"---
name: {title}
slug: {slug}
summary: ''
category: ''
role: ''
domain: []
publishedAt: {date}
---

export const bannerImages = [];

"#
        ),
        ContentType::BlogPost => format!(
            r#"---
title: {title}
slug: {slug}
summary: ''
category: ''
tags: []
publishedAt: {date}
---

"#
        ),
    };

    fs::write(&file_path, content)?;
    tracing::info!("Created {} {:?}", content_type, file_path);

    Ok(file_path)
}

/// Quote a value for a single-line YAML scalar
fn yaml_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
