//! Fixtures shared by unit tests

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::HighlightConfig;
use crate::content::{parse_date_string, Bundler, ContentEntry, ContentType, FrontMatter};

/// A Medium `?format=json` profile response with 1234 followers
pub const MEDIUM_PROFILE_RESPONSE: &str = r#"])}while(1);</x>{"success":true,"payload":{"user":{"userId":"8f3","username":"konstantinmuenster"},"references":{"SocialStats":{"8f3":{"userId":"8f3","usersFollowedByCount":1234,"usersFollowedCount":56}}}}}"#;

/// Write a file below `dir`, creating parent directories
pub fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// An in-memory entry with the given identity and publication date
pub fn entry(content_type: ContentType, slug: &str, date: &str) -> ContentEntry {
    let body = format!("Body of {}.", slug);
    let compiled = Bundler::new(&HighlightConfig::default())
        .bundle(&body, &FrontMatter::default())
        .unwrap();
    let path = format!("{}/{}", content_type.route(), slug);

    ContentEntry {
        slug: slug.to_string(),
        content_type,
        title: format!("Title {}", slug),
        summary: format!("Summary of {}", slug),
        category: "General".to_string(),
        tags: vec!["rust".to_string()],
        published_at: parse_date_string(date).unwrap(),
        updated_at: None,
        role: None,
        emoji: None,
        domain: Vec::new(),
        raw: body,
        compiled,
        source: format!("{}/{}.mdx", content_type.dir_name(), slug),
        full_source: PathBuf::new(),
        permalink: format!("https://example.com{}", path),
        path,
        extra: HashMap::new(),
    }
}
