//! JSON Feed 1.1 serialization

use anyhow::Result;
use serde::Serialize;

use super::{absolutize_urls, banner_url, Feed};
use crate::helpers::date_xml;

const VERSION: &str = "https://jsonfeed.org/version/1.1";

#[derive(Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: &'a str,
    home_page_url: &'a str,
    feed_url: &'a str,
    description: &'a str,
    icon: &'a str,
    favicon: &'a str,
    language: &'a str,
    authors: Vec<JsonAuthor<'a>>,
    items: Vec<JsonItem<'a>>,
}

#[derive(Serialize)]
struct JsonAuthor<'a> {
    name: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct JsonItem<'a> {
    id: &'a str,
    url: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    summary: &'a str,
    content_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    date_published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_modified: Option<String>,
    tags: &'a [String],
}

/// Render a feed as a JSON Feed document
pub fn to_json(feed: &Feed) -> Result<String> {
    let base = feed.link.trim_end_matches('/');

    let items = feed
        .items
        .iter()
        .map(|entry| JsonItem {
            id: &entry.permalink,
            url: &entry.permalink,
            title: &entry.title,
            summary: &entry.summary,
            content_html: absolutize_urls(entry.render(), base),
            image: banner_url(entry, base),
            date_published: date_xml(&entry.published_at),
            date_modified: entry.updated_at.as_ref().map(date_xml),
            tags: &entry.tags,
        })
        .collect();

    let document = JsonFeed {
        version: VERSION,
        title: &feed.title,
        home_page_url: &feed.link,
        feed_url: &feed.json_link,
        description: &feed.description,
        icon: &feed.image,
        favicon: &feed.favicon,
        language: &feed.language,
        authors: vec![JsonAuthor {
            name: &feed.author.name,
            url: &feed.author.link,
        }],
        items,
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{folio, now};
    use super::super::FeedGenerator;
    use super::*;
    use crate::content::{ContentRepository, ContentType};
    use crate::test_util::entry;

    #[test]
    fn test_json_feed_document() {
        let folio = folio();
        let repo = ContentRepository::from_entries(vec![entry(
            ContentType::BlogPost,
            "hello",
            "2023-06-01",
        )]);
        let json = to_json(&FeedGenerator::with_now(&folio, now()).build(&repo)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], VERSION);
        assert_eq!(value["title"], "Abdul Jaseem's Blog");
        assert_eq!(value["feed_url"], "https://drak.tbag.life/rss.json");
        assert_eq!(value["authors"][0]["name"], "Abdul Jaseem");

        let item = &value["items"][0];
        assert_eq!(item["id"], "https://example.com/blog/hello");
        assert_eq!(item["date_published"], "2023-06-01T00:00:00.000+00:00");
        assert_eq!(item["tags"][0], "rust");
        assert!(item.get("date_modified").is_none());
        assert!(item.get("image").is_none());
    }
}
