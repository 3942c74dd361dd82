//! RSS 2.0 serialization

use super::{absolutize_urls, banner_url, Feed};
use crate::helpers::date_rfc822;

/// Render a feed as an RSS 2.0 document
pub fn to_rss(feed: &Feed) -> String {
    let base = feed.link.trim_end_matches('/');

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push('\n');
    xml.push_str(
        r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:content="http://purl.org/rss/1.0/modules/content/">"#,
    );
    xml.push('\n');
    xml.push_str("  <channel>\n");
    push_element(&mut xml, 4, "title", &feed.title);
    push_element(&mut xml, 4, "link", &feed.link);
    push_element(&mut xml, 4, "description", &feed.description);
    push_element(&mut xml, 4, "lastBuildDate", &date_rfc822(&feed.updated));
    push_element(&mut xml, 4, "docs", "https://validator.w3.org/feed/docs/rss2.html");
    push_element(&mut xml, 4, "generator", "folio");
    if !feed.language.is_empty() {
        push_element(&mut xml, 4, "language", &feed.language);
    }
    xml.push_str("    <image>\n");
    push_element(&mut xml, 6, "title", &feed.title);
    push_element(&mut xml, 6, "url", &feed.image);
    push_element(&mut xml, 6, "link", &feed.link);
    xml.push_str("    </image>\n");
    push_element(&mut xml, 4, "copyright", &feed.copyright);
    if let Some(email) = &feed.author.email {
        push_element(
            &mut xml,
            4,
            "managingEditor",
            &format!("{} ({})", email, feed.author.name),
        );
    }
    xml.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        escape_xml(&feed.rss_link)
    ));

    for entry in &feed.items {
        xml.push_str("    <item>\n");
        push_element(&mut xml, 6, "title", &entry.title);
        push_element(&mut xml, 6, "link", &entry.permalink);
        xml.push_str(&format!(
            "      <guid isPermaLink=\"true\">{}</guid>\n",
            escape_xml(&entry.permalink)
        ));
        push_element(&mut xml, 6, "pubDate", &date_rfc822(&entry.published_at));
        if !entry.summary.is_empty() {
            push_element(&mut xml, 6, "description", &entry.summary);
        }
        let content = absolutize_urls(entry.render(), base);
        xml.push_str(&format!(
            "      <content:encoded>{}</content:encoded>\n",
            cdata(&content)
        ));
        for tag in &entry.tags {
            push_element(&mut xml, 6, "category", tag);
        }
        if let Some(image) = banner_url(entry, base) {
            xml.push_str(&format!(
                "      <enclosure url=\"{}\" length=\"0\" type=\"{}\"/>\n",
                escape_xml(&image),
                image_mime(&image)
            ));
        }
        xml.push_str("    </item>\n");
    }

    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");
    xml
}

fn push_element(xml: &mut String, indent: usize, name: &str, value: &str) {
    xml.push_str(&format!(
        "{:indent$}<{name}>{}</{name}>\n",
        "",
        escape_xml(value),
        indent = indent,
        name = name
    ));
}

/// Wrap text in a CDATA section, splitting any embedded terminator
fn cdata(s: &str) -> String {
    let clean = strip_invalid_xml_chars(s);
    format!("<![CDATA[{}]]>", clean.replace("]]>", "]]]]><![CDATA[>"))
}

fn image_mime(url: &str) -> &'static str {
    let ext = url.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    strip_invalid_xml_chars(s)
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip invalid XML control characters (except tab, newline, carriage return)
/// XML 1.0 only allows: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::tests::{folio, now};
    use super::super::FeedGenerator;
    use super::*;
    use crate::content::{ContentRepository, ContentType};
    use crate::test_util::entry;

    #[test]
    fn test_empty_feed_is_well_formed() {
        let folio = folio();
        let repo = ContentRepository::default();
        let xml = to_rss(&FeedGenerator::with_now(&folio, now()).build(&repo));

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains("<link>https://drak.tbag.life/</link>"));
        assert!(xml.contains("<lastBuildDate>Fri, 01 Mar 2024 12:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains("<copyright>All rights reserved 2024, Abdul Jaseem</copyright>"));
        assert!(xml.contains(r#"<atom:link href="https://drak.tbag.life/rss.xml""#));
        assert!(!xml.contains("<item>"));
        assert!(xml.trim_end().ends_with("</rss>"));
    }

    #[test]
    fn test_item_fields() {
        let folio = folio();
        let mut post = entry(ContentType::BlogPost, "hello", "2023-06-01");
        post.title = "Rust & <MDX>".to_string();
        let repo = ContentRepository::from_entries(vec![post]);
        let xml = to_rss(&FeedGenerator::with_now(&folio, now()).build(&repo));

        assert!(xml.contains("<title>Rust &amp; &lt;MDX&gt;</title>"));
        assert!(xml.contains("<link>https://example.com/blog/hello</link>"));
        assert!(xml.contains("<pubDate>Thu, 01 Jun 2023 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("<description>Summary of hello</description>"));
        assert!(xml.contains("<category>rust</category>"));
        assert!(xml.contains("<![CDATA[<p>Body of hello.</p>"));
        assert_eq!(xml.matches("<item>").count(), 1);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b < c"), "a &amp; b &lt; c");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }

    #[test]
    fn test_cdata_terminator_split() {
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }
}
