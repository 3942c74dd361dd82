//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;
use crate::content::ContentEntry;

const TWITTER_INTENT: &str = "https://twitter.com/intent/tweet";

/// Characters left as-is in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/blog/hello") // -> "/site/blog/hello"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/projects/alpha") // -> "https://example.com/projects/alpha"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Encode a value for use in a query string
pub fn encode_query(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Twitter share link for an entry: "<title> by <author>" plus its permalink
pub fn tweet_url(entry: &ContentEntry, config: &SiteConfig) -> String {
    let text = format!("{} by {}", entry.title, config.author);
    let mut url = format!(
        "{}?text={}&url={}",
        TWITTER_INTENT,
        encode_query(&text),
        encode_query(&entry.permalink)
    );
    if let Some(handle) = config.social.twitter_handle.as_deref() {
        let handle = handle.trim_start_matches('@');
        if !handle.is_empty() {
            url.push_str("&via=");
            url.push_str(&encode_query(handle));
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentType;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/site/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/blog/hello"), "/site/blog/hello");
        assert_eq!(url_for(&config, ""), "/site/");
        assert_eq!(url_for(&SiteConfig::default(), "rss.xml"), "/rss.xml");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/projects/alpha"),
            "https://example.com/site/projects/alpha"
        );

        let mut trailing = SiteConfig::default();
        trailing.url = "https://example.com/".to_string();
        assert_eq!(full_url_for(&trailing, "/"), "https://example.com/");
    }

    #[test]
    fn test_tweet_url() {
        let mut config = test_config();
        config.author = "Abdul Jaseem".to_string();
        let entry = crate::test_util::entry(ContentType::Project, "alpha", "2023-01-01");

        assert_eq!(
            tweet_url(&entry, &config),
            "https://twitter.com/intent/tweet?text=Title%20alpha%20by%20Abdul%20Jaseem\
             &url=https%3A%2F%2Fexample.com%2Fprojects%2Falpha"
        );

        config.social.twitter_handle = Some("@kmuenster".to_string());
        assert!(tweet_url(&entry, &config).ends_with("&via=kmuenster"));
    }

    #[test]
    fn test_encode_query() {
        assert_eq!(encode_query("a b&c"), "a%20b%26c");
        assert_eq!(
            encode_query("https://x.dev/p-1"),
            "https%3A%2F%2Fx.dev%2Fp-1"
        );
    }
}
