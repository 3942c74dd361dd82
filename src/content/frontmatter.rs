//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use thiserror::Error;

lazy_static! {
    static ref KEY_LINE: Regex = Regex::new(r"^[A-Za-z0-9_-]+:(\s|$)").unwrap();
}

/// Errors raised while splitting or validating a front-matter block
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Missing front-matter delimiter: {0}")]
    MissingDelimiter(&'static str),

    #[error("Invalid key syntax at line {line}: {key:?}")]
    InvalidKey { line: usize, key: String },

    #[error("Invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Slug is not URL-safe: {0:?}")]
    InvalidSlug(String),

    #[error("Unrecognized date: {0:?}")]
    InvalidDate(String),
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from a project or blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Display name used by project files in place of `title`
    pub name: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub category: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    #[serde(rename = "publishedAt", alias = "published_at")]
    pub published_at: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "updatedAt", alias = "updated")]
    pub updated_at: Option<String>,

    // Project metadata
    pub role: Option<String>,
    pub emoji: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub domain: Vec<String>,

    /// Entries are published unless explicitly marked otherwise
    #[serde(default = "default_published")]
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            name: None,
            slug: None,
            summary: None,
            category: None,
            tags: Vec::new(),
            published_at: None,
            date: None,
            updated_at: None,
            role: None,
            emoji: None,
            domain: Vec::new(),
            published: true,
            extra: HashMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse and validate front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), ParseError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        let (fm, body) = if content.starts_with("---") {
            Self::parse_yaml(content)?
        } else if content.starts_with(";;;") {
            Self::parse_json(content)?
        } else {
            return Err(ParseError::MissingDelimiter("opening `---`"));
        };

        fm.validate()?;
        Ok((fm, body))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str), ParseError> {
        let rest = &content[3..];
        let rest = rest.trim_start_matches(['\n', '\r']);

        // Closing delimiter may be the very first line of an empty header
        let (yaml_content, remaining) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else if let Some(end_pos) = rest.find("\n---") {
            (&rest[..end_pos], &rest[end_pos + 4..])
        } else {
            return Err(ParseError::MissingDelimiter("closing `---`"));
        };
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        check_keys(yaml_content)?;

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)?;
        Ok((fm, remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str), ParseError> {
        // JSON front-matter is wrapped in ;;; markers
        let rest = &content[3..];
        let end_pos = rest
            .find(";;;")
            .ok_or(ParseError::MissingDelimiter("closing `;;;`"))?;
        let json_content = &rest[..end_pos];
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        let fm: FrontMatter = serde_json::from_str(json_content)?;
        Ok((fm, remaining))
    }

    /// Check that required fields are present and well-formed
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.display_title().is_none() {
            return Err(ParseError::MissingField("title"));
        }

        let slug = self
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ParseError::MissingField("slug"))?;
        if slug::slugify(slug) != slug {
            return Err(ParseError::InvalidSlug(slug.to_string()));
        }

        self.parse_published()?;
        self.parse_updated()?;
        Ok(())
    }

    /// Title, falling back to the project `name`
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Parse the publication date, `publishedAt` taking precedence over `date`
    pub fn parse_published(&self) -> Result<Option<DateTime<Utc>>, ParseError> {
        parse_optional_date(self.published_at.as_deref().or(self.date.as_deref()))
    }

    /// Parse the updated date
    pub fn parse_updated(&self) -> Result<Option<DateTime<Utc>>, ParseError> {
        parse_optional_date(self.updated_at.as_deref())
    }
}

/// Reject header lines whose key is not a plain identifier
fn check_keys(yaml: &str) -> Result<(), ParseError> {
    for (i, line) in yaml.lines().enumerate() {
        // Nested values, list items and comments are left to the YAML parser
        if line.is_empty()
            || line.starts_with([' ', '\t', '-', '#'])
            || line.trim().is_empty()
        {
            continue;
        }

        if !KEY_LINE.is_match(line) {
            let key = line.split(':').next().unwrap_or(line).to_string();
            return Err(ParseError::InvalidKey { line: i + 2, key });
        }
    }
    Ok(())
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>, ParseError> {
    match value {
        None => Ok(None),
        Some(s) => parse_date_string(s)
            .map(Some)
            .ok_or_else(|| ParseError::InvalidDate(s.to_string())),
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}
