//! Content module - front-matter, bundling and the content repository

mod bundler;
mod entry;
mod frontmatter;
pub mod loader;
mod markdown;
pub mod repository;

pub use bundler::{BundleError, Bundler, CompiledBody, BANNER_IMAGES};
pub use entry::{ContentEntry, ContentType, EntrySummary};
pub use frontmatter::{parse_date_string, FrontMatter, ParseError};
pub use markdown::{strip_html, MarkdownRenderer};
pub use repository::{ContentRepository, RepositoryError};
