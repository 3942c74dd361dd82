//! Content bundling
//!
//! Turns the body of a content file into a [`CompiledBody`]: module-level
//! `export const` / `import` statements are pulled out of the markup, the
//! remaining Markdown is rendered, and the `bannerImages` gallery is
//! resolved from the exports (or from front-matter when no export exists).

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::markdown::{count_words, MarkdownRenderer};
use super::FrontMatter;
use crate::config::HighlightConfig;

/// Name of the export holding the banner gallery
pub const BANNER_IMAGES: &str = "bannerImages";

/// Average reading speed used for reading time estimates
const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref EXPORT_HEAD: Regex =
        Regex::new(r"^export\s+const\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*(.*)$").unwrap();
    static ref IMPORT_STATEMENT: Regex =
        Regex::new(r#"(?s)^import\s+(?:.+?\s*from\s*)?['"]([^'"]+)['"]\s*;?\s*$"#).unwrap();
}

/// Errors raised while compiling embedded statements
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Malformed statement at line {line}: {text}")]
    MalformedStatement { line: usize, text: String },

    #[error("Export `{name}` starting at line {line} is never closed")]
    UnterminatedExport { name: String, line: usize },

    #[error("Export `{name}` at line {line} is not a literal value: {source}")]
    InvalidExport {
        name: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Export `{0}` is declared more than once")]
    DuplicateExport(String),

    #[error("`bannerImages` must be a list of image paths")]
    InvalidBannerImages,
}

/// A compiled content body, ready to be rendered by the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct CompiledBody {
    html: String,
    excerpt: Option<String>,
    exports: IndexMap<String, serde_json::Value>,
    imports: Vec<String>,
    banner_images: Vec<String>,
    word_count: usize,
}

impl CompiledBody {
    /// Rendered HTML output
    pub fn render(&self) -> &str {
        &self.html
    }

    /// Rendered excerpt (content before `<!-- more -->`)
    pub fn excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }

    /// A named export
    pub fn export(&self, name: &str) -> Option<&serde_json::Value> {
        self.exports.get(name)
    }

    pub fn exports(&self) -> &IndexMap<String, serde_json::Value> {
        &self.exports
    }

    /// Module specifiers of the stripped `import` statements
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Image paths of the banner gallery, empty when none are declared
    pub fn banner_images(&self) -> &[String] {
        &self.banner_images
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Estimated reading time in minutes, at least one
    pub fn reading_time(&self) -> usize {
        self.word_count.div_ceil(WORDS_PER_MINUTE).max(1)
    }
}

/// Compiles content bodies
pub struct Bundler {
    renderer: MarkdownRenderer,
}

impl Bundler {
    pub fn new(highlight: &HighlightConfig) -> Self {
        Self {
            renderer: MarkdownRenderer::with_options(&highlight.theme, highlight.line_number),
        }
    }

    /// Compile a body with the metadata it was declared with
    pub fn bundle(&self, body: &str, fm: &FrontMatter) -> Result<CompiledBody, BundleError> {
        let module = extract_statements(body)?;

        let banner_images = match module.exports.get(BANNER_IMAGES) {
            Some(value) => string_list(value)?,
            None => match fm.extra.get(BANNER_IMAGES) {
                Some(value) => {
                    let value = serde_json::to_value(value)
                        .map_err(|_| BundleError::InvalidBannerImages)?;
                    string_list(&value)?
                }
                None => Vec::new(),
            },
        };

        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(&module.markup);
        let html = self.renderer.render(&full_md);
        let excerpt = excerpt_md.map(|e| self.renderer.render(&e));
        let word_count = count_words(&html);

        Ok(CompiledBody {
            html,
            excerpt,
            exports: module.exports,
            imports: module.imports,
            banner_images,
            word_count,
        })
    }
}

struct Module {
    markup: String,
    exports: IndexMap<String, serde_json::Value>,
    imports: Vec<String>,
}

/// Split top-level `export`/`import` statements from the markup
fn extract_statements(body: &str) -> Result<Module, BundleError> {
    let mut markup = String::with_capacity(body.len());
    let mut exports = IndexMap::new();
    let mut imports = Vec::new();
    let mut fence: Option<&str> = None;

    let mut lines = body.lines().enumerate();
    while let Some((i, line)) = lines.next() {
        let trimmed = line.trim_start();

        // Statements inside fenced code are plain text
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            push_line(&mut markup, line);
            continue;
        }
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            fence = Some(&trimmed[..3]);
            push_line(&mut markup, line);
            continue;
        }

        if line.starts_with("export ") {
            let caps = EXPORT_HEAD
                .captures(line)
                .ok_or_else(|| BundleError::MalformedStatement {
                    line: i + 1,
                    text: line.to_string(),
                })?;
            let name = caps[1].to_string();
            let mut value = caps[2].to_string();

            let end = loop {
                if let Literal::Closed(end) = scan_literal(&value) {
                    break end;
                }
                match lines.next() {
                    Some((_, next)) => {
                        value.push('\n');
                        value.push_str(next);
                    }
                    None => return Err(BundleError::UnterminatedExport { name, line: i + 1 }),
                }
            };

            let rest = value[end..].trim_start_matches(';').trim();
            if !rest.is_empty() && !rest.starts_with("//") {
                return Err(BundleError::MalformedStatement {
                    line: i + 1,
                    text: line.to_string(),
                });
            }

            let parsed = serde_json::from_str(&js_to_json(value[..end].trim())).map_err(
                |source| BundleError::InvalidExport {
                    name: name.clone(),
                    line: i + 1,
                    source,
                },
            )?;
            if exports.insert(name.clone(), parsed).is_some() {
                return Err(BundleError::DuplicateExport(name));
            }
            continue;
        }

        if line.starts_with("import ") {
            let mut statement = line.to_string();
            // `import {\n  A,\n  B,\n} from '...'`
            while statement.matches('{').count() > statement.matches('}').count() {
                match lines.next() {
                    Some((_, next)) => {
                        statement.push('\n');
                        statement.push_str(next);
                    }
                    None => break,
                }
            }

            let caps = IMPORT_STATEMENT
                .captures(&statement)
                .ok_or_else(|| BundleError::MalformedStatement {
                    line: i + 1,
                    text: line.to_string(),
                })?;
            imports.push(caps[1].to_string());
            continue;
        }

        push_line(&mut markup, line);
    }

    Ok(Module {
        markup,
        exports,
        imports,
    })
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

enum Literal {
    /// More lines are needed
    Open,
    /// The value ends at this byte offset
    Closed(usize),
}

/// Find where an export value ends: at a top-level `;`, or at the end of
/// the text once every bracket and string is closed
fn scan_literal(src: &str) -> Literal {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in src.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth -= 1,
            ';' if depth <= 0 => return Literal::Closed(idx),
            _ => {}
        }
    }

    if quote.is_none() && depth <= 0 && !src.trim().is_empty() {
        Literal::Closed(src.len())
    } else {
        Literal::Open
    }
}

/// Normalise a JavaScript literal to JSON: single-quoted and template
/// strings become double-quoted, bare object keys are quoted and trailing
/// commas are dropped
fn js_to_json(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => match c {
                '\\' => match chars.next() {
                    Some('\'') if q == '\'' => out.push('\''),
                    Some(n) => {
                        out.push('\\');
                        out.push(n);
                    }
                    None => out.push('\\'),
                },
                c if c == q => {
                    out.push('"');
                    quote = None;
                }
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                c => out.push(c),
            },
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    out.push('"');
                }
                ',' => {
                    let mut look = chars.clone();
                    while matches!(look.peek(), Some(w) if w.is_whitespace()) {
                        look.next();
                    }
                    if !matches!(look.peek(), Some(']') | Some('}')) {
                        out.push(',');
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    let mut ident = String::from(c);
                    while let Some(&n) = chars.peek() {
                        if !(n.is_ascii_alphanumeric() || n == '_' || n == '$') {
                            break;
                        }
                        ident.push(n);
                        chars.next();
                    }
                    let mut look = chars.clone();
                    while matches!(look.peek(), Some(w) if w.is_whitespace()) {
                        look.next();
                    }
                    if look.peek() == Some(&':') {
                        out.push('"');
                        out.push_str(&ident);
                        out.push('"');
                    } else {
                        out.push_str(&ident);
                    }
                }
                c => out.push(c),
            },
        }
    }

    out
}

fn string_list(value: &serde_json::Value) -> Result<Vec<String>, BundleError> {
    value
        .as_array()
        .ok_or(BundleError::InvalidBannerImages)?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or(BundleError::InvalidBannerImages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundler() -> Bundler {
        Bundler::new(&HighlightConfig::default())
    }

    #[test]
    fn test_bundle_plain_markdown() {
        let compiled = bundler()
            .bundle("## Intro\n\nSome text.", &FrontMatter::default())
            .unwrap();
        assert!(compiled.render().contains("<h2>Intro</h2>"));
        assert!(compiled.banner_images().is_empty());
        assert!(compiled.exports().is_empty());
        assert_eq!(compiled.reading_time(), 1);
    }

    #[test]
    fn test_banner_images_export() {
        let body = r#"import { Picture } from '@components/Picture';

export const bannerImages = [
  '/images/projects/portfolio/1.png',
  "/images/projects/portfolio/2.png",
];

# Portfolio
"#;
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        assert_eq!(
            compiled.banner_images(),
            [
                "/images/projects/portfolio/1.png",
                "/images/projects/portfolio/2.png"
            ]
        );
        assert_eq!(compiled.imports(), ["@components/Picture"]);
        assert!(!compiled.render().contains("export const"));
        assert!(compiled.render().contains("<h1>Portfolio</h1>"));
    }

    #[test]
    fn test_banner_images_from_frontmatter() {
        let mut fm = FrontMatter::default();
        fm.extra.insert(
            BANNER_IMAGES.to_string(),
            serde_yaml::from_str("[/a.png, /b.png]").unwrap(),
        );
        let compiled = bundler().bundle("Body", &fm).unwrap();
        assert_eq!(compiled.banner_images(), ["/a.png", "/b.png"]);
    }

    #[test]
    fn test_other_exports_are_kept() {
        let body = "export const meta = { \"layout\": 'wide', \"columns\": 2 };\n\nText";
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        let meta = compiled.export("meta").unwrap();
        assert_eq!(meta["layout"], "wide");
        assert_eq!(meta["columns"], 2);
    }

    #[test]
    fn test_statements_inside_code_fence_are_text() {
        let body = "```js\nexport const notAnExport = 1\nimport x from y\n```\n";
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        assert!(compiled.exports().is_empty());
        assert!(compiled.render().contains("notAnExport"));
    }

    #[test]
    fn test_export_without_semicolon() {
        let body = "export const bannerImages = ['/a.png']\n\n# Title\n\nSome text;\n";
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        assert_eq!(compiled.banner_images(), ["/a.png"]);
        assert!(compiled.render().contains("<h1>Title</h1>"));
        assert!(compiled.render().contains("Some text;"));

        let body = "export const bannerImages = [\n  '/a.png',\n  '/b.png',\n]\nAfter\n";
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        assert_eq!(compiled.banner_images(), ["/a.png", "/b.png"]);
        assert!(compiled.render().contains("<p>After</p>"));

        let body = "export const year = 2023\nexport const draft = false\n";
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        assert_eq!(compiled.export("year").unwrap(), 2023);
        assert_eq!(compiled.export("draft").unwrap(), false);
    }

    #[test]
    fn test_export_with_bare_keys() {
        let body = "export const meta = { title: 'x', tags: ['a', 'b'], nested: { $id: 1 } };\n";
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        let meta = compiled.export("meta").unwrap();
        assert_eq!(meta["title"], "x");
        assert_eq!(meta["tags"][1], "b");
        assert_eq!(meta["nested"]["$id"], 1);
    }

    #[test]
    fn test_side_effect_import() {
        let body = "import './styles.css';\nimport \"@fontsource/inter\"\n\nText\n";
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        assert_eq!(compiled.imports(), ["./styles.css", "@fontsource/inter"]);
        assert!(!compiled.render().contains("import"));
    }

    #[test]
    fn test_multiline_import() {
        let body = "import {\n  Picture,\n  Gallery,\n} from '@components/Picture';\n\n# Title\n";
        let compiled = bundler().bundle(body, &FrontMatter::default()).unwrap();
        assert_eq!(compiled.imports(), ["@components/Picture"]);
        assert!(!compiled.render().contains("Gallery"));
        assert!(compiled.render().contains("<h1>Title</h1>"));
    }

    #[test]
    fn test_unterminated_export() {
        let body = "export const bannerImages = [\n  '/a.png'\n\nText\n";
        let err = bundler().bundle(body, &FrontMatter::default()).unwrap_err();
        assert!(matches!(err, BundleError::UnterminatedExport { line: 1, .. }));
    }

    #[test]
    fn test_unterminated_import() {
        let err = bundler()
            .bundle("import {\n  Picture,\n", &FrontMatter::default())
            .unwrap_err();
        assert!(matches!(err, BundleError::MalformedStatement { line: 1, .. }));
    }

    #[test]
    fn test_invalid_export_value() {
        let body = "export const bannerImages = images.map(i => i);\n";
        let err = bundler().bundle(body, &FrontMatter::default()).unwrap_err();
        assert!(matches!(err, BundleError::InvalidExport { .. }));
    }

    #[test]
    fn test_malformed_statement() {
        let err = bundler()
            .bundle("export default function Layout() {}\n", &FrontMatter::default())
            .unwrap_err();
        assert!(matches!(err, BundleError::MalformedStatement { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_export() {
        let body = "export const a = 1;\nexport const a = 2;\n";
        let err = bundler().bundle(body, &FrontMatter::default()).unwrap_err();
        assert!(matches!(err, BundleError::DuplicateExport(name) if name == "a"));
    }

    #[test]
    fn test_banner_images_must_be_strings() {
        let body = "export const bannerImages = [1, 2];\n";
        let err = bundler().bundle(body, &FrontMatter::default()).unwrap_err();
        assert!(matches!(err, BundleError::InvalidBannerImages));
    }

    #[test]
    fn test_excerpt() {
        let compiled = bundler()
            .bundle("Short intro.\n<!-- more -->\nThe rest.", &FrontMatter::default())
            .unwrap();
        assert_eq!(compiled.excerpt(), Some("<p>Short intro.</p>\n"));
        assert!(compiled.render().contains("The rest."));
    }

    #[test]
    fn test_js_to_json() {
        assert_eq!(js_to_json("['a', 'b',]"), r#"["a", "b"]"#);
        assert_eq!(js_to_json(r#"'it\'s "x"'"#), r#""it's \"x\"""#);
        assert_eq!(js_to_json("{ \"k\": [1, 2, ], }"), "{ \"k\": [1, 2 ] }");
        assert_eq!(js_to_json("{ a: true, b_2: null }"), r#"{ "a": true, "b_2": null }"#);
        assert_eq!(js_to_json("{ a: 'x:y' }"), r#"{ "a": "x:y" }"#);
    }
}
