use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::mapping::MappingEngine;
use crate::modern;

/// How a source file carries its classes and how it is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// `.html`, `.vue`: plain `class="..."` attributes.
    Markup,
    /// `.jsx`, `.tsx`: `className` attributes and module imports.
    Script,
}

impl Flavor {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| value.to_ascii_lowercase());
        match ext.as_deref() {
            Some("html") | Some("vue") => Some(Self::Markup),
            Some("jsx") | Some("tsx") => Some(Self::Script),
            _ => None,
        }
    }
}

/// One `class=`/`className=` attribute occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassUsage {
    pub element: String,
    pub attribute: String,
    /// Recognized utility tokens, in source order.
    pub tokens: Vec<String>,
    /// Hand-authored classes that stay in the markup.
    pub retained: Vec<String>,
    /// Byte range of the whole attribute, quotes included.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub flavor: Flavor,
    pub text: String,
    pub usages: Vec<ClassUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub documents: Vec<Document>,
    pub files_scanned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScanError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub respect_gitignore: bool,
    pub include_node_modules: bool,
    pub ignore_patterns: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_node_modules: false,
            ignore_patterns: Vec::new(),
        }
    }
}

const UTILITY_PREFIXES: [&str; 30] = [
    "flex", "grid", "block", "inline", "hidden", "text-", "bg-", "border-", "p-", "m-", "w-",
    "h-", "items-", "justify-", "gap-", "space-", "rounded", "font-", "leading-", "tracking-",
    "opacity-", "hover:", "focus:", "active:", "disabled:", "sm:", "md:", "lg:", "xl:", "2xl:",
];

/// Families that also read like hand-authored names (`top-bar`,
/// `content-wrapper`). They only count when the token resolves to something.
const RESOLVED_PREFIXES: [&str; 19] = [
    "shadow", "inset-", "min-", "max-", "top-", "bottom-", "left-", "right-", "z-", "cursor-",
    "ring", "outline", "transition", "size-", "place-", "content-", "overflow-", "group-hover:",
    "peer-",
];

const MODERN_PREFIXES: [&str; 2] = ["@container", "@layer"];

fn has_prefix(token: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .any(|prefix| token.starts_with(prefix) || token == prefix.trim_end_matches('-'))
}

/// True when `token` should be treated as a utility class rather than a
/// hand-authored one.
pub fn is_utility_class(token: &str, engine: &MappingEngine) -> bool {
    if has_prefix(token, &UTILITY_PREFIXES)
        || MODERN_PREFIXES.iter().any(|prefix| token.starts_with(prefix))
    {
        return true;
    }
    if engine.recognizes(token) {
        return true;
    }
    has_prefix(token, &RESOLVED_PREFIXES) && !modern::resolve(token).is_empty()
}

fn class_attribute_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"(class|className)=["']([^"']+)["']"#)
            .expect("class attribute pattern is valid")
    })
}

fn tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^<(\w+(?:\.\w+)*)").expect("tag pattern is valid"))
}

const TAG_WINDOW: usize = 50;
const FALLBACK_ELEMENT: &str = "element";

/// Finds every class attribute in `text` and splits its tokens into utility
/// and retained classes.
pub fn parse_content(text: &str, engine: &MappingEngine) -> Vec<ClassUsage> {
    class_attribute_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attribute = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str();
            let (tokens, retained): (Vec<String>, Vec<String>) = value
                .split_whitespace()
                .map(str::to_string)
                .partition(|token| is_utility_class(token, engine));
            Some(ClassUsage {
                element: element_before(text, whole.start()),
                attribute,
                tokens,
                retained,
                span: whole.range(),
            })
        })
        .collect()
}

/// Element identifier of the nearest tag opened before `offset`.
fn element_before(text: &str, offset: usize) -> String {
    let Some(open) = text[..offset].rfind('<') else {
        return FALLBACK_ELEMENT.to_string();
    };
    tag_regex()
        .captures(&text[open..])
        .and_then(|caps| caps.get(1))
        .filter(|name| name.end() <= TAG_WINDOW)
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| FALLBACK_ELEMENT.to_string())
}

pub fn parse_document(path: &Path, engine: &MappingEngine) -> Result<Document, ScanError> {
    let flavor = Flavor::from_path(path).ok_or_else(|| ScanError {
        message: format!("unsupported file type: {}", path.display()),
    })?;
    let text = fs::read_to_string(path).map_err(|err| ScanError {
        message: format!("failed to read {}: {}", path.display(), err),
    })?;
    let usages = parse_content(&text, engine);
    Ok(Document {
        path: path.to_path_buf(),
        flavor,
        text,
        usages,
    })
}

/// Lists convertible files under `input` (or `input` itself), sorted.
pub fn collect_sources(input: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    if !input.exists() {
        return Err(ScanError {
            message: format!("path not found: {}", input.display()),
        });
    }
    if input.is_file() {
        return match Flavor::from_path(input) {
            Some(_) => Ok(vec![input.to_path_buf()]),
            None => Err(ScanError {
                message: format!("unsupported file type: {}", input.display()),
            }),
        };
    }

    let ignore_set = build_globset(&options.ignore_patterns)?;
    let mut builder = WalkBuilder::new(input);
    builder
        .hidden(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore);

    let mut paths = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let relative_path = path.strip_prefix(input).unwrap_or(path);
        if ignore_set.is_match(relative_path) || ignore_set.is_match(path) {
            continue;
        }
        if should_skip_file(path, options) {
            continue;
        }
        paths.push(path.to_path_buf());
    }
    paths.sort();
    Ok(paths)
}

pub fn scan(
    input: &Path,
    options: &ScanOptions,
    engine: &MappingEngine,
) -> Result<ScanResult, ScanError> {
    let paths = collect_sources(input, options)?;
    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        documents.push(parse_document(path, engine)?);
    }
    Ok(ScanResult {
        files_scanned: documents.len(),
        documents,
    })
}

fn should_skip_file(path: &Path, options: &ScanOptions) -> bool {
    if !options.include_node_modules
        && path
            .components()
            .any(|component| component.as_os_str() == "node_modules")
    {
        return true;
    }
    Flavor::from_path(path).is_none()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| ScanError {
            message: format!("invalid glob pattern {}: {}", pattern, err),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|err| ScanError {
        message: format!("failed to build glob set: {}", err),
    })
}
