//! operation document discovery
//!
//! document patterns are globs relative to the working root (a leading `!`
//! excludes). a pattern without a `/` only matches at the root, and
//! `node_modules` and hidden directories are never entered. `.graphql` and
//! `.gql` files are taken whole, any other file contributes the body of each
//! `` gql`...` `` template.

use crate::error::{Error, Result};
use ignore::overrides::OverrideBuilder;
use ignore::{DirEntry, WalkBuilder};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static GQL_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)gql`(.*?)`").unwrap());

const GRAPHQL_EXTENSIONS: &[&str] = &["graphql", "gql"];

const SKIPPED_DIRS: &[&str] = &["node_modules"];

/// document text collected for one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documents {
    /// matched files in visit order
    pub files: Vec<PathBuf>,
    /// extracted graphql, one block per template or file
    pub text: String,
}

impl Documents {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// files under `root` matching `patterns`, sorted by path
pub fn discover(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut overrides = OverrideBuilder::new(root);
    for pattern in patterns {
        overrides.add(&normalize_pattern(pattern))?;
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .overrides(overrides.build()?)
        .filter_entry(|entry| !is_skipped_dir(entry))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_some_and(|ty| ty.is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// graphql embedded in one file
pub fn extract<'t>(path: &Path, text: &'t str) -> Vec<&'t str> {
    let is_graphql = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| GRAPHQL_EXTENSIONS.contains(&ext));
    if is_graphql {
        return vec![text];
    }
    GQL_TAG
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|body| body.as_str())
        .collect()
}

/// discover, read, and extract every document matching `patterns`
pub fn collect(root: &Path, patterns: &[String]) -> Result<Documents> {
    let files = discover(root, patterns)?;
    let mut blocks = Vec::new();
    for file in &files {
        let text = std::fs::read_to_string(file).map_err(|err| Error::io(file, err))?;
        let found: Vec<String> = extract(file, &text)
            .into_iter()
            .map(str::to_string)
            .collect();
        tracing::debug!(file = %file.display(), blocks = found.len(), "scanned document");
        blocks.extend(found);
    }
    Ok(Documents {
        files,
        text: blocks.join("\n"),
    })
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|ty| ty.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || SKIPPED_DIRS.contains(&name))
}

/// strip `./` and anchor slash-free patterns to the root
fn normalize_pattern(pattern: &str) -> String {
    let (negate, glob) = match pattern.strip_prefix('!') {
        Some(rest) => ("!", rest),
        None => ("", pattern),
    };
    let glob = glob.trim_start_matches("./");
    if glob.contains('/') {
        format!("{negate}{glob}")
    } else {
        format!("{negate}/{glob}")
    }
}
