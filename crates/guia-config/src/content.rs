//! Mapping between site paths and content source files.
//!
//! Site paths follow the renderer's routing rules:
//!
//! - `/voz/` and `/voz/index.html` are served from `voz/README.md` or `voz/index.md`
//! - `/voz/conexiones.html` and `/voz/conexiones` are served from `voz/conexiones.md`

use std::path::{Path, PathBuf};

/// Index files that serve a directory path, in lookup order.
const INDEX_FILES: [&str; 2] = ["README.md", "index.md"];

/// Canonical form of a site path used for comparisons.
///
/// Drops fragments and queries, folds index pages into their directory
/// and strips `.html`/`.md` extensions.
#[must_use]
pub fn route_key(path: &str) -> String {
    let path = path.split(['#', '?']).next().unwrap_or_default();

    for index in ["README.md", "index.md", "index.html"] {
        if let Some(dir) = path.strip_suffix(index)
            && dir.ends_with('/')
        {
            return dir.to_owned();
        }
    }

    path.strip_suffix(".html")
        .or_else(|| path.strip_suffix(".md"))
        .unwrap_or(path)
        .to_owned()
}

/// Directory form of a path written without a trailing `/` or an extension.
///
/// `/voz` is also reachable as `/voz/`. Paths with an extension
/// (`/voz.html`) or a trailing `/` name a single page and have no
/// directory form.
#[must_use]
pub fn directory_form(path: &str) -> Option<String> {
    let path = path.split(['#', '?']).next().unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.is_empty() || last.contains('.') {
        return None;
    }
    Some(format!("{path}/"))
}

/// Whether two site paths name the same page.
#[must_use]
pub fn same_page(a: &str, b: &str) -> bool {
    let (key_a, key_b) = (route_key(a), route_key(b));
    key_a == key_b
        || directory_form(a).is_some_and(|dir| dir == key_b)
        || directory_form(b).is_some_and(|dir| dir == key_a)
}

/// Source files (relative to the docs directory) that may serve `path`.
#[must_use]
pub fn source_candidates(path: &str) -> Vec<PathBuf> {
    let key = route_key(path);
    let relative = key.trim_start_matches('/');

    if relative.is_empty() || relative.ends_with('/') {
        INDEX_FILES
            .iter()
            .map(|index| Path::new(relative).join(index))
            .collect()
    } else {
        vec![PathBuf::from(format!("{relative}.md"))]
    }
}

/// First existing source file for `path`, relative to `source_dir`.
#[must_use]
pub fn resolve_source(source_dir: &Path, path: &str) -> Option<PathBuf> {
    source_candidates(path)
        .into_iter()
        .find(|candidate| source_dir.join(candidate).is_file())
}

/// A navigation link with no content file behind it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingPage {
    /// Config field that declared the link (e.g. `theme.sidebar[0].links[2]`).
    pub field: String,
    /// The unresolved site path.
    pub path: String,
}
