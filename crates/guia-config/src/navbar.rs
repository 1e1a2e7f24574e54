//! Top-level navigation links.

use serde::Deserialize;

use crate::{ConfigError, require_http_url, require_non_empty};

/// Where a navbar entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavTarget {
    /// Site-internal path, starting with `/`.
    Internal(String),
    /// Absolute `http(s)://` URL.
    External(String),
}

impl NavTarget {
    /// Classify a renderer link string.
    pub fn from_link(link: &str) -> Self {
        if link.starts_with("http://") || link.starts_with("https://") {
            Self::External(link.to_owned())
        } else {
            Self::Internal(link.to_owned())
        }
    }

    /// The link string handed to the renderer.
    pub fn link(&self) -> &str {
        match self {
            Self::Internal(path) => path,
            Self::External(url) => url,
        }
    }

    /// Internal path, if this target is site-internal.
    pub fn internal_path(&self) -> Option<&str> {
        match self {
            Self::Internal(path) => Some(path),
            Self::External(_) => None,
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match self {
            Self::Internal(path) => require_internal_path(path, &format!("{field}.path")),
            Self::External(url) => require_http_url(url, &format!("{field}.url")),
        }
    }
}

/// A validated navbar entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavbarEntry {
    /// Display text.
    pub text: String,
    /// Link target.
    pub target: NavTarget,
}

impl NavbarEntry {
    /// Create an entry from a renderer `{ text, link }` pair.
    pub fn from_link(text: &str, link: &str, field: &str) -> Result<Self, ConfigError> {
        let entry = Self {
            text: text.to_owned(),
            target: NavTarget::from_link(link),
        };
        entry.validate(field)?;
        Ok(entry)
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        require_non_empty(&self.text, &format!("{field}.text"))?;
        self.target.validate(field)
    }
}

/// Navbar entry as written in `guia.toml`.
///
/// Exactly one of `path` or `url` must be set.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavbarEntrySection {
    pub text: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl NavbarEntrySection {
    /// Validate into a [`NavbarEntry`]. `field` names the entry in error messages.
    pub fn build(&self, field: &str) -> Result<NavbarEntry, ConfigError> {
        let path = self.path.as_deref().filter(|p| !p.is_empty());
        let url = self.url.as_deref().filter(|u| !u.is_empty());

        let target = match (path, url) {
            (Some(path), None) => NavTarget::Internal(path.to_owned()),
            (None, Some(url)) => NavTarget::External(url.to_owned()),
            (Some(_), Some(_)) => {
                return Err(ConfigError::Validation(format!(
                    "{field} sets both path and url; exactly one is allowed"
                )));
            }
            (None, None) => {
                return Err(ConfigError::Validation(format!(
                    "{field} must set either path or url"
                )));
            }
        };

        let entry = NavbarEntry {
            text: self.text.clone(),
            target,
        };
        entry.validate(field)?;
        Ok(entry)
    }
}

/// Build the navbar in declaration order.
pub fn build_navbar(entries: &[NavbarEntrySection]) -> Result<Vec<NavbarEntry>, ConfigError> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry.build(&format!("theme.navbar[{i}]")))
        .collect()
}

/// Require a site-internal path (leading `/`, no scheme).
pub(crate) fn require_internal_path(path: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(path, field)?;
    if !path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must be an absolute site path starting with /, got \"{path}\""
        )));
    }
    Ok(())
}
