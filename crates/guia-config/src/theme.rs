//! Theme options and the default-merging rule.
//!
//! Every recognized option has an explicit default in [`ThemeDefaults`].
//! A value set in `guia.toml` always wins over the default; an unset value
//! takes the default. Nothing is left for the renderer to fill in.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::navbar::{NavbarEntry, NavbarEntrySection, build_navbar};
use crate::sidebar::{SidebarGroupSection, SidebarTree, build_sidebar};
use crate::{ConfigError, require_non_empty};

/// Deepest heading nesting the sidebar can show (`h2` through `h6`).
pub const MAX_SIDEBAR_DEPTH: u8 = 5;

/// Messages shown on the not-found page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotFoundPage {
    /// Candidate messages; the renderer shows one of them.
    pub messages: Vec<String>,
}

impl NotFoundPage {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.messages.is_empty() {
            return Err(ConfigError::Validation(
                "theme.not_found must contain at least one message".to_owned(),
            ));
        }
        for (i, message) in self.messages.iter().enumerate() {
            require_non_empty(message, &format!("theme.not_found[{i}]"))?;
        }
        Ok(())
    }
}

/// Built-in theme defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeDefaults {
    pub contributors: bool,
    pub sidebar_depth: u8,
    pub edit_links: bool,
    pub edit_link_text: String,
    pub last_updated: String,
    pub docs_dir: String,
    pub docs_branch: String,
    pub back_to_home: String,
    pub not_found: Vec<String>,
}

impl Default for ThemeDefaults {
    fn default() -> Self {
        Self {
            contributors: true,
            sidebar_depth: 2,
            edit_links: true,
            edit_link_text: "Edit this page".to_owned(),
            last_updated: "Last Updated".to_owned(),
            docs_dir: String::new(),
            docs_branch: "main".to_owned(),
            back_to_home: "Take me home".to_owned(),
            not_found: vec![
                "There's nothing here.".to_owned(),
                "How did we get here?".to_owned(),
                "That's a Four-Oh-Four.".to_owned(),
                "Looks like we've got some broken links.".to_owned(),
            ],
        }
    }
}

/// Resolved theme options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeOptions {
    /// Show page contributors.
    pub contributors: bool,
    /// Heading levels nested under the active sidebar link.
    pub sidebar_depth: u8,
    /// Generate "edit this page" links.
    pub edit_links: bool,
    pub edit_link_text: String,
    /// Label for the last-updated timestamp.
    pub last_updated: String,
    /// Repository, either `owner/name` on GitHub or a full URL.
    pub repo: Option<String>,
    /// Docs subdirectory inside the repository.
    pub docs_dir: String,
    pub docs_branch: String,
    /// Plugin name to enabled flag. Unlisted plugins are enabled.
    pub theme_plugins: BTreeMap<String, bool>,
    pub back_to_home: String,
    pub not_found: NotFoundPage,
    pub navbar: Vec<NavbarEntry>,
    pub sidebar: SidebarTree,
}

impl ThemeOptions {
    /// Whether a theme plugin is enabled.
    pub fn plugin_enabled(&self, name: &str) -> bool {
        self.theme_plugins.get(name).copied().unwrap_or(true)
    }

    /// Edit link for a content file, relative to the docs directory.
    ///
    /// Returns `None` when edit links are disabled or no repository is set.
    pub fn edit_link(&self, source_file: &str) -> Option<String> {
        if !self.edit_links {
            return None;
        }
        let repo = self.repo.as_deref()?;
        let base = if is_url(repo) {
            repo.trim_end_matches('/').to_owned()
        } else {
            format!("https://github.com/{repo}")
        };
        let path = [
            self.docs_dir.trim_matches('/'),
            source_file.trim_start_matches('/'),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");

        Some(format!("{base}/edit/{}/{path}", self.docs_branch))
    }

    /// Check option values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sidebar_depth > MAX_SIDEBAR_DEPTH {
            return Err(ConfigError::Validation(format!(
                "theme.sidebar_depth cannot exceed {MAX_SIDEBAR_DEPTH}"
            )));
        }
        require_non_empty(&self.edit_link_text, "theme.edit_link_text")?;
        require_non_empty(&self.docs_branch, "theme.docs_branch")?;
        require_non_empty(&self.back_to_home, "theme.back_to_home")?;
        if let Some(repo) = &self.repo {
            validate_repo(repo)?;
        }
        for name in self.theme_plugins.keys() {
            require_non_empty(name, "theme.plugins key")?;
        }
        self.not_found.validate()
    }
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn validate_repo(repo: &str) -> Result<(), ConfigError> {
    require_non_empty(repo, "theme.repo")?;
    if is_url(repo) {
        return Ok(());
    }
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(ConfigError::Validation(format!(
            "theme.repo must be \"owner/name\" or an http(s) URL, got \"{repo}\""
        ))),
    }
}

/// The `[theme]` section of `guia.toml`. Unset options take [`ThemeDefaults`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeSection {
    pub contributors: Option<bool>,
    pub sidebar_depth: Option<u8>,
    pub edit_links: Option<bool>,
    pub edit_link_text: Option<String>,
    pub last_updated: Option<String>,
    pub repo: Option<String>,
    pub docs_dir: Option<String>,
    pub docs_branch: Option<String>,
    pub plugins: BTreeMap<String, bool>,
    pub back_to_home: Option<String>,
    pub not_found: Option<Vec<String>>,
    pub navbar: Vec<NavbarEntrySection>,
    pub sidebar: Vec<SidebarGroupSection>,
}

impl ThemeSection {
    /// Build the navbar in declaration order.
    pub fn build_navbar(&self) -> Result<Vec<NavbarEntry>, ConfigError> {
        build_navbar(&self.navbar)
    }

    /// Build the sidebar tree in declaration order.
    pub fn build_sidebar(&self) -> Result<SidebarTree, ConfigError> {
        build_sidebar(&self.sidebar)
    }

    /// Merge explicit values over `defaults` and validate the result.
    pub fn build_theme_options(
        &self,
        defaults: &ThemeDefaults,
    ) -> Result<ThemeOptions, ConfigError> {
        let options = ThemeOptions {
            contributors: self.contributors.unwrap_or(defaults.contributors),
            sidebar_depth: self.sidebar_depth.unwrap_or(defaults.sidebar_depth),
            edit_links: self.edit_links.unwrap_or(defaults.edit_links),
            edit_link_text: self
                .edit_link_text
                .clone()
                .unwrap_or_else(|| defaults.edit_link_text.clone()),
            last_updated: self
                .last_updated
                .clone()
                .unwrap_or_else(|| defaults.last_updated.clone()),
            repo: self.repo.clone(),
            docs_dir: self
                .docs_dir
                .clone()
                .unwrap_or_else(|| defaults.docs_dir.clone()),
            docs_branch: self
                .docs_branch
                .clone()
                .unwrap_or_else(|| defaults.docs_branch.clone()),
            theme_plugins: self.plugins.clone(),
            back_to_home: self
                .back_to_home
                .clone()
                .unwrap_or_else(|| defaults.back_to_home.clone()),
            not_found: NotFoundPage {
                messages: self
                    .not_found
                    .clone()
                    .unwrap_or_else(|| defaults.not_found.clone()),
            },
            navbar: self.build_navbar()?,
            sidebar: self.build_sidebar()?,
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(toml: &str) -> Result<ThemeOptions, ConfigError> {
        let section: ThemeSection = toml::from_str(toml).unwrap();
        section.build_theme_options(&ThemeDefaults::default())
    }

    #[test]
    fn test_empty_section_takes_defaults() {
        let options = build("").unwrap();
        let defaults = ThemeDefaults::default();

        assert_eq!(options.contributors, defaults.contributors);
        assert_eq!(options.sidebar_depth, 2);
        assert!(options.edit_links);
        assert_eq!(options.edit_link_text, "Edit this page");
        assert_eq!(options.docs_branch, "main");
        assert_eq!(options.repo, None);
        assert_eq!(options.not_found.messages, defaults.not_found);
        assert!(options.navbar.is_empty());
        assert!(options.sidebar.is_empty());
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let options = build(
            r#"
contributors = false
sidebar_depth = 1
edit_link_text = "Editar esta página"
last_updated = "Última actualización"
back_to_home = "Regresar al inicio"
not_found = ["No hay nada aquí."]
"#,
        )
        .unwrap();

        assert!(!options.contributors);
        assert_eq!(options.sidebar_depth, 1);
        assert_eq!(options.edit_link_text, "Editar esta página");
        assert_eq!(options.last_updated, "Última actualización");
        assert_eq!(options.back_to_home, "Regresar al inicio");
        assert_eq!(options.not_found.messages, vec!["No hay nada aquí."]);
        // Untouched options still come from the defaults.
        assert!(options.edit_links);
        assert_eq!(options.docs_branch, "main");
    }

    #[test]
    fn test_custom_defaults() {
        let section = ThemeSection {
            edit_links: Some(true),
            ..ThemeSection::default()
        };
        let defaults = ThemeDefaults {
            edit_links: false,
            sidebar_depth: 0,
            ..ThemeDefaults::default()
        };

        let options = section.build_theme_options(&defaults).unwrap();

        assert!(options.edit_links);
        assert_eq!(options.sidebar_depth, 0);
    }

    #[test]
    fn test_plugins() {
        let options = build(
            r"
[plugins]
mediumZoom = false
nprogress = true
",
        )
        .unwrap();

        assert!(!options.plugin_enabled("mediumZoom"));
        assert!(options.plugin_enabled("nprogress"));
        assert!(options.plugin_enabled("backToTop"));
    }

    #[test]
    fn test_sidebar_depth_too_deep() {
        let err = build("sidebar_depth = 6").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("theme.sidebar_depth"));
    }

    #[test]
    fn test_empty_not_found_rejected() {
        let err = build("not_found = []").unwrap_err();
        assert!(err.to_string().contains("theme.not_found"));
    }

    #[test]
    fn test_invalid_repo_rejected() {
        let err = build(r#"repo = "guide""#).unwrap_err();
        assert!(err.to_string().contains("theme.repo"));

        let err = build(r#"repo = "a/b/c""#).unwrap_err();
        assert!(err.to_string().contains("theme.repo"));
    }

    #[test]
    fn test_navbar_errors_surface() {
        let err = build(
            r#"
[[navbar]]
text = "Voz"
path = "/voz/"
url = "https://example.com"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("theme.navbar[0]"));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let result = toml::from_str::<ThemeSection>("sidebarDepth = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_link_github_shorthand() {
        let options = build(
            r#"
repo = "discordPrisma/guide"
docs_dir = "guide"
"#,
        )
        .unwrap();

        assert_eq!(
            options.edit_link("voz/README.md"),
            Some("https://github.com/discordPrisma/guide/edit/main/guide/voz/README.md".to_owned())
        );
    }

    #[test]
    fn test_edit_link_full_url_and_branch() {
        let options = build(
            r#"
repo = "https://gitlab.example.com/guia/"
docs_branch = "develop"
"#,
        )
        .unwrap();

        assert_eq!(
            options.edit_link("/README.md"),
            Some("https://gitlab.example.com/guia/edit/develop/README.md".to_owned())
        );
    }

    #[test]
    fn test_edit_link_disabled() {
        let options = build(
            r#"
repo = "discordPrisma/guide"
edit_links = false
"#,
        )
        .unwrap();
        assert_eq!(options.edit_link("README.md"), None);

        let options = build("").unwrap();
        assert_eq!(options.edit_link("README.md"), None);
    }
}
