//! Navigation configuration model for the guia documentation site.
//!
//! Parses `guia.toml` with serde into raw sections, then builds and
//! validates the model the external renderer consumes:
//!
//! - [`SiteMetadata`]: language, title, description and head tags
//! - [`NavbarEntry`]: top navigation, internal path or external URL
//! - [`SidebarTree`]: groups of links keyed by non-overlapping path prefixes
//! - [`ThemeOptions`]: theme settings merged over [`ThemeDefaults`]
//! - [`BuildSettings`]: bundler, HTML shells, custom theme and plugins
//!
//! Any problem is reported as a [`ConfigError`] while loading, before the
//! renderer is started. The model is never mutated afterwards.
//!
//! ## Environment Variable Expansion
//!
//! These fields support `${VAR}` and `${VAR:-default}`:
//! - `renderer.program`
//! - `theme.repo`
//! - `theme.docs_branch`

mod content;
mod expand;
mod metadata;
mod navbar;
mod renderer;
mod sidebar;
mod theme;

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use content::{
    MissingPage, directory_form, resolve_source, route_key, same_page, source_candidates,
};
pub use metadata::{HeadTag, HeadTagSection, SiteMetadata, SiteSection};
pub use navbar::{NavTarget, NavbarEntry, NavbarEntrySection, build_navbar};
pub use renderer::{
    BuildSettings, NavbarLink, RendererCommand, RendererConfig, RendererSection, SidebarConfig,
    SidebarEntry, ThemeConfig,
};
pub use sidebar::{
    PageHeading, PageOutline, RenderedSidebar, SidebarGroup, SidebarGroupSection, SidebarItem,
    SidebarLink, SidebarLinkSection, SidebarTree, build_sidebar,
};
pub use theme::{MAX_SIDEBAR_DEPTH, NotFoundPage, ThemeDefaults, ThemeOptions, ThemeSection};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "guia.toml";

/// Directory (next to the config file) holding generated files.
const PROJECT_DIRNAME: &str = ".guia";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override renderer program.
    pub program: Option<String>,
}

/// Everything the renderer receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteModel {
    pub metadata: SiteMetadata,
    pub theme: ThemeOptions,
    pub build: BuildSettings,
}

/// Resolved docs locations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocsConfig {
    /// Content source directory.
    pub source_dir: PathBuf,
    /// Project directory for generated files (`.guia/`).
    pub project_dir: PathBuf,
}

impl DocsConfig {
    /// Where the serialized model is written (`.guia/config.json`).
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.project_dir.join("config.json")
    }
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    /// The validated navigation configuration model.
    pub model: SiteModel,
    /// Renderer command line.
    pub command: RendererCommand,
    /// Docs locations.
    pub docs: DocsConfig,
    /// Path to the config file (set when loaded from disk).
    pub config_path: Option<PathBuf>,
}

/// Configuration file as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    site: SiteSection,
    docs: DocsConfigRaw,
    renderer: RendererSection,
    theme: ThemeSection,
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DocsConfigRaw {
    source_dir: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`theme.repo`").
        field: String,
        /// Error message (e.g., "${`GUIA_REPO`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
pub(crate) fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `guia.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if no config file exists, parsing fails or the model
    /// does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => {
                let cwd = std::env::current_dir()?;
                Self::discover_config(&cwd)
                    .ok_or_else(|| ConfigError::NotFound(cwd.join(CONFIG_FILENAME)))?
            }
        };
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        Self::load_from_file(&path, cli_settings)
    }

    /// Parse and validate configuration text.
    ///
    /// Relative paths resolve against `config_dir`.
    pub fn from_toml_str(
        content: &str,
        config_dir: &Path,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut file: ConfigFile = toml::from_str(content)?;
        file.expand_env_vars()?;
        file.into_config(config_dir, cli_settings)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path, cli_settings: Option<&CliSettings>) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));

        let mut config = Self::from_toml_str(&content, config_dir, cli_settings)?;
        config.config_path = Some(path.to_path_buf());

        tracing::debug!(
            navbar = config.model.theme.navbar.len(),
            sidebar_groups = config.model.theme.sidebar.groups().len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Sidebar links and internal navbar paths with no content file.
    pub fn missing_pages(&self) -> Vec<MissingPage> {
        let theme = &self.model.theme;
        let navbar = theme.navbar.iter().enumerate().filter_map(|(i, entry)| {
            entry
                .target
                .internal_path()
                .map(|path| (format!("theme.navbar[{i}]"), path))
        });
        let sidebar = theme
            .sidebar
            .groups()
            .iter()
            .enumerate()
            .flat_map(|(i, group)| {
                group.links.iter().enumerate().map(move |(k, link)| {
                    (format!("theme.sidebar[{i}].links[{k}]"), link.path.as_str())
                })
            });

        navbar
            .chain(sidebar)
            .filter(|(_, path)| resolve_source(&self.docs.source_dir, path).is_none())
            .map(|(field, path)| MissingPage {
                field,
                path: path.to_owned(),
            })
            .collect()
    }

    /// Serialize the model into the renderer's shape.
    pub fn to_renderer(&self) -> RendererConfig {
        self.model.to_renderer()
    }
}

impl ConfigFile {
    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.renderer.program, "renderer.program")?;
        expand::expand_opt(&mut self.theme.repo, "theme.repo")?;
        expand::expand_opt(&mut self.theme.docs_branch, "theme.docs_branch")?;
        Ok(())
    }

    /// Resolve paths, apply CLI settings and build the validated model.
    fn into_config(
        mut self,
        config_dir: &Path,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Config, ConfigError> {
        let mut source_dir = config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs"));
        if let Some(settings) = cli_settings {
            if let Some(dir) = &settings.source_dir {
                source_dir.clone_from(dir);
            }
            if let Some(program) = &settings.program {
                self.renderer.program = Some(program.clone());
            }
        }

        let model = SiteModel {
            metadata: self.site.build_metadata()?,
            theme: self.theme.build_theme_options(&ThemeDefaults::default())?,
            build: self.renderer.build_settings(config_dir, &source_dir)?,
        };
        let command = self.renderer.command(config_dir, &source_dir)?;

        Ok(Config {
            model,
            command,
            docs: DocsConfig {
                source_dir,
                project_dir: config_dir.join(PROJECT_DIRNAME),
            },
            config_path: None,
        })
    }
}
