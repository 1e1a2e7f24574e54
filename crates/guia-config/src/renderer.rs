//! Renderer settings and the serialized model handed to the renderer.
//!
//! [`RendererConfig`] mirrors the renderer's camelCase configuration shape.
//! Converting a [`SiteModel`] to it and back is lossless.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::metadata::{HeadTag, SiteMetadata};
use crate::navbar::NavbarEntry;
use crate::sidebar::{SidebarGroup, SidebarLink, SidebarTree};
use crate::theme::{NotFoundPage, ThemeOptions};
use crate::{ConfigError, SiteModel, require_non_empty};

const DEFAULT_BUNDLER: &str = "@vuepress/vite";
const DEFAULT_PROGRAM: &str = "npx";
const DEFAULT_ARGS: [&str; 1] = ["vuepress"];
const TEMPLATE_DEV: &str = ".vuepress/templates/index.dev.html";
const TEMPLATE_SSR: &str = ".vuepress/templates/index.ssr.html";
const ENTRY: &str = ".vuepress/config.ts";

/// Build wiring passed through to the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildSettings {
    /// Bundler package name.
    pub bundler: String,
    /// HTML shell used by the development server.
    pub template_dev: PathBuf,
    /// HTML shell used for server-side rendering.
    pub template_ssr: PathBuf,
    /// Custom theme entry point. The renderer's default theme when unset.
    pub theme: Option<PathBuf>,
    /// Renderer plugins.
    pub plugins: Vec<String>,
}

impl BuildSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.bundler, "renderer.bundler")?;
        for (i, plugin) in self.plugins.iter().enumerate() {
            require_non_empty(plugin, &format!("renderer.plugins[{i}]"))?;
        }
        Ok(())
    }

    /// Template and theme files, each with the config field that names it.
    pub fn required_files(&self) -> Vec<(&'static str, &Path)> {
        let mut files = vec![
            ("renderer.template_dev", self.template_dev.as_path()),
            ("renderer.template_ssr", self.template_ssr.as_path()),
        ];
        if let Some(theme) = &self.theme {
            files.push(("renderer.theme", theme.as_path()));
        }
        files
    }
}

/// External renderer command line, without the mode and source directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RendererCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Renderer config file that loads the serialized model from `GUIA_CONFIG`.
    pub entry: PathBuf,
}

/// The `[renderer]` section of `guia.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererSection {
    pub bundler: Option<String>,
    pub template_dev: Option<String>,
    pub template_ssr: Option<String>,
    pub theme: Option<String>,
    pub plugins: Vec<String>,
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub entry: Option<String>,
}

impl RendererSection {
    /// Resolve build settings.
    ///
    /// Explicit paths are relative to `config_dir`; default templates live
    /// under `source_dir/.vuepress/templates/`.
    pub fn build_settings(
        &self,
        config_dir: &Path,
        source_dir: &Path,
    ) -> Result<BuildSettings, ConfigError> {
        let resolve = |path: Option<&str>, default: &str| {
            path.map_or_else(|| source_dir.join(default), |p| config_dir.join(p))
        };

        let settings = BuildSettings {
            bundler: self
                .bundler
                .clone()
                .unwrap_or_else(|| DEFAULT_BUNDLER.to_owned()),
            template_dev: resolve(self.template_dev.as_deref(), TEMPLATE_DEV),
            template_ssr: resolve(self.template_ssr.as_deref(), TEMPLATE_SSR),
            theme: self.theme.as_deref().map(|t| config_dir.join(t)),
            plugins: self.plugins.clone(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Resolve the renderer command line.
    ///
    /// The entry file defaults to `source_dir/.vuepress/config.ts`.
    pub fn command(
        &self,
        config_dir: &Path,
        source_dir: &Path,
    ) -> Result<RendererCommand, ConfigError> {
        let command = RendererCommand {
            program: self
                .program
                .clone()
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_owned()),
            args: self
                .args
                .clone()
                .unwrap_or_else(|| DEFAULT_ARGS.iter().map(|&a| a.to_owned()).collect()),
            entry: self
                .entry
                .as_deref()
                .map_or_else(|| source_dir.join(ENTRY), |e| config_dir.join(e)),
        };
        require_non_empty(&command.program, "renderer.program")?;
        Ok(command)
    }
}

/// Serialized model in the renderer's configuration shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererConfig {
    pub bundler: String,
    pub template_dev: PathBuf,
    #[serde(rename = "templateSSR")]
    pub template_ssr: PathBuf,
    pub lang: String,
    pub title: String,
    pub description: String,
    pub head: Vec<HeadTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<PathBuf>,
    pub theme_config: ThemeConfig,
    #[serde(default)]
    pub plugins: Vec<String>,
}

/// The renderer's `themeConfig` object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub contributors: bool,
    pub sidebar: SidebarConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    pub docs_dir: String,
    pub docs_branch: String,
    pub sidebar_depth: u8,
    pub edit_links: bool,
    pub edit_link_text: String,
    pub last_updated: String,
    pub navbar: Vec<NavbarLink>,
    pub theme_plugins: BTreeMap<String, bool>,
    pub back_to_home: String,
    pub not_found: Vec<String>,
}

/// Navbar entry in renderer form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavbarLink {
    pub text: String,
    pub link: String,
}

/// Sidebar link in renderer form: a bare path or `{ text, link }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarEntry {
    Path(String),
    Titled { text: String, link: String },
}

/// Sidebar in renderer form: an object keyed by prefix.
///
/// Serialized and deserialized as a map without losing key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SidebarConfig(pub Vec<(String, Vec<SidebarEntry>)>);

impl Serialize for SidebarConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (prefix, entries) in &self.0 {
            map.serialize_entry(prefix, entries)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SidebarConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = SidebarConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of path prefix to sidebar links")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut groups = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, Vec<SidebarEntry>>()? {
                    groups.push(entry);
                }
                Ok(SidebarConfig(groups))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

impl From<&SidebarTree> for SidebarConfig {
    fn from(tree: &SidebarTree) -> Self {
        Self(
            tree.groups()
                .iter()
                .map(|group| {
                    let entries = group
                        .links
                        .iter()
                        .map(|link| match &link.title {
                            Some(title) => SidebarEntry::Titled {
                                text: title.clone(),
                                link: link.path.clone(),
                            },
                            None => SidebarEntry::Path(link.path.clone()),
                        })
                        .collect();
                    (group.prefix.clone(), entries)
                })
                .collect(),
        )
    }
}

impl SidebarConfig {
    fn into_tree(self) -> Result<SidebarTree, ConfigError> {
        SidebarTree::new(
            self.0
                .into_iter()
                .map(|(prefix, entries)| SidebarGroup {
                    prefix,
                    links: entries
                        .into_iter()
                        .map(|entry| match entry {
                            SidebarEntry::Path(path) => SidebarLink::new(path),
                            SidebarEntry::Titled { text, link } => SidebarLink {
                                path: link,
                                title: Some(text),
                            },
                        })
                        .collect(),
                })
                .collect(),
        )
    }
}

impl SiteModel {
    /// Serialize the model into the renderer's shape.
    pub fn to_renderer(&self) -> RendererConfig {
        let SiteModel {
            metadata,
            theme,
            build,
        } = self;

        RendererConfig {
            bundler: build.bundler.clone(),
            template_dev: build.template_dev.clone(),
            template_ssr: build.template_ssr.clone(),
            lang: metadata.lang.clone(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            head: metadata.head.clone(),
            theme: build.theme.clone(),
            theme_config: ThemeConfig {
                contributors: theme.contributors,
                sidebar: SidebarConfig::from(&theme.sidebar),
                repo: theme.repo.clone(),
                docs_dir: theme.docs_dir.clone(),
                docs_branch: theme.docs_branch.clone(),
                sidebar_depth: theme.sidebar_depth,
                edit_links: theme.edit_links,
                edit_link_text: theme.edit_link_text.clone(),
                last_updated: theme.last_updated.clone(),
                navbar: theme
                    .navbar
                    .iter()
                    .map(|entry| NavbarLink {
                        text: entry.text.clone(),
                        link: entry.target.link().to_owned(),
                    })
                    .collect(),
                theme_plugins: theme.theme_plugins.clone(),
                back_to_home: theme.back_to_home.clone(),
                not_found: theme.not_found.messages.clone(),
            },
            plugins: build.plugins.clone(),
        }
    }
}

impl RendererConfig {
    /// Read a serialized model back, re-running validation.
    pub fn into_model(self) -> Result<SiteModel, ConfigError> {
        let metadata = SiteMetadata {
            lang: self.lang,
            title: self.title,
            description: self.description,
            head: self.head,
        };
        metadata.validate()?;

        let tc = self.theme_config;
        let navbar = tc
            .navbar
            .iter()
            .enumerate()
            .map(|(i, nav)| NavbarEntry::from_link(&nav.text, &nav.link, &format!("navbar[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let theme = ThemeOptions {
            contributors: tc.contributors,
            sidebar_depth: tc.sidebar_depth,
            edit_links: tc.edit_links,
            edit_link_text: tc.edit_link_text,
            last_updated: tc.last_updated,
            repo: tc.repo,
            docs_dir: tc.docs_dir,
            docs_branch: tc.docs_branch,
            theme_plugins: tc.theme_plugins,
            back_to_home: tc.back_to_home,
            not_found: NotFoundPage {
                messages: tc.not_found,
            },
            navbar,
            sidebar: tc.sidebar.into_tree()?,
        };
        theme.validate()?;

        let build = BuildSettings {
            bundler: self.bundler,
            template_dev: self.template_dev,
            template_ssr: self.template_ssr,
            theme: self.theme,
            plugins: self.plugins,
        };
        build.validate()?;

        Ok(SiteModel {
            metadata,
            theme,
            build,
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
