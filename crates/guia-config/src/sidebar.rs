//! Sidebar tree keyed by path prefix.
//!
//! Each group owns the pages under one path prefix. Prefixes never overlap,
//! so a page resolves to at most one group. Links are kept in the order they
//! were declared; nothing here sorts them.

use serde::{Deserialize, Serialize};

use crate::content::{directory_form, route_key, same_page};
use crate::navbar::require_internal_path;
use crate::{ConfigError, require_non_empty};

/// A link inside a sidebar group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarLink {
    /// Site path of the linked page.
    pub path: String,
    /// Title override. The page's own title is used when unset.
    pub title: Option<String>,
}

impl SidebarLink {
    /// Link without a title override.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: None,
        }
    }
}

/// Links shown for every page under `prefix`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarGroup {
    /// Path prefix, always starting and ending with `/`.
    pub prefix: String,
    /// Links in render order.
    pub links: Vec<SidebarLink>,
}

impl SidebarGroup {
    /// Whether `page_path` falls under this group's prefix.
    ///
    /// `/voz` counts as the `/voz/` directory; `/voz.html` is a sibling page
    /// and does not.
    pub fn contains(&self, page_path: &str) -> bool {
        route_key(page_path).starts_with(&self.prefix)
            || directory_form(page_path).is_some_and(|dir| dir == self.prefix)
    }
}

/// Ordered, validated set of sidebar groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SidebarTree {
    groups: Vec<SidebarGroup>,
}

impl SidebarTree {
    /// Validate groups and build the tree.
    ///
    /// Prefixes are normalized to end with `/` and must be pairwise
    /// non-overlapping. Every link must be a site-internal path.
    pub fn new(groups: Vec<SidebarGroup>) -> Result<Self, ConfigError> {
        let mut normalized: Vec<SidebarGroup> = Vec::with_capacity(groups.len());

        for (i, mut group) in groups.into_iter().enumerate() {
            let field = format!("theme.sidebar[{i}]");
            require_internal_path(&group.prefix, &format!("{field}.prefix"))?;
            if !group.prefix.ends_with('/') {
                group.prefix.push('/');
            }

            if let Some((j, other)) = normalized
                .iter()
                .enumerate()
                .find(|(_, other)| overlaps(&other.prefix, &group.prefix))
            {
                let message = if other.prefix == group.prefix {
                    format!(
                        "{field}.prefix \"{}\" is already declared by theme.sidebar[{j}]",
                        group.prefix
                    )
                } else {
                    format!(
                        "{field}.prefix \"{}\" overlaps \"{}\" declared by theme.sidebar[{j}]",
                        group.prefix, other.prefix
                    )
                };
                return Err(ConfigError::Validation(message));
            }

            for (k, link) in group.links.iter().enumerate() {
                let link_field = format!("{field}.links[{k}]");
                require_internal_path(&link.path, &link_field)?;
                if let Some(title) = &link.title {
                    require_non_empty(title, &format!("{link_field}.title"))?;
                }
            }

            normalized.push(group);
        }

        Ok(Self { groups: normalized })
    }

    /// Groups in declaration order.
    pub fn groups(&self) -> &[SidebarGroup] {
        &self.groups
    }

    /// Whether the tree has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group responsible for `page_path`, if any.
    pub fn group_for(&self, page_path: &str) -> Option<&SidebarGroup> {
        self.groups.iter().find(|group| group.contains(page_path))
    }

    /// Sidebar shown on `page`.
    ///
    /// The resolved group's links come back in declaration order. The link
    /// for the current page is marked active and carries the page's headings
    /// nested `depth` levels deep: depth 1 shows `h2`, depth 2 adds `h3`, and
    /// so on. Depth 0 shows no headings.
    pub fn render(&self, page: &PageOutline, depth: u8) -> Option<RenderedSidebar> {
        let group = self.group_for(&page.path)?;
        let max_level = depth.saturating_add(1);

        let items = group
            .links
            .iter()
            .map(|link| {
                let active = same_page(&link.path, &page.path);
                let title = link
                    .title
                    .clone()
                    .or_else(|| active.then(|| page.title.clone()))
                    .unwrap_or_else(|| link.path.clone());
                let children = if active {
                    let headings: Vec<_> = page
                        .headings
                        .iter()
                        .filter(|h| (2..=max_level).contains(&h.level))
                        .collect();
                    nest_headings(&link.path, &headings)
                } else {
                    Vec::new()
                };
                SidebarItem {
                    title,
                    path: link.path.clone(),
                    active,
                    children,
                }
            })
            .collect();

        Some(RenderedSidebar {
            prefix: group.prefix.clone(),
            items,
        })
    }
}

/// Whether two normalized prefixes cover any common path.
fn overlaps(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// Nest headings under the nearest preceding heading of a lower level.
fn nest_headings(link_path: &str, headings: &[&PageHeading]) -> Vec<SidebarItem> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < headings.len() {
        let heading = headings[i];
        let end = headings[i + 1..]
            .iter()
            .position(|h| h.level <= heading.level)
            .map_or(headings.len(), |offset| i + 1 + offset);

        items.push(SidebarItem {
            title: heading.title.clone(),
            path: format!("{link_path}#{}", heading.id),
            active: false,
            children: nest_headings(link_path, &headings[i + 1..end]),
        });
        i = end;
    }
    items
}

/// Heading extracted from a page by the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageHeading {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID.
    pub id: String,
}

/// What the sidebar needs to know about the page being rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageOutline {
    pub path: String,
    pub title: String,
    pub headings: Vec<PageHeading>,
}

/// Sidebar item with nested heading children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    pub title: String,
    pub path: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SidebarItem>,
}

/// Sidebar for one page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedSidebar {
    pub prefix: String,
    pub items: Vec<SidebarItem>,
}

/// Sidebar link as written in `guia.toml`: a bare path or `{ path, title }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SidebarLinkSection {
    Path(String),
    Titled { path: String, title: String },
}

impl From<&SidebarLinkSection> for SidebarLink {
    fn from(link: &SidebarLinkSection) -> Self {
        match link {
            SidebarLinkSection::Path(path) => SidebarLink::new(path.clone()),
            SidebarLinkSection::Titled { path, title } => SidebarLink {
                path: path.clone(),
                title: Some(title.clone()),
            },
        }
    }
}

/// Sidebar group as written in `guia.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidebarGroupSection {
    pub prefix: String,
    #[serde(default)]
    pub links: Vec<SidebarLinkSection>,
}

/// Build the sidebar tree in declaration order.
pub fn build_sidebar(groups: &[SidebarGroupSection]) -> Result<SidebarTree, ConfigError> {
    SidebarTree::new(
        groups
            .iter()
            .map(|group| SidebarGroup {
                prefix: group.prefix.clone(),
                links: group.links.iter().map(SidebarLink::from).collect(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn group(prefix: &str, links: &[&str]) -> SidebarGroup {
        SidebarGroup {
            prefix: prefix.to_owned(),
            links: links.iter().map(|l| SidebarLink::new(*l)).collect(),
        }
    }

    fn heading(level: u8, title: &str) -> PageHeading {
        PageHeading {
            level,
            title: title.to_owned(),
            id: title.to_lowercase().replace(' ', "-"),
        }
    }

    fn voz_page(headings: Vec<PageHeading>) -> PageOutline {
        PageOutline {
            path: "/voz/".to_owned(),
            title: "Voz".to_owned(),
            headings,
        }
    }

    fn titles(items: &[SidebarItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_links_keep_declaration_order() {
        let tree = SidebarTree::new(vec![group(
            "/guia/",
            &["/guia/c.html", "/guia/a.html", "/guia/b.html"],
        )])
        .unwrap();

        let page = PageOutline {
            path: "/guia/a.html".to_owned(),
            title: "A".to_owned(),
            headings: Vec::new(),
        };
        let sidebar = tree.render(&page, 1).unwrap();
        let paths: Vec<_> = sidebar.items.iter().map(|i| i.path.as_str()).collect();

        assert_eq!(paths, vec!["/guia/c.html", "/guia/a.html", "/guia/b.html"]);
        assert!(sidebar.items[1].active);
        assert!(!sidebar.items[0].active);
    }

    #[test]
    fn test_prefix_normalized_with_trailing_slash() {
        let tree = SidebarTree::new(vec![group("/voz", &["/voz/"])]).unwrap();
        assert_eq!(tree.groups()[0].prefix, "/voz/");
    }

    #[test]
    fn test_duplicate_prefix_rejected() {
        let err = SidebarTree::new(vec![group("/voz/", &[]), group("/voz", &[])]).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        let msg = err.to_string();
        assert!(msg.contains("theme.sidebar[1].prefix"), "{msg}");
        assert!(msg.contains("already declared by theme.sidebar[0]"), "{msg}");
    }

    #[test]
    fn test_overlapping_prefix_rejected() {
        let err = SidebarTree::new(vec![group("/", &[]), group("/voz/", &[])]).unwrap_err();
        assert!(err.to_string().contains("overlaps \"/\""));

        let err = SidebarTree::new(vec![group("/voz/avanzado/", &[]), group("/voz/", &[])])
            .unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn test_sibling_prefixes_with_shared_stem_are_distinct() {
        let tree = SidebarTree::new(vec![group("/voz/", &[]), group("/vozarron/", &[])]).unwrap();
        assert_eq!(tree.groups().len(), 2);
    }

    #[test]
    fn test_relative_prefix_rejected() {
        let err = SidebarTree::new(vec![group("voz/", &[])]).unwrap_err();
        assert!(err.to_string().contains("theme.sidebar[0].prefix"));
    }

    #[test]
    fn test_relative_link_rejected() {
        let err = SidebarTree::new(vec![group("/voz/", &["/voz/", "conexiones"])]).unwrap_err();
        assert!(err.to_string().contains("theme.sidebar[0].links[1]"));
    }

    #[test]
    fn test_group_for() {
        let tree =
            SidebarTree::new(vec![group("/voz/", &["/voz/"]), group("/guia/", &[])]).unwrap();

        assert_eq!(tree.group_for("/voz/").unwrap().prefix, "/voz/");
        assert_eq!(tree.group_for("/voz").unwrap().prefix, "/voz/");
        assert_eq!(
            tree.group_for("/voz/conexiones.html").unwrap().prefix,
            "/voz/"
        );
        assert_eq!(tree.group_for("/guia/index.html").unwrap().prefix, "/guia/");
        assert!(tree.group_for("/").is_none());
        assert!(tree.group_for("/vozarron/").is_none());
    }

    #[test]
    fn test_sibling_html_page_is_not_in_directory_group() {
        let tree = SidebarTree::new(vec![group("/voz/", &["/voz/"])]).unwrap();

        assert!(tree.group_for("/voz.html").is_none());
        assert!(tree.group_for("/voz.md").is_none());
        assert!(tree.group_for("/voz.html#uso").is_none());
    }

    #[test]
    fn test_render_bare_directory_path_marks_index_active() {
        let tree = SidebarTree::new(vec![group("/voz/", &["/voz/", "/voz/conexiones.html"])])
            .unwrap();
        let page = PageOutline {
            path: "/voz".to_owned(),
            title: "Voz".to_owned(),
            headings: vec![heading(2, "Uso")],
        };

        let sidebar = tree.render(&page, 1).unwrap();

        let active: Vec<_> = sidebar.items.iter().map(|i| i.active).collect();
        assert_eq!(active, vec![true, false]);
        assert_eq!(titles(&sidebar.items[0].children), vec!["Uso"]);
    }

    #[test]
    fn test_render_outside_any_group() {
        let tree = SidebarTree::new(vec![group("/voz/", &["/voz/"])]).unwrap();
        let page = PageOutline {
            path: "/otro/".to_owned(),
            title: "Otro".to_owned(),
            headings: Vec::new(),
        };
        assert!(tree.render(&page, 2).is_none());
    }

    #[test]
    fn test_render_titles() {
        let tree = SidebarTree::new(vec![SidebarGroup {
            prefix: "/voz/".to_owned(),
            links: vec![
                SidebarLink::new("/voz/"),
                SidebarLink {
                    path: "/voz/conexiones.html".to_owned(),
                    title: Some("Conexiones de voz".to_owned()),
                },
                SidebarLink::new("/voz/reproductor.html"),
            ],
        }])
        .unwrap();

        let sidebar = tree.render(&voz_page(Vec::new()), 1).unwrap();

        assert_eq!(
            titles(&sidebar.items),
            vec!["Voz", "Conexiones de voz", "/voz/reproductor.html"]
        );
    }

    #[test]
    fn test_render_depth_limits_heading_levels() {
        let tree = SidebarTree::new(vec![group("/voz/", &["/voz/"])]).unwrap();
        let page = voz_page(vec![
            heading(1, "Voz"),
            heading(2, "Instalacion"),
            heading(3, "Dependencias"),
            heading(4, "Opus"),
            heading(2, "Uso"),
        ]);

        let depth0 = tree.render(&page, 0).unwrap();
        assert!(depth0.items[0].children.is_empty());

        let depth1 = tree.render(&page, 1).unwrap();
        let children = &depth1.items[0].children;
        assert_eq!(titles(children), vec!["Instalacion", "Uso"]);
        assert!(children[0].children.is_empty());
        assert_eq!(children[0].path, "/voz/#instalacion");

        let depth2 = tree.render(&page, 2).unwrap();
        let children = &depth2.items[0].children;
        assert_eq!(titles(children), vec!["Instalacion", "Uso"]);
        assert_eq!(titles(&children[0].children), vec!["Dependencias"]);
        assert!(children[0].children[0].children.is_empty());

        let depth3 = tree.render(&page, 3).unwrap();
        assert_eq!(
            titles(&depth3.items[0].children[0].children[0].children),
            vec!["Opus"]
        );
    }

    #[test]
    fn test_render_orphan_deep_heading_stays_top_level() {
        let tree = SidebarTree::new(vec![group("/voz/", &["/voz/"])]).unwrap();
        let page = voz_page(vec![heading(3, "Suelto"), heading(2, "Uso")]);

        let sidebar = tree.render(&page, 2).unwrap();

        assert_eq!(titles(&sidebar.items[0].children), vec!["Suelto", "Uso"]);
    }

    #[test]
    fn test_parse_link_forms() {
        let toml = r#"
prefix = "/voz/"
links = ["/voz/", { path = "/voz/conexiones.html", title = "Conexiones" }]
"#;
        let section: SidebarGroupSection = toml::from_str(toml).unwrap();
        let tree = build_sidebar(&[section]).unwrap();

        assert_eq!(
            tree.groups()[0].links,
            vec![
                SidebarLink::new("/voz/"),
                SidebarLink {
                    path: "/voz/conexiones.html".to_owned(),
                    title: Some("Conexiones".to_owned()),
                },
            ]
        );
    }
}
