//! Site metadata and document head tags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, require_non_empty};

/// A tag emitted into every page's document head.
///
/// Serialized in the renderer's tuple form: `["meta", {"charset": "utf-8"}]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, BTreeMap<String, String>)")]
#[serde(into = "(String, BTreeMap<String, String>)")]
pub struct HeadTag {
    /// Tag name (`meta`, `link`, ...).
    pub tag: String,
    /// Tag attributes.
    pub attrs: BTreeMap<String, String>,
}

impl HeadTag {
    /// Create a tag without attributes.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Whether this is a `<meta charset>` declaration.
    pub fn is_charset(&self) -> bool {
        self.tag == "meta" && self.attrs.contains_key("charset")
    }

    /// Whether this is a `<meta name="viewport">` declaration.
    pub fn is_viewport(&self) -> bool {
        self.tag == "meta" && self.attrs.get("name").is_some_and(|n| n == "viewport")
    }
}

impl From<(String, BTreeMap<String, String>)> for HeadTag {
    fn from((tag, attrs): (String, BTreeMap<String, String>)) -> Self {
        Self { tag, attrs }
    }
}

impl From<HeadTag> for (String, BTreeMap<String, String>) {
    fn from(tag: HeadTag) -> Self {
        (tag.tag, tag.attrs)
    }
}

/// Global site metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteMetadata {
    /// Language tag (e.g. `es-XL`).
    pub lang: String,
    /// Site title.
    pub title: String,
    /// Site description.
    pub description: String,
    /// Head tags in emission order. Duplicates are kept.
    pub head: Vec<HeadTag>,
}

impl SiteMetadata {
    /// Check required fields and the mandatory head declarations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.lang, "site.lang")?;
        if !self
            .lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::Validation(format!(
                "site.lang must be a language tag like \"es-XL\", got \"{}\"",
                self.lang
            )));
        }
        require_non_empty(&self.title, "site.title")?;

        for (i, tag) in self.head.iter().enumerate() {
            require_non_empty(&tag.tag, &format!("site.head[{i}].tag"))?;
        }
        if !self.head.iter().any(HeadTag::is_charset) {
            return Err(ConfigError::Validation(
                "site.head must declare a charset meta tag".to_owned(),
            ));
        }
        if !self.head.iter().any(HeadTag::is_viewport) {
            return Err(ConfigError::Validation(
                "site.head must declare a viewport meta tag".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Head tag as written in `guia.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadTagSection {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

/// The `[site]` section of `guia.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub lang: String,
    pub title: String,
    pub description: String,
    pub head: Vec<HeadTagSection>,
}

impl SiteSection {
    /// Assemble and validate the site metadata.
    ///
    /// Head tags keep the order they were declared in.
    pub fn build_metadata(&self) -> Result<SiteMetadata, ConfigError> {
        let metadata = SiteMetadata {
            lang: self.lang.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            head: self
                .head
                .iter()
                .map(|h| HeadTag {
                    tag: h.tag.clone(),
                    attrs: h.attrs.clone(),
                })
                .collect(),
        };
        metadata.validate()?;
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn required_head() -> Vec<HeadTagSection> {
        let toml = r#"
[[head]]
tag = "meta"
attrs = { charset = "utf-8" }

[[head]]
tag = "meta"
attrs = { name = "viewport", content = "width=device-width, initial-scale=1.0" }
"#;
        toml::from_str::<SiteSection>(toml).unwrap().head
    }

    fn section() -> SiteSection {
        SiteSection {
            lang: "es-XL".to_owned(),
            title: "Guía de discord.js".to_owned(),
            description: "La guía oficial de discord.js traducida a español.".to_owned(),
            head: required_head(),
        }
    }

    #[test]
    fn test_build_metadata() {
        let metadata = section().build_metadata().unwrap();

        assert_eq!(metadata.lang, "es-XL");
        assert_eq!(metadata.title, "Guía de discord.js");
        assert_eq!(metadata.head.len(), 2);
        assert!(metadata.head[0].is_charset());
        assert!(metadata.head[1].is_viewport());
    }

    #[test]
    fn test_head_order_is_declaration_order() {
        let mut section = section();
        section.head.insert(
            0,
            HeadTagSection {
                tag: "link".to_owned(),
                attrs: BTreeMap::from([
                    ("rel".to_owned(), "icon".to_owned()),
                    ("href".to_owned(), "/favicon.png".to_owned()),
                ]),
            },
        );
        // Viewport before charset is allowed; order is kept as written.
        section.head.swap(1, 2);

        let metadata = section.build_metadata().unwrap();
        let tags: Vec<_> = metadata.head.iter().map(|t| t.tag.as_str()).collect();

        assert_eq!(tags, vec!["link", "meta", "meta"]);
        assert!(metadata.head[1].is_viewport());
        assert!(metadata.head[2].is_charset());
    }

    #[test]
    fn test_duplicate_head_tags_are_kept() {
        let mut section = section();
        section.head.push(section.head[0].clone());

        let metadata = section.build_metadata().unwrap();

        assert_eq!(metadata.head.len(), 3);
        assert_eq!(metadata.head[0], metadata.head[2]);
    }

    #[test]
    fn test_missing_title() {
        let mut section = section();
        section.title = String::new();

        let err = section.build_metadata().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("site.title"));
    }

    #[test]
    fn test_invalid_lang() {
        let mut section = section();
        section.lang = "es XL".to_owned();

        let err = section.build_metadata().unwrap_err();
        assert!(err.to_string().contains("site.lang"));
    }

    #[test]
    fn test_missing_charset() {
        let mut section = section();
        section.head.remove(0);

        let err = section.build_metadata().unwrap_err();
        assert!(err.to_string().contains("charset"));
    }

    #[test]
    fn test_missing_viewport() {
        let mut section = section();
        section.head.remove(1);

        let err = section.build_metadata().unwrap_err();
        assert!(err.to_string().contains("viewport"));
    }

    #[test]
    fn test_head_tag_serializes_as_tuple() {
        let tag = HeadTag::new("meta").attr("charset", "utf-8");

        let json = serde_json::to_string(&tag).unwrap();

        assert_eq!(json, r#"["meta",{"charset":"utf-8"}]"#);
    }
}
