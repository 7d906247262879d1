//! Defines the site-wide ([`SiteConfig`]) and per-page ([`PageConfig`])
//! configuration types and the logic for merging them into the
//! [`EffectiveConfig`] that a layout is rendered against.
//!
//! Merging is flat: a page value replaces the site value for the same
//! top-level key, and nested mappings or sequences are replaced whole rather
//! than merged.

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the site configuration file at the root of the source tree.
pub const SITE_CONFIG_FILE: &str = "config.yaml";

/// The layout used when neither the page nor the site names one.
pub const DEFAULT_LAYOUT: &str = "layout";

/// Arbitrary configuration values keyed by their top-level name.
pub type Values = BTreeMap<String, Value>;

/// Site-wide configuration, loaded once per build from
/// [`SITE_CONFIG_FILE`].
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// The title of the site.
    pub title: Option<String>,

    /// The absolute URL the site is published under.
    pub base_url: Option<Url>,

    /// The default layout for every page which doesn't name its own.
    pub layout: Option<String>,

    /// The directory holding the layout templates, relative to the source
    /// root.
    pub layouts: PathBuf,

    /// Every other key in the file.
    #[serde(flatten)]
    pub metadata: Values,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            title: None,
            base_url: None,
            layout: None,
            layouts: PathBuf::from("layouts"),
            metadata: Values::new(),
        }
    }
}

impl SiteConfig {
    /// Loads the site configuration from `{source_directory}/config.yaml`.
    /// A missing file is not an error; the default configuration is returned
    /// instead.
    pub fn from_directory(source_directory: &Path) -> Result<SiteConfig> {
        let path = source_directory.join(SITE_CONFIG_FILE);
        if path.is_file() {
            SiteConfig::from_file(&path)
        } else {
            log::warn!(
                "No `{}` found in `{}`; using the default site configuration",
                SITE_CONFIG_FILE,
                source_directory.display()
            );
            Ok(SiteConfig::default())
        }
    }

    /// Loads the site configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<SiteConfig> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        SiteConfig::from_str(&contents).map_err(|err| Error::DeserializeYaml {
            path: path.to_owned(),
            err,
        })
    }

    /// Parses the site configuration from YAML text. Blank text is the
    /// default configuration.
    pub fn from_str(
        input: &str,
    ) -> std::result::Result<SiteConfig, serde_yaml::Error> {
        if is_blank(input) {
            return Ok(SiteConfig::default());
        }
        serde_yaml::from_str(input)
    }

    fn values(&self) -> Values {
        let mut values = self.metadata.clone();
        if let Some(title) = &self.title {
            values.insert("title".to_owned(), Value::String(title.clone()));
        }
        if let Some(base_url) = &self.base_url {
            values.insert(
                "base_url".to_owned(),
                Value::String(base_url.to_string()),
            );
        }
        if let Some(layout) = &self.layout {
            values.insert("layout".to_owned(), Value::String(layout.clone()));
        }
        values
    }
}

/// Per-page configuration, decoded from a content file's front matter.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    /// The title of the page.
    pub title: Option<String>,

    /// The name of the layout to render the page with.
    pub layout: Option<String>,

    /// Every other key in the front matter.
    #[serde(flatten)]
    pub metadata: Values,
}

impl PageConfig {
    /// Parses front matter YAML. Blank front matter is the empty
    /// configuration.
    pub fn from_str(
        input: &str,
    ) -> std::result::Result<PageConfig, serde_yaml::Error> {
        if is_blank(input) {
            return Ok(PageConfig::default());
        }
        serde_yaml::from_str(input)
    }

    fn values(&self) -> Values {
        let mut values = self.metadata.clone();
        if let Some(title) = &self.title {
            values.insert("title".to_owned(), Value::String(title.clone()));
        }
        if let Some(layout) = &self.layout {
            values.insert("layout".to_owned(), Value::String(layout.clone()));
        }
        values
    }
}

/// The configuration a single page is rendered with: the site values
/// overridden key-by-key by the page values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectiveConfig {
    values: Values,
}

impl EffectiveConfig {
    /// Merges `site` and `page`. The key set is the union of both; where a
    /// key appears in both, the page value wins.
    pub fn merge(site: &SiteConfig, page: &PageConfig) -> EffectiveConfig {
        let mut values = site.values();
        values.extend(page.values());
        EffectiveConfig { values }
    }

    /// Returns the raw value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value for `key` rendered as text for substitution into a
    /// layout. Strings are returned verbatim, numbers and booleans in their
    /// usual form, null as the empty string, and sequences or mappings as
    /// inline YAML.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).map(value_to_string)
    }

    /// The name of the layout the page should be rendered with.
    pub fn layout(&self) -> &str {
        match self.get("layout") {
            Some(Value::String(layout)) if !layout.is_empty() => layout,
            _ => DEFAULT_LAYOUT,
        }
    }

    /// Iterates over every key in the configuration.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(_) | Value::Mapping(_) => {
            match serde_yaml::to_string(value) {
                Ok(yaml) => yaml.trim_start_matches("---").trim().to_owned(),
                Err(_) => String::new(),
            }
        }
    }
}

fn is_blank(input: &str) -> bool {
    input.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Represents the result of loading the site configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the site configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the configuration file can't be read.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when the configuration file isn't valid YAML or has values
    /// of the wrong type.
    DeserializeYaml { path: PathBuf, err: serde_yaml::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, .. } => {
                write!(f, "reading site configuration `{}`", path.display())
            }
            Error::DeserializeYaml { path, .. } => {
                write!(f, "decoding site configuration `{}`", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { err, .. } => Some(err),
            Error::DeserializeYaml { err, .. } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn site(yaml: &str) -> SiteConfig {
        SiteConfig::from_str(yaml).unwrap()
    }

    fn page(yaml: &str) -> PageConfig {
        PageConfig::from_str(yaml).unwrap()
    }

    #[test]
    fn test_page_value_overrides_site_value() {
        let effective = EffectiveConfig::merge(
            &site("title: Site\nauthor: Ada\n"),
            &page("title: Page\nauthor: Grace\n"),
        );
        assert_eq!(Some("Page".to_owned()), effective.lookup("title"));
        assert_eq!(Some("Grace".to_owned()), effective.lookup("author"));
    }

    #[test]
    fn test_missing_page_value_falls_back_to_site() {
        let effective = EffectiveConfig::merge(
            &site("title: Site\nauthor: Ada\n"),
            &page("title: Page\n"),
        );
        assert_eq!(Some("Ada".to_owned()), effective.lookup("author"));
    }

    #[test]
    fn test_key_set_is_union() {
        let effective =
            EffectiveConfig::merge(&site("a: 1\n"), &page("b: 2\n"));
        let keys: Vec<&str> = effective.keys().collect();
        assert_eq!(vec!["a", "b"], keys);
    }

    #[test]
    fn test_nested_values_are_replaced_whole() {
        let effective = EffectiveConfig::merge(
            &site("social:\n  github: ada\n  mastodon: ada@example.org\n"),
            &page("social:\n  github: grace\n"),
        );
        match effective.get("social") {
            Some(Value::Mapping(m)) => {
                assert_eq!(1, m.len());
                assert_eq!(
                    Some(&Value::String("grace".to_owned())),
                    m.get(&Value::String("github".to_owned()))
                );
            }
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_layout_defaults() {
        assert_eq!(
            DEFAULT_LAYOUT,
            EffectiveConfig::merge(
                &SiteConfig::default(),
                &PageConfig::default()
            )
            .layout()
        );
        assert_eq!(
            "wide",
            EffectiveConfig::merge(
                &site("layout: wide\n"),
                &PageConfig::default()
            )
            .layout()
        );
        assert_eq!(
            "post",
            EffectiveConfig::merge(
                &site("layout: wide\n"),
                &page("layout: post\n")
            )
            .layout()
        );
    }

    #[test]
    fn test_scalar_lookup() {
        let effective = EffectiveConfig::merge(
            &site("draft: false\nweight: 3\nempty: ~\n"),
            &PageConfig::default(),
        );
        assert_eq!(Some("false".to_owned()), effective.lookup("draft"));
        assert_eq!(Some("3".to_owned()), effective.lookup("weight"));
        assert_eq!(Some(String::new()), effective.lookup("empty"));
        assert_eq!(None, effective.lookup("missing"));
    }

    #[test]
    fn test_base_url_is_validated() {
        assert!(SiteConfig::from_str("base_url: not a url\n").is_err());
        let config = site("base_url: https://example.org/\n");
        assert_eq!(
            Some("https://example.org/".to_owned()),
            EffectiveConfig::merge(&config, &PageConfig::default())
                .lookup("base_url")
        );
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(PageConfig::from_str("title: [a, b]\n").is_err());
    }

    #[test]
    fn test_blank_front_matter() {
        assert_eq!(PageConfig::default(), page("\n# just a comment\n"));
    }

    #[test]
    fn test_missing_site_config_is_default() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            SiteConfig::default(),
            SiteConfig::from_directory(dir.path())?
        );
        Ok(())
    }

    #[test]
    fn test_invalid_site_config_names_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SITE_CONFIG_FILE), "title: [oops\n")
            .unwrap();
        let err = SiteConfig::from_directory(dir.path()).unwrap_err();
        assert!(err.to_string().contains(SITE_CONFIG_FILE));
    }
}
