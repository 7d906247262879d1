//! Loads layout templates and injects a page's configuration and body into
//! them.
//!
//! A layout is plain text with placeholders of the form `{{key}}` (spaces
//! inside the braces are allowed). A key is made of ASCII letters, digits,
//! `_`, `-` and `.`. The reserved `{{body}}` placeholder is replaced with the
//! page's rendered HTML as-is; any other placeholder is replaced with the
//! configuration value for its key, or with nothing when the key isn't set.

use crate::config::EffectiveConfig;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// The placeholder that receives the rendered page body.
pub const BODY_PLACEHOLDER: &str = "body";

/// The extension of layout files in the layout directory.
pub const LAYOUT_EXTENSION: &str = "html";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Loads the layout named by `config` from `layouts_directory` and renders
/// it. `page` is the source file being compiled and is only used to annotate
/// errors.
pub fn inject(
    layouts_directory: &Path,
    config: &EffectiveConfig,
    body: &str,
    page: &Path,
) -> Result<String> {
    let layout = config.layout();
    if !is_valid_name(layout) {
        return Err(Error::InvalidName {
            layout: layout.to_owned(),
            page: page.to_owned(),
        });
    }
    let path = layout_path(layouts_directory, layout);
    let template = match std::fs::read_to_string(&path) {
        Ok(template) => template,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotFound {
                layout: layout.to_owned(),
                path,
                page: page.to_owned(),
            })
        }
        Err(err) => return Err(Error::Io { path, err }),
    };
    Ok(render(&template, config, body))
}

/// Returns the file a layout name resolves to.
pub fn layout_path(layouts_directory: &Path, layout: &str) -> PathBuf {
    layouts_directory.join(format!("{}.{}", layout, LAYOUT_EXTENSION))
}

/// Reports whether `layout` names a file directly inside the layout
/// directory: a single plain path component with no separators.
pub fn is_valid_name(layout: &str) -> bool {
    let mut components = Path::new(layout).components();
    !layout.contains(|c: char| c == '/' || c == '\\')
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
}

/// Substitutes every placeholder in `template`.
pub fn render(template: &str, config: &EffectiveConfig, body: &str) -> String {
    let mut output = String::with_capacity(template.len() + body.len());
    let mut rest = template;
    while let Some(open) = rest.find(OPEN) {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + OPEN.len()..];
        let close = match after_open.find(CLOSE) {
            Some(close) => close,
            None => {
                // unterminated; emit the remainder unchanged
                rest = &rest[open..];
                break;
            }
        };
        let key = after_open[..close].trim();
        if is_key(key) {
            if key == BODY_PLACEHOLDER {
                output.push_str(body);
            } else if let Some(value) = config.lookup(key) {
                output.push_str(&value);
            }
            rest = &after_open[close + CLOSE.len()..];
        } else {
            output.push_str(OPEN);
            rest = after_open;
        }
    }
    output.push_str(rest);
    output
}

fn is_key(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
        })
}

/// Represents the result of a layout operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a layout.
#[derive(Debug)]
pub enum Error {
    /// Returned when the layout requested by a page doesn't exist.
    NotFound {
        layout: String,
        path: PathBuf,
        page: PathBuf,
    },

    /// Returned when the layout name would resolve outside the layout
    /// directory (e.g., `../secrets`).
    InvalidName { layout: String, page: PathBuf },

    /// Returned for other I/O errors reading the layout file.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound { layout, path, page } => write!(
                f,
                "layout `{}` requested by `{}` not found (looked for `{}`)",
                layout,
                page.display(),
                path.display()
            ),
            Error::InvalidName { layout, page } => write!(
                f,
                "invalid layout name `{}` requested by `{}`",
                layout,
                page.display()
            ),
            Error::Io { path, .. } => {
                write!(f, "reading layout `{}`", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound { .. } => None,
            Error::InvalidName { .. } => None,
            Error::Io { err, .. } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{PageConfig, SiteConfig};

    fn config(site: &str, page: &str) -> EffectiveConfig {
        EffectiveConfig::merge(
            &SiteConfig::from_str(site).unwrap(),
            &PageConfig::from_str(page).unwrap(),
        )
    }

    #[test]
    fn test_render() {
        assert_eq!(
            "<h1>Hello</h1><h1>Hi</h1>\n",
            render(
                "<h1>{{title}}</h1>{{body}}",
                &config("", "title: Hello"),
                "<h1>Hi</h1>\n"
            )
        );
    }

    #[test]
    fn test_unresolved_placeholder_is_empty() {
        assert_eq!(
            "<h2></h2>",
            render("<h2>{{subtitle}}</h2>", &config("", ""), "")
        );
    }

    #[test]
    fn test_spaces_inside_braces() {
        assert_eq!(
            "Site - Page",
            render(
                "{{ site_name }} - {{title }}",
                &config("site_name: Site", "title: Page"),
                ""
            )
        );
    }

    #[test]
    fn test_body_is_not_escaped_or_rescanned() {
        assert_eq!(
            "<main><em>{{title}}</em></main>",
            render(
                "<main>{{body}}</main>",
                &config("", "title: Nope"),
                "<em>{{title}}</em>"
            )
        );
    }

    #[test]
    fn test_body_placeholder_is_reserved() {
        assert_eq!(
            "rendered",
            render(
                "{{body}}",
                &config("", "body: from front matter"),
                "rendered"
            )
        );
    }

    #[test]
    fn test_non_keys_are_left_alone() {
        let config = config("", "title: T");
        assert_eq!(
            "{{ not a key }} T",
            render("{{ not a key }} {{title}}", &config, "")
        );
        assert_eq!("{{}}", render("{{}}", &config, ""));
        assert_eq!("T {{title", render("{{title}} {{title", &config, ""));
    }

    #[test]
    fn test_inject_missing_layout() {
        let dir = tempfile::tempdir().unwrap();
        let err = inject(
            dir.path(),
            &config("", "layout: nowhere"),
            "",
            Path::new("posts/hello.md"),
        )
        .unwrap_err();
        match &err {
            Error::NotFound { layout, page, .. } => {
                assert_eq!("nowhere", layout);
                assert_eq!(Path::new("posts/hello.md"), page);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("nowhere"));
        assert!(message.contains("posts/hello.md"));
    }

    #[test]
    fn test_inject_default_layout() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("layout.html"),
            "<title>{{title}}</title>{{body}}",
        )
        .unwrap();
        assert_eq!(
            "<title>Home</title><p>hi</p>",
            inject(
                dir.path(),
                &config("title: Home", ""),
                "<p>hi</p>",
                Path::new("index.md")
            )?
        );
        Ok(())
    }

    #[test]
    fn test_layout_names_stay_inside_layout_directory() {
        let dir = tempfile::tempdir().unwrap();
        let layouts = dir.path().join("layouts");
        std::fs::create_dir(&layouts).unwrap();
        std::fs::write(dir.path().join("outside.html"), "{{body}}").unwrap();

        for name in &["../outside", "sub/page", "sub\\page", "..", "/etc/x"] {
            let err = inject(
                &layouts,
                &config("", &format!("layout: '{}'", name)),
                "",
                Path::new("post.md"),
            )
            .unwrap_err();
            match &err {
                Error::InvalidName { layout, page } => {
                    assert_eq!(*name, layout.as_str());
                    assert_eq!(Path::new("post.md"), page);
                }
                other => panic!("unexpected error for {}: {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("layout"));
        assert!(is_valid_name("blog-post.v2"));
        assert!(!is_valid_name("../layout"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(""));
    }
}
