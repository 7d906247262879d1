//! Defines the [`Page`] type and the logic for parsing a content file into
//! its front matter ([`PageConfig`]) and rendered body.
//!
//! A content file is structured as follows:
//!
//! 1. Initial frontmatter fence (`---` on a line by itself). Any text before
//!    it is ignored.
//! 2. YAML frontmatter
//! 3. Terminal frontmatter fence (`---` on a line by itself)
//! 4. Markdown body
//!
//! Only the first two fences delimit the front matter; later `---` lines
//! belong to the body.
//!
//! For example:
//!
//! ```md
//! ---
//! title: Hello, world!
//! layout: post
//! ---
//! # Hello
//!
//! World
//! ```

use crate::config::PageConfig;
use crate::markdown;
use std::fmt;

const FENCE: &str = "---";

/// A parsed content file.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The configuration decoded from the front matter.
    pub config: PageConfig,

    /// The body rendered as an HTML fragment.
    pub body: String,
}

/// Parses a content file's text into a [`Page`]. References to other
/// content files in the body (`page.md`) are rewritten to their output names
/// (`page.html`) before the body is rendered.
pub fn parse(input: &str) -> Result<Page> {
    let (frontmatter, body) = split(input)?;
    Ok(Page {
        config: PageConfig::from_str(frontmatter)?,
        body: markdown::to_html(&markdown::rewrite_extensions(body)),
    })
}

/// Splits `input` into its front matter and body sections, discarding any
/// text before the opening fence.
pub fn split(input: &str) -> Result<(&str, &str)> {
    let mut fences = LineSpans::new(input)
        .filter(|&(start, end)| is_fence(&input[start..end]));
    let yaml_start = match fences.next() {
        Some((_, end)) => next_line_start(input, end),
        None => return Err(Error::FrontmatterMissingStartFence),
    };
    match fences.next() {
        Some((start, end)) => Ok((
            &input[yaml_start..start],
            &input[next_line_start(input, end)..],
        )),
        None => Err(Error::FrontmatterMissingEndFence),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_start_matches('\u{feff}').trim_end() == FENCE
}

// Skips past the newline (if any) ending at `end`.
fn next_line_start(input: &str, end: usize) -> usize {
    if input[end..].starts_with('\n') {
        end + 1
    } else {
        end
    }
}

/// Iterates over the `(start, end)` byte offsets of each line in a string,
/// excluding the newline.
struct LineSpans<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> LineSpans<'a> {
    fn new(input: &'a str) -> Self {
        LineSpans { input, offset: 0 }
    }
}

impl Iterator for LineSpans<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        if self.offset >= self.input.len() {
            return None;
        }
        let start = self.offset;
        let end = match self.input[start..].find('\n') {
            Some(i) => start + i,
            None => self.input.len(),
        };
        self.offset = end + 1;
        Some((start, end))
    }
}

/// Represents the result of a [`Page`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Page`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a content file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a content file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),
}

impl Error {
    /// Reports whether the document itself was malformed (as opposed to
    /// its front matter failing to decode).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::FrontmatterMissingStartFence
                | Error::FrontmatterMissingEndFence
        )
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "malformed document: missing opening `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "malformed document: missing closing `---`")
            }
            Error::DeserializeYaml(_) => write!(f, "decoding front matter"),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() -> Result<()> {
        let page = parse("---\ntitle: Hello\n---\n# Hi")?;
        assert_eq!(Some("Hello".to_owned()), page.config.title);
        assert_eq!("<h1>Hi</h1>\n", page.body);
        Ok(())
    }

    #[test]
    fn test_split() -> Result<()> {
        assert_eq!(("a: 1\n", "body\n"), split("---\na: 1\n---\nbody\n")?);
        assert_eq!(("", "body"), split("---\n---\nbody")?);
        assert_eq!(("a: 1\r\n", "body"), split("---\r\na: 1\r\n---\r\nbody")?);
        assert_eq!(("a: 1\n", ""), split("---\na: 1\n---")?);
        Ok(())
    }

    #[test]
    fn test_later_fences_belong_to_body() -> Result<()> {
        let page = parse("---\ntitle: Rule\n---\nabove\n\n---\n\nbelow\n")?;
        assert_eq!("<p>above</p>\n<hr />\n<p>below</p>\n", page.body);
        Ok(())
    }

    #[test]
    fn test_missing_start_fence() {
        let err = parse("title: Hello\n# Hi").unwrap_err();
        assert!(matches!(err, Error::FrontmatterMissingStartFence));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_missing_end_fence() {
        let err = parse("---\ntitle: Hello\n# Hi").unwrap_err();
        assert!(matches!(err, Error::FrontmatterMissingEndFence));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_fence_must_be_whole_line() {
        assert!(matches!(
            split("---\ntitle: a --- b\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
        assert!(matches!(
            split("---- title: a ---\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
    }

    #[test]
    fn test_text_before_opening_fence_is_ignored() -> Result<()> {
        assert_eq!(
            ("title: a\n", "body"),
            split("\n---\ntitle: a\n---\nbody")?
        );
        assert_eq!(
            ("title: a\n", "body"),
            split("intro\n---\ntitle: a\n---\nbody")?
        );
        assert_eq!(("a: 1\n", "body"), split("\u{feff}---\na: 1\n---\nbody")?);

        let page = parse("\n\n---\ntitle: Late\n---\n# Hi")?;
        assert_eq!(Some("Late".to_owned()), page.config.title);
        assert_eq!("<h1>Hi</h1>\n", page.body);
        Ok(())
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, Error::DeserializeYaml(_)));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_self_reference_is_rewritten() -> Result<()> {
        let page = parse("---\ntitle: Self\n---\nSee [this page](page.md).\n")?;
        assert!(page.body.contains("href=\"page.html\""));
        Ok(())
    }
}
