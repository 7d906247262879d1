//! Compiles a single content file into a finished HTML document: parse the
//! page ([`crate::page`]), merge its configuration with the site's
//! ([`crate::config`]), and inject the result into its layout
//! ([`crate::layout`]).

use crate::build::Session;
use crate::config::EffectiveConfig;
use crate::layout::{self, Error as LayoutError};
use crate::page::{self, Error as PageError};
use std::fmt;
use std::io;
use std::path::Path;

/// Compiles the content file at `source` and returns the HTML document.
pub fn compile_page(session: &Session, source: &Path) -> Result<String> {
    let input = std::fs::read_to_string(source)?;
    compile_str(session, &input, source)
}

/// Compiles content file text. `source` is only used to annotate errors.
pub fn compile_str(
    session: &Session,
    input: &str,
    source: &Path,
) -> Result<String> {
    let page = page::parse(input)?;
    let config = EffectiveConfig::merge(&session.site, &page.config);
    Ok(layout::inject(
        &session.layouts_directory,
        &config,
        &page.body,
        source,
    )?)
}

/// Compiles the content file at `source` and writes it to `destination`,
/// creating its parent directory if needed. Nothing is written unless the
/// page compiles.
pub fn write_page(
    session: &Session,
    source: &Path,
    destination: &Path,
) -> Result<()> {
    let html = compile_page(session, source)?;
    if let Some(dir) = destination.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(destination, html)?;
    Ok(())
}

/// Represents the result of compiling a page.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error compiling a page.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content file is malformed or its front matter
    /// can't be decoded.
    Page(PageError),

    /// Returned when the page's layout can't be loaded.
    Layout(LayoutError),

    /// Returned for I/O errors reading the source or writing the output.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Page(err) => err.fmt(f),
            Error::Layout(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`]. [`Error`]
    /// displays as the error it wraps, so the source is that error's source.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use std::error::Error as _;
        match self {
            Error::Page(err) => err.source(),
            Error::Layout(err) => err.source(),
            Error::Io(err) => err.source(),
        }
    }
}

impl From<PageError> for Error {
    /// Converts a [`PageError`] into an [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: PageError) -> Error {
        Error::Page(err)
    }
}

impl From<LayoutError> for Error {
    /// Converts a [`LayoutError`] into an [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: LayoutError) -> Error {
        Error::Layout(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
