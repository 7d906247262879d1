//! Exports the [`build_site`] function which walks the source tree and
//! mirrors it into the output tree: content files ([`crate::compile`]) are
//! compiled into HTML pages and every other file is copied verbatim. Also
//! exports [`clean`], which removes the output tree.
//!
//! The layout directory and the site configuration file are resources for
//! the build, not part of the site, so they are never copied to the output.
//! Neither is the output directory itself when it lives inside the source
//! tree.
//!
//! The build is fail-fast: the first error aborts the walk. Whatever was
//! written before the error stays on disk.

use crate::compile::{self, Error as CompileError};
use crate::config::{Error as ConfigError, SiteConfig, SITE_CONFIG_FILE};
use crate::markdown::{HTML_EXTENSION, MARKDOWN_EXTENSION};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The state shared by every step of a single build. It's read-only for the
/// duration of the build.
#[derive(Debug, Clone)]
pub struct Session {
    /// The root of the source tree.
    pub source_directory: PathBuf,

    /// The root of the output tree.
    pub output_directory: PathBuf,

    /// The directory layouts are loaded from.
    pub layouts_directory: PathBuf,

    /// The site-wide configuration.
    pub site: SiteConfig,
}

impl Session {
    /// Creates a session. The layout directory is resolved relative to
    /// `source_directory`.
    pub fn new(
        source_directory: &Path,
        output_directory: &Path,
        site: SiteConfig,
    ) -> Session {
        Session {
            layouts_directory: source_directory.join(&site.layouts),
            source_directory: source_directory.to_owned(),
            output_directory: output_directory.to_owned(),
            site,
        }
    }

    /// Reports whether the entry at `path` is a build resource rather than
    /// part of the site.
    fn is_excluded(&self, path: &Path) -> bool {
        path == self.layouts_directory
            || path == self.output_directory
            || path == self.source_directory.join(SITE_CONFIG_FILE)
    }

    /// Returns the output path for a source-relative path. Content files get
    /// the HTML extension; everything else keeps its name.
    pub fn output_path(&self, relative_path: &Path) -> PathBuf {
        let output = self.output_directory.join(relative_path);
        if is_content(relative_path) {
            output.with_extension(HTML_EXTENSION.trim_start_matches('.'))
        } else {
            output
        }
    }
}

/// Reports whether the file at `path` is a content file to be compiled.
pub fn is_content(path: &Path) -> bool {
    let extension = MARKDOWN_EXTENSION.trim_start_matches('.');
    path.extension().map_or(false, |ext| ext == extension)
}

/// Tallies the work done by a successful build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// The number of content files compiled into pages.
    pub pages: usize,

    /// The number of files copied verbatim.
    pub files: usize,

    /// The number of directories mirrored into the output tree.
    pub directories: usize,
}

/// Builds the site in `source_directory` into `output_directory`. Loads the
/// site configuration, then calls [`build`].
pub fn build_site(
    source_directory: &Path,
    output_directory: &Path,
) -> Result<Report> {
    let site = SiteConfig::from_directory(source_directory)?;

    // Canonicalize both roots so that the output directory can be recognized
    // (and skipped) when it's nested inside the source tree.
    let source_directory = canonicalize(source_directory)?;
    create_dir(output_directory)?;
    let output_directory = canonicalize(output_directory)?;
    if source_directory == output_directory {
        return Err(Error::OutputIsSource(source_directory));
    }

    build(&Session::new(&source_directory, &output_directory, site))
}

/// Walks the session's source tree, compiling content files and copying
/// everything else into the output tree.
pub fn build(session: &Session) -> Result<Report> {
    let mut report = Report::default();
    create_dir(&session.output_directory)?;

    let walker = WalkDir::new(&session.source_directory)
        .min_depth(1)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|entry| {
            let excluded = session.is_excluded(entry.path());
            if excluded {
                log::debug!("Skipping `{}`", entry.path().display());
            }
            !excluded
        });

    for result in walker {
        let entry = result?;
        let relative_path = match entry
            .path()
            .strip_prefix(&session.source_directory)
        {
            Ok(relative_path) => relative_path,
            // walkdir only yields descendants of the root
            Err(_) => continue,
        };
        let output_path = session.output_path(relative_path);

        if entry.file_type().is_dir() {
            log::debug!("Creating `{}`", output_path.display());
            create_dir(&output_path)?;
            report.directories += 1;
        } else if is_content(relative_path) {
            log::info!("Compiling `{}`", relative_path.display());
            compile::write_page(session, entry.path(), &output_path)
                .map_err(|err| Error::Compile {
                    path: entry.path().to_owned(),
                    err,
                })?;
            report.pages += 1;
        } else {
            log::debug!("Copying `{}`", relative_path.display());
            copy_file(entry.path(), &output_path)?;
            report.files += 1;
        }
    }

    log::info!(
        "Built {} pages and copied {} files into `{}`",
        report.pages,
        report.files,
        session.output_directory.display()
    );
    Ok(report)
}

/// Removes the output tree. A missing tree is not an error.
pub fn clean(output_directory: &Path) -> Result<()> {
    match std::fs::remove_dir_all(output_directory) {
        Ok(()) => {
            log::info!("Removed `{}`", output_directory.display());
            Ok(())
        }
        Err(e) => match e.kind() {
            io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: output_directory.to_owned(),
                err: e,
            }),
        },
    }
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(dir) = dst.parent() {
        create_dir(dir)?;
    }
    std::fs::copy(src, dst).map_err(|err| Error::Copy {
        src: src.to_owned(),
        dst: dst.to_owned(),
        err,
    })?;
    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
        path: dir.to_owned(),
        err,
    })
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Every variant names the path that
/// caused it.
#[derive(Debug)]
pub enum Error {
    /// Returned when the site configuration can't be loaded.
    Config(ConfigError),

    /// Returned when a content file fails to compile.
    Compile { path: PathBuf, err: CompileError },

    /// Returned when a file can't be copied into the output tree.
    Copy {
        src: PathBuf,
        dst: PathBuf,
        err: io::Error,
    },

    /// Returned when an output directory can't be created.
    CreateDir { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: io::Error },

    /// Returned when the output directory is the source directory.
    OutputIsSource(PathBuf),

    /// Returned for errors walking the source tree.
    Walk(walkdir::Error),

    /// Returned for other I/O errors.
    Io { path: PathBuf, err: io::Error },
}

impl Error {
    /// Returns the path the error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Config(ConfigError::Io { path, .. }) => Some(path),
            Error::Config(ConfigError::DeserializeYaml { path, .. }) => {
                Some(path)
            }
            Error::Compile { path, .. } => Some(path),
            Error::Copy { src, .. } => Some(src),
            Error::CreateDir { path, .. } => Some(path),
            Error::Clean { path, .. } => Some(path),
            Error::OutputIsSource(path) => Some(path),
            Error::Walk(err) => err.path(),
            Error::Io { path, .. } => Some(path),
        }
    }
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::Compile { path, .. } => {
                write!(f, "compiling `{}`", path.display())
            }
            Error::Copy { src, dst, .. } => write!(
                f,
                "copying `{}` to `{}`",
                src.display(),
                dst.display()
            ),
            Error::CreateDir { path, .. } => {
                write!(f, "creating directory `{}`", path.display())
            }
            Error::Clean { path, .. } => {
                write!(f, "cleaning directory `{}`", path.display())
            }
            Error::OutputIsSource(path) => write!(
                f,
                "output directory `{}` is the source directory",
                path.display()
            ),
            Error::Walk(err) => err.fmt(f),
            Error::Io { path, .. } => {
                write!(f, "accessing `{}`", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`]. [`Error::Config`]
    /// and [`Error::Walk`] display as the error they wrap, so they don't
    /// report it again as their source.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use std::error::Error as _;
        match self {
            Error::Config(err) => err.source(),
            Error::Compile { err, .. } => Some(err),
            Error::Copy { err, .. } => Some(err),
            Error::CreateDir { err, .. } => Some(err),
            Error::Clean { err, .. } => Some(err),
            Error::OutputIsSource(_) => None,
            // walkdir's message already includes its I/O cause
            Error::Walk(_) => None,
            Error::Io { err, .. } => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    /// Converts [`ConfigError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ConfigError) -> Error {
        Error::Config(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator while walking the source tree.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}
