//! Creates the skeleton of a new site: a site configuration, a default
//! layout and a home page, which together build without further changes.

use crate::config::{DEFAULT_LAYOUT, SITE_CONFIG_FILE};
use crate::layout::LAYOUT_EXTENSION;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const CONFIG: &str = "\
title: My new site
base_url: https://example.org/
description: Built with quire
";

const LAYOUT: &str = "\
<!DOCTYPE html>
<html>
<head>
  <meta charset=\"utf-8\">
  <title>{{title}}</title>
  <meta name=\"description\" content=\"{{description}}\">
</head>
<body>
  <main>
{{body}}
  </main>
</body>
</html>
";

const INDEX: &str = "\
---
title: Home
---
# Welcome

Edit `index.md` to change this page, or add another page and link to it
like [this](index.md).
";

/// Writes a new site skeleton into `root`, creating it if needed. Refuses to
/// overwrite any existing file.
pub fn new_site(root: &Path) -> Result<()> {
    let layout_file = format!("{}.{}", DEFAULT_LAYOUT, LAYOUT_EXTENSION);
    let files = [
        (root.join(SITE_CONFIG_FILE), CONFIG),
        (root.join("layouts").join(layout_file), LAYOUT),
        (root.join("index.md"), INDEX),
    ];

    if let Some((path, _)) = files.iter().find(|(path, _)| path.exists()) {
        return Err(Error::AlreadyExists(path.clone()));
    }

    for (path, contents) in files.iter() {
        write_new(path, contents).map_err(|err| Error::Io {
            path: path.clone(),
            err,
        })?;
        log::info!("Created `{}`", path.display());
    }
    Ok(())
}

fn write_new(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?
        .write_all(contents.as_bytes())
}

/// Represents the result of creating a site.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error creating a site.
#[derive(Debug)]
pub enum Error {
    /// Returned when one of the skeleton files already exists.
    AlreadyExists(PathBuf),

    /// Returned for I/O errors writing the skeleton.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AlreadyExists(path) => {
                write!(f, "refusing to overwrite `{}`", path.display())
            }
            Error::Io { path, .. } => write!(f, "writing `{}`", path.display()),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::AlreadyExists(_) => None,
            Error::Io { err, .. } => Some(err),
        }
    }
}
