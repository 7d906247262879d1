//! The library code for the `quire` static site generator. A build walks a
//! source tree and mirrors it into an output tree ([`crate::build`]):
//!
//! 1. Content files (`.md`) are compiled into HTML pages ([`crate::compile`])
//! 2. Every other file is copied verbatim
//!
//! Compiling a page is itself composed of three steps:
//!
//! 1. Splitting the file into YAML front matter and a markdown body, and
//!    rendering the body to HTML ([`crate::page`], [`crate::markdown`])
//! 2. Merging the front matter over the site configuration
//!    ([`crate::config`])
//! 3. Injecting the configuration values and the rendered body into the
//!    page's layout template ([`crate::layout`])

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod compile;
pub mod config;
pub mod layout;
pub mod markdown;
pub mod page;
pub mod scaffold;

pub use crate::build::{build_site, clean, Report, Session};
