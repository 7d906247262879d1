//! Converts page bodies from markdown to HTML.

use pulldown_cmark::{html, Options, Parser};

/// The extension of content files in the source tree.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// The extension content files are given in the output tree.
pub const HTML_EXTENSION: &str = ".html";

/// Renders `markdown` to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, Parser::new_ext(markdown, options));
    body
}

/// Replaces each `.md` token in `input` with `.html`, so that links between
/// content files (e.g., `[next](next.md)`) point at the compiled output. A
/// token only matches when it isn't followed by another identifier
/// character, so `notes.mdx` and `a.mdown` are left alone. This is a textual
/// substitution; it doesn't know whether the token is part of a link.
pub fn rewrite_extensions(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(i) = rest.find(MARKDOWN_EXTENSION) {
        let after = &rest[i + MARKDOWN_EXTENSION.len()..];
        output.push_str(&rest[..i]);
        match after.chars().next() {
            Some(c) if c.is_alphanumeric() || c == '_' => {
                output.push_str(MARKDOWN_EXTENSION)
            }
            _ => output.push_str(HTML_EXTENSION),
        }
        rest = after;
    }
    output.push_str(rest);
    output
}
