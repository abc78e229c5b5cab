//! Release notes to HTML.
//!
//! Only a handful of markdown forms are recognised: `#`, `##` and `###`
//! headings and list lines starting with `-` or `*`. Everything else is kept
//! as text with a line break. Input is escaped before any markup is added.

use std::fmt::Write;

use super::RepoId;
use crate::markup::escape_html;

enum Line<'a> {
    Heading(u8, &'a str),
    Item(&'a str),
    Text(&'a str),
}

fn marker<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix).filter(|text| !text.is_empty())
}

fn classify(line: &str) -> Line<'_> {
    if let Some(text) = marker(line, "### ") {
        Line::Heading(3, text)
    } else if let Some(text) = marker(line, "## ") {
        Line::Heading(2, text)
    } else if let Some(text) = marker(line, "# ") {
        Line::Heading(1, text)
    } else if let Some(text) = marker(line, "- ").or_else(|| marker(line, "* ")) {
        Line::Item(text)
    } else {
        Line::Text(line)
    }
}

/// Formats release notes for the plugin information popup.
///
/// Empty notes are replaced by a pointer to the repository's releases page.
pub fn format_changelog(raw: &str, repo: &RepoId) -> String {
    if raw.trim().is_empty() {
        return format!(
            r#"<p>See the <a href="https://github.com/{}/releases">GitHub releases page</a> for changelog.</p>"#,
            escape_html(&repo.to_string())
        );
    }

    let escaped = escape_html(raw);
    let mut html = String::with_capacity(escaped.len() * 2);
    let mut in_list = false;

    for line in escaped.lines() {
        let line = classify(line);

        if let Line::Item(text) = line {
            if !in_list {
                html.push_str("<ul>\n");
                in_list = true;
            }
            let _ = writeln!(html, "<li>{}</li>", text);
            continue;
        }

        if in_list {
            html.push_str("</ul>\n");
            in_list = false;
        }

        match line {
            // Top-level headings become h2 so they sit below the popup title
            Line::Heading(level, text) => {
                let _ = writeln!(html, "<h{n}>{}</h{n}>", text, n = level + 1);
            }
            Line::Text(text) => {
                let _ = writeln!(html, "{}<br />", text);
            }
            Line::Item(_) => {}
        }
    }

    if in_list {
        html.push_str("</ul>\n");
    }

    html.trim_end().to_string()
}
