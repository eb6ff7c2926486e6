use std::path::Path;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use markdown::mdast::Node;
use markdown::ParseOptions;
use regex::Regex;
use spdlog::debug;

use crate::content::PostFileName;

/// A post split at its front matter delimiters.
#[derive(Debug, PartialEq)]
pub struct RawPost<'a> {
    /// YAML text between the delimiters.
    pub header: &'a str,
    /// 1-based line of the first header line.
    pub header_line: usize,
    pub body: &'a str,
    /// 1-based line where the body starts.
    pub body_line: usize,
}

#[derive(Debug, PartialEq)]
pub enum SplitError {
    Missing,
    Unterminated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// 0-based line inside the body.
    pub line: usize,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

pub fn split_front_matter(text: &str) -> Result<RawPost<'_>, SplitError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Err(SplitError::Missing);
    };
    if !is_delimiter(first) {
        return Err(SplitError::Missing);
    }

    let header_start = first.len();
    let mut offset = header_start;
    let mut line_no = 2;

    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let body_start = offset + line.len();
            return Ok(RawPost {
                header: &text[header_start..offset],
                header_line: 2,
                body: &text[body_start..],
                body_line: line_no + 1,
            });
        }
        offset += line.len();
        line_no += 1;
    }

    Err(SplitError::Unterminated)
}

pub fn parse_file_name(path: &Path) -> Option<PostFileName> {
    lazy_static! {
        static ref FILE_NAME_REGEX: Regex = Regex::new(
            r"^(?P<date>\d{4}-\d{2}-\d{2})-(?P<slug>.+)\.(?:md|markdown)$"
        ).unwrap();
    }

    let file_name = path.file_name()?.to_str()?;
    let caps = FILE_NAME_REGEX.captures(file_name)?;
    let date = NaiveDate::parse_from_str(caps.name("date")?.as_str(), "%Y-%m-%d").ok()?;
    let slug = caps.name("slug")?.as_str().to_string();

    Some(PostFileName { date, slug })
}

/// Lowercase words joined by single hyphens.
pub fn is_kebab_slug(slug: &str) -> bool {
    lazy_static! {
        static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
    }
    SLUG_REGEX.is_match(slug)
}

/// 0-based line of `key:` at the top level of a YAML header.
pub fn key_line(header: &str, key: &str) -> Option<usize> {
    header.lines().position(|line| {
        line.strip_prefix(key)
            .map(|rest| rest.trim_start().starts_with(':'))
            .unwrap_or(false)
    })
}

fn heading_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&text.value),
        Node::InlineCode(code) => out.push_str(&code.value),
        _ => {
            for child in node.children().into_iter().flatten() {
                heading_text(child, out);
            }
        }
    }
}

fn collect_headings(node: &Node, headings: &mut Vec<Heading>) {
    if let Node::Heading(heading) = node {
        if heading.depth == 2 || heading.depth == 3 {
            let mut text = String::new();
            heading_text(node, &mut text);
            headings.push(Heading {
                level: heading.depth,
                text: text.trim().to_string(),
                line: heading.position.as_ref().map(|p| p.start.line - 1).unwrap_or(0),
            });
        }
        return;
    }
    for child in node.children().into_iter().flatten() {
        collect_headings(child, headings);
    }
}

/// Level 2 and 3 headings, ATX or setext, as the markdown renderer sees them.
pub fn extract_headings(body: &str) -> Vec<Heading> {
    let mut headings = vec![];
    match markdown::to_mdast(body, &ParseOptions::gfm()) {
        Ok(root) => collect_headings(&root, &mut headings),
        Err(e) => debug!("Could not parse body for headings: {}", e.reason),
    }
    headings
}

/// True when the first non-blank line of the body opens a code fence, the usual
/// shape of generated text pasted without cleanup.
pub fn is_fenced_body(body: &str) -> bool {
    body.lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| {
            let line = line.trim();
            line == "```" || line == "```markdown" || line == "```md"
        })
        .unwrap_or(false)
}
