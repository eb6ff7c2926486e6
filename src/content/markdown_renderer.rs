use std::collections::HashMap;
use std::fmt::Write;
use std::io;
use std::io::ErrorKind;

use lazy_static::lazy_static;
use markdown::Options;
use regex::{Captures, Regex};

use crate::content::Post;
use crate::text_utils::anchor_id;

#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub level: usize,
    pub id: String,
    /// Heading text, already HTML escaped.
    pub text: String,
}

pub struct RenderedPost {
    pub html: String,
    pub toc: Option<String>,
}

pub struct MarkdownRenderer {}

impl MarkdownRenderer {
    pub fn render(post: &Post) -> io::Result<RenderedPost> {
        let html = match markdown::to_html_with_options(post.body.as_str(), &Options::gfm()) {
            Ok(x) => x,
            Err(e) => return Err(io::Error::new(ErrorKind::InvalidInput,
                                                format!("{} - file={}", e.reason, post.file_name.display()))),
        };

        let (html, entries) = Self::add_anchors(&html);
        let toc = if post.front_matter.toc {
            Some(Self::render_toc(&entries))
        } else {
            None
        };

        Ok(RenderedPost { html, toc })
    }

    /// Gives every `h2`/`h3` an id and returns them in document order.
    pub fn add_anchors(html: &str) -> (String, Vec<TocEntry>) {
        lazy_static! {
            static ref HEADING_RE: Regex = Regex::new(r"(?s)<h([23])>(.*?)</h[23]>").unwrap();
            static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
            static ref ENTITY_RE: Regex = Regex::new(r"&#?[a-zA-Z0-9]+;").unwrap();
        }

        let mut entries = vec![];
        let mut seen: HashMap<String, usize> = HashMap::new();

        let html = HEADING_RE.replace_all(html, |caps: &Captures| {
            let level = &caps[1];
            let inner = &caps[2];
            let text = TAG_RE.replace_all(inner, "").trim().to_string();
            let base = anchor_id(&ENTITY_RE.replace_all(&text, ""));

            let count = seen.entry(base.clone()).or_insert(0);
            let id = if *count == 0 { base } else { format!("{}-{}", base, count) };
            *count += 1;

            let result = format!("<h{} id=\"{}\">{}</h{}>", level, id, inner, level);
            entries.push(TocEntry {
                level: if level == "2" { 2 } else { 3 },
                id,
                text,
            });
            result
        }).to_string();

        (html, entries)
    }

    pub fn render_toc(entries: &[TocEntry]) -> String {
        let mut out = String::from("<nav class=\"toc\">\n<ul>\n");
        let mut open_item = false;
        let mut open_sub = false;

        for entry in entries {
            if entry.level == 2 {
                if open_sub {
                    out.push_str("</ul>\n");
                    open_sub = false;
                }
                if open_item {
                    out.push_str("</li>\n");
                }
                let _ = write!(out, "<li><a href=\"#{}\">{}</a>", entry.id, entry.text);
                open_item = true;
            } else {
                if !open_sub {
                    if !open_item {
                        out.push_str("<li>");
                        open_item = true;
                    }
                    out.push_str("\n<ul>\n");
                    open_sub = true;
                }
                let _ = writeln!(out, "<li><a href=\"#{}\">{}</a></li>", entry.id, entry.text);
            }
        }

        if open_sub {
            out.push_str("</ul>\n");
        }
        if open_item {
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n</nav>\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::test_data::{POST_DATA, POST_FILE_NAME};

    use super::*;

    #[test]
    fn test_render_post() {
        let post = Post::from_string(Path::new(POST_FILE_NAME), POST_DATA).unwrap();
        let rendered = MarkdownRenderer::render(&post).unwrap();

        assert!(rendered.html.contains("<h2 id=\"1-key-concepts\">1. Key Concepts</h2>"));
        assert!(rendered.html.contains("<h3 id=\"health-checks\">Health checks</h3>"));
        assert!(rendered.html.contains("<h2 id=\"2-bottlenecks\">2. Bottlenecks</h2>"));
        assert!(rendered.html.contains("## not a heading"));

        let toc = rendered.toc.unwrap();
        assert_eq!(toc, "<nav class=\"toc\">\n<ul>\n\
<li><a href=\"#1-key-concepts\">1. Key Concepts</a>\n<ul>\n\
<li><a href=\"#health-checks\">Health checks</a></li>\n\
</ul>\n</li>\n\
<li><a href=\"#2-bottlenecks\">2. Bottlenecks</a></li>\n\
</ul>\n</nav>\n");
    }

    #[test]
    fn test_no_toc_when_disabled() {
        let text = POST_DATA.replace("toc: true", "toc: false");
        let post = Post::from_string(Path::new(POST_FILE_NAME), &text).unwrap();
        let rendered = MarkdownRenderer::render(&post).unwrap();
        assert!(rendered.toc.is_none());
        assert!(rendered.html.contains("id=\"health-checks\""));
    }

    #[test]
    fn test_duplicate_anchors() {
        let (html, entries) = MarkdownRenderer::add_anchors("<h2>Setup</h2>\n<h3>Setup</h3>\n<h2><code>Setup</code></h2>\n<h1>Top</h1>");
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["setup", "setup-1", "setup-2"]);
        assert!(html.contains("<h2 id=\"setup-2\"><code>Setup</code></h2>"));
        assert!(html.contains("<h1>Top</h1>"));
    }

    #[test]
    fn test_entities_left_out_of_ids() {
        let (_, entries) = MarkdownRenderer::add_anchors("<h2>Q&amp;A</h2>");
        assert_eq!(entries[0].id, "qa");
        assert_eq!(entries[0].text, "Q&amp;A");
    }

    #[test]
    fn test_sub_heading_first() {
        let entries = vec![
            TocEntry { level: 3, id: "a".to_string(), text: "A".to_string() },
            TocEntry { level: 2, id: "b".to_string(), text: "B".to_string() },
        ];
        let toc = MarkdownRenderer::render_toc(&entries);
        assert_eq!(toc, "<nav class=\"toc\">\n<ul>\n<li>\n<ul>\n<li><a href=\"#a\">A</a></li>\n</ul>\n</li>\n<li><a href=\"#b\">B</a></li>\n</ul>\n</nav>\n");
    }
}
