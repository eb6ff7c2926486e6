use std::fmt::Write;
use std::io::ErrorKind;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::{fs, io};

use chrono::NaiveDate;
use serde::Serialize;
use spdlog::info;

use crate::text_utils::{format_date, slugify};
use crate::util::fs_helper::write_atomically;

/// Everything needed to write a new post.
pub struct NewPost<'a> {
    pub title: &'a str,
    /// Question the outline is written around. Also the source of the slug.
    pub question: &'a str,
    pub date: NaiveDate,
    pub author: &'a str,
    pub layout: &'a str,
    pub categories: &'a [String],
    pub tags: &'a [String],
    pub toc: bool,
}

#[derive(Serialize)]
struct Header<'a> {
    layout: &'a str,
    title: &'a str,
    date: String,
    categories: &'a [String],
    tags: &'a [String],
    toc: bool,
    author: &'a str,
}

/// YAML front matter between `---` lines. Values are quoted and escaped by the
/// YAML serializer, so any title reads back unchanged.
pub fn render_front_matter(post: &NewPost) -> io::Result<String> {
    let header = Header {
        layout: post.layout,
        title: post.title,
        date: format_date(&post.date),
        categories: post.categories,
        tags: post.tags,
        toc: post.toc,
        author: post.author,
    };
    let yaml = serde_yaml::to_string(&header)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error writing front matter: {}", e)))?;
    Ok(format!("---\n{}---\n", yaml))
}

pub fn render_body(question: &str, topic: Option<&str>) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "# The Question: {}", question);
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## 1. Key Concepts");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "Explain the idea simply.");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## 2. Topic Tag");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "**Topic:** #{}", topic.map(|t| t.replace(' ', "")).unwrap_or_default());
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## 3. Real World Story");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "A short case study.");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## 4. Bottlenecks");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "What goes wrong.");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## 5. Resolutions");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "How to fix it.");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## 6. Technologies");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "Tools used.");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## 7. Learn Next");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "Related topics.");

    buf
}

pub fn render_post(post: &NewPost) -> io::Result<String> {
    let topic = post.categories.first().map(|c| c.as_str());
    Ok(format!("{}{}", render_front_matter(post)?, render_body(post.question, topic)))
}

/// `YYYY-MM-DD-slug.md` for a title.
pub fn post_file_name(title: &str, date: &NaiveDate) -> io::Result<String> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(io::Error::new(ErrorKind::InvalidInput,
                                  format!("Title '{}' has no characters usable in a file name", title)));
    }
    Ok(format!("{}-{}.md", format_date(date), slug))
}

pub fn post_path(posts_dir: &Path, post: &NewPost) -> io::Result<PathBuf> {
    Ok(posts_dir.join(post_file_name(post.question, &post.date)?))
}

/// Writes the post into `posts_dir`. An existing file is never replaced, and a
/// failed write leaves no file behind.
pub fn write_post(posts_dir: &Path, post: &NewPost) -> io::Result<PathBuf> {
    let path = post_path(posts_dir, post)?;
    let content = render_post(post)?;
    fs::create_dir_all(posts_dir)
        .map_err(|e| io::Error::new(e.kind(), format!("{} - file={}", e, posts_dir.display())))?;

    write_atomically(&path, false, |file| file.write_all(content.as_bytes()))
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists if path.is_file() => {
                io::Error::new(ErrorKind::AlreadyExists, format!("Post already exists - file={}", path.display()))
            }
            _ => e,
        })?;

    info!("Created post {}", path.display());
    Ok(path)
}
