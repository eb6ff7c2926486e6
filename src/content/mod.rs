use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use chrono::NaiveDate;

use crate::content::front_matter::parse_front_matter;
use crate::content::parsing_utils::{parse_file_name, split_front_matter, SplitError};
use crate::lint::{Issue, Rule};
use crate::text_utils::PostDate;

pub mod content_file;
pub mod front_matter;
pub mod markdown_renderer;
pub mod parsing_utils;

/// Date and slug encoded in a `YYYY-MM-DD-slug.md` file name.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFileName {
    pub date: NaiveDate,
    pub slug: String,
}

/// Typed view of the front matter. Keys that are missing or have the wrong type
/// are left empty; the linter reports them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<PostDate>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub toc: bool,
    pub layout: Option<String>,
    pub author: Option<String>,
    /// Every key found, in file order.
    pub keys: Vec<String>,
    /// Keys present whose value could not be used.
    pub invalid: Vec<String>,
    /// 1-based file line of each key.
    pub lines: HashMap<String, usize>,
}

impl FrontMatter {
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.lines.get(key).copied()
    }

    pub fn has_valid(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key) && !self.invalid.iter().any(|k| k == key)
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub file_name: PathBuf,
    pub name: Option<PostFileName>,
    pub front_matter: FrontMatter,
    pub body: String,
    /// 1-based line where the body starts.
    pub body_line: usize,
}

impl Post {
    pub fn from(file_name: &Path) -> io::Result<Post> {
        let text = fs::read_to_string(file_name)?;
        Self::from_string(file_name, &text)
    }

    /// Splits and parses a post, collecting every issue found on the way. The post
    /// is returned when its front matter is a mapping, even if some keys are wrong.
    pub fn parse(file_name: &Path, text: &str) -> (Option<Post>, Vec<Issue>) {
        let raw = match split_front_matter(text) {
            Ok(raw) => raw,
            Err(SplitError::Missing) => return (None, vec![
                Issue::new(Rule::MissingFrontMatter, Some(1), "file does not start with a '---' front matter block"),
            ]),
            Err(SplitError::Unterminated) => return (None, vec![
                Issue::new(Rule::UnterminatedFrontMatter, Some(1), "front matter block is never closed with '---'"),
            ]),
        };

        let (front_matter, issues) = parse_front_matter(raw.header, raw.header_line);
        let post = front_matter.map(|front_matter| Post {
            file_name: file_name.to_path_buf(),
            name: parse_file_name(file_name),
            front_matter,
            body: raw.body.to_string(),
            body_line: raw.body_line,
        });
        (post, issues)
    }

    /// Parses a post, failing only when there is no readable front matter.
    pub fn from_string(file_name: &Path, text: &str) -> io::Result<Post> {
        match Self::parse(file_name, text) {
            (Some(post), _) => Ok(post),
            (None, issues) => {
                let reason = issues.first().map(|i| i.message.as_str()).unwrap_or("unreadable front matter");
                Err(io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", reason, file_name.display())))
            }
        }
    }

    pub fn title(&self) -> &str {
        self.front_matter.title.as_deref().unwrap_or("")
    }

    /// Slug from the file name, or the file stem when the name has no date prefix.
    pub fn slug(&self) -> String {
        if let Some(ref name) = self.name {
            return name.slug.clone();
        }
        self.file_name.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Publish day: the front matter date, else the file name date.
    pub fn date(&self) -> Option<NaiveDate> {
        self.front_matter.date.map(|d| d.day())
            .or_else(|| self.name.as_ref().map(|n| n.date))
    }
}
