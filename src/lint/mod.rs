use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spdlog::{debug, info};

use crate::config::Rules;
use crate::content::content_file::ContentFile;
use crate::content::Post;
use crate::post_cache::PostCache;
use crate::post_list::PostList;

pub mod post_rules;
pub mod site_rules;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    UnreadableFile,
    MissingFrontMatter,
    UnterminatedFrontMatter,
    InvalidYaml,
    FrontMatterNotMapping,
    MissingKey,
    WrongType,
    EmptyTitle,
    InvalidDate,
    UnexpectedLayout,
    DuplicateTag,
    EmptyCategories,
    UnknownKey,
    UnknownCategory,
    BadFileName,
    DateMismatch,
    SlugFormat,
    FutureDate,
    BeforeEarliestDate,
    FencedBody,
    EmptyBody,
    TocWithoutHeadings,
    DuplicateSlug,
    DuplicateTitle,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        match self {
            Rule::UnreadableFile => "unreadable-file",
            Rule::MissingFrontMatter => "missing-front-matter",
            Rule::UnterminatedFrontMatter => "unterminated-front-matter",
            Rule::InvalidYaml => "invalid-yaml",
            Rule::FrontMatterNotMapping => "front-matter-not-mapping",
            Rule::MissingKey => "missing-key",
            Rule::WrongType => "wrong-type",
            Rule::EmptyTitle => "empty-title",
            Rule::InvalidDate => "invalid-date",
            Rule::UnexpectedLayout => "unexpected-layout",
            Rule::DuplicateTag => "duplicate-tag",
            Rule::EmptyCategories => "empty-categories",
            Rule::UnknownKey => "unknown-key",
            Rule::UnknownCategory => "unknown-category",
            Rule::BadFileName => "bad-file-name",
            Rule::DateMismatch => "date-mismatch",
            Rule::SlugFormat => "slug-format",
            Rule::FutureDate => "future-date",
            Rule::BeforeEarliestDate => "before-earliest-date",
            Rule::FencedBody => "fenced-body",
            Rule::EmptyBody => "empty-body",
            Rule::TocWithoutHeadings => "toc-without-headings",
            Rule::DuplicateSlug => "duplicate-slug",
            Rule::DuplicateTitle => "duplicate-title",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Rule::DuplicateTag
            | Rule::EmptyCategories
            | Rule::UnknownKey
            | Rule::UnknownCategory
            | Rule::SlugFormat
            | Rule::FutureDate
            | Rule::BeforeEarliestDate
            | Rule::FencedBody
            | Rule::EmptyBody
            | Rule::TocWithoutHeadings
            | Rule::DuplicateTitle => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A finding before it is attached to a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub rule: Rule,
    /// 1-based line in the post file.
    pub line: Option<usize>,
    pub message: String,
}

impl Issue {
    pub fn new(rule: Rule, line: Option<usize>, message: impl Into<String>) -> Self {
        Issue {
            rule,
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub line: Option<usize>,
    pub rule: Rule,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn from_issue(path: &Path, issue: Issue) -> Self {
        Diagnostic {
            path: path.to_path_buf(),
            line: issue.line,
            severity: issue.rule.severity(),
            rule: issue.rule,
            message: issue.message,
        }
    }
}

#[derive(Debug, Default)]
pub struct LintReport {
    pub files_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn errors(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warnings(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn failed(&self, strict: bool) -> bool {
        self.errors() > 0 || (strict && self.warnings() > 0)
    }

    fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.path.cmp(&b.path)
                .then(a.line.unwrap_or(0).cmp(&b.line.unwrap_or(0)))
        });
    }
}

pub struct LintOutcome {
    pub report: LintReport,
    pub posts: PostCache,
}

pub struct Linter<'a> {
    rules: &'a Rules,
    today: NaiveDate,
}

impl<'a> Linter<'a> {
    pub fn new(rules: &'a Rules, today: NaiveDate) -> Self {
        Linter { rules, today }
    }

    fn keep(&self, path: &Path, issues: Vec<Issue>, out: &mut Vec<Diagnostic>) {
        for issue in issues {
            if self.rules.is_enabled(issue.rule) {
                out.push(Diagnostic::from_issue(path, issue));
            }
        }
    }

    /// Checks a single post. The post is returned when its front matter could be
    /// read as a mapping, even if some keys are wrong.
    pub fn lint_text(&self, path: &Path, text: &str) -> (Option<Post>, Vec<Diagnostic>) {
        let mut diagnostics = vec![];

        let (post, issues) = Post::parse(path, text);
        self.keep(path, issues, &mut diagnostics);

        let Some(post) = post else {
            return (None, diagnostics);
        };

        let ctx = post_rules::PostContext {
            post: &post,
            rules: self.rules,
            today: self.today,
        };
        let mut issues = vec![];
        for check in post_rules::POST_CHECKS {
            check(&ctx, &mut issues);
        }
        self.keep(path, issues, &mut diagnostics);

        debug!("Checked {}: {} findings", path.display(), diagnostics.len());
        (Some(post), diagnostics)
    }

    pub fn lint_file(&self, path: &Path) -> (Option<Post>, Vec<Diagnostic>) {
        match ContentFile::from_file(path) {
            Ok(file) => self.lint_text(&file.file_path, &file.raw_content),
            Err(e) => {
                let mut diagnostics = vec![];
                let issue = Issue::new(Rule::UnreadableFile, None, format!("could not read file: {}", e));
                self.keep(path, vec![issue], &mut diagnostics);
                (None, diagnostics)
            }
        }
    }

    /// Checks every post under `posts_dir`, then the rules spanning several posts.
    pub fn lint_dir(&self, posts_dir: &Path) -> io::Result<LintOutcome> {
        let post_list = PostList { root_dir: posts_dir.to_path_buf() };
        let files = post_list.retrieve_files()?;
        info!("Checking {} post files in {}", files.len(), posts_dir.display());

        let mut report = LintReport::default();
        let mut posts = vec![];
        for file in files {
            let (post, diagnostics) = self.lint_file(&file);
            report.files_checked += 1;
            report.diagnostics.extend(diagnostics);
            if let Some(post) = post {
                posts.push(post);
            }
        }

        for (path, issue) in site_rules::check_site(&posts) {
            if self.rules.is_enabled(issue.rule) {
                report.diagnostics.push(Diagnostic::from_issue(&path, issue));
            }
        }
        report.sort();

        let mut cache = PostCache::new();
        for post in posts {
            if let Err(e) = cache.add(post) {
                debug!("Post left out of the catalog: {}", e);
            }
        }
        cache.sort();

        info!("{} files checked: {} errors, {} warnings", report.files_checked, report.errors(), report.warnings());
        Ok(LintOutcome { report, posts: cache })
    }
}
