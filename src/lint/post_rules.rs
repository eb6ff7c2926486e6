use std::collections::HashSet;

use chrono::NaiveDate;

use crate::config::Rules;
use crate::content::front_matter::KNOWN_KEYS;
use crate::content::parsing_utils::{extract_headings, is_fenced_body, is_kebab_slug};
use crate::content::Post;
use crate::lint::{Issue, Rule};
use crate::text_utils::format_date;

pub struct PostContext<'a> {
    pub post: &'a Post,
    pub rules: &'a Rules,
    pub today: NaiveDate,
}

impl PostContext<'_> {
    fn line_of(&self, key: &str) -> Option<usize> {
        self.post.front_matter.line_of(key)
    }
}

pub type PostCheck = fn(&PostContext, &mut Vec<Issue>);

pub const POST_CHECKS: &[PostCheck] = &[
    check_title,
    check_layout,
    check_taxonomy,
    check_unknown_keys,
    check_file_name,
    check_publish_date,
    check_body,
];

fn check_title(ctx: &PostContext, issues: &mut Vec<Issue>) {
    if let Some(ref title) = ctx.post.front_matter.title {
        if title.trim().is_empty() {
            issues.push(Issue::new(Rule::EmptyTitle, ctx.line_of("title"), "title is empty"));
        }
    }
}

fn check_layout(ctx: &PostContext, issues: &mut Vec<Issue>) {
    if let Some(ref layout) = ctx.post.front_matter.layout {
        if *layout != ctx.rules.layout {
            issues.push(Issue::new(Rule::UnexpectedLayout, ctx.line_of("layout"),
                                   format!("layout is '{}', expected '{}'", layout, ctx.rules.layout)));
        }
    }
}

fn duplicates(values: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut dups = vec![];
    for value in values {
        let key = value.trim().to_lowercase();
        if !seen.insert(key.clone()) && reported.insert(key) {
            dups.push(value.as_str());
        }
    }
    dups
}

fn check_taxonomy(ctx: &PostContext, issues: &mut Vec<Issue>) {
    let front_matter = &ctx.post.front_matter;

    for (key, values) in [("categories", &front_matter.categories), ("tags", &front_matter.tags)] {
        for dup in duplicates(values) {
            issues.push(Issue::new(Rule::DuplicateTag, ctx.line_of(key),
                                   format!("'{}' is listed more than once in {}", dup, key)));
        }
    }

    if front_matter.has_valid("categories") && front_matter.categories.is_empty() {
        issues.push(Issue::new(Rule::EmptyCategories, ctx.line_of("categories"), "categories list is empty"));
    }

    if !ctx.rules.categories.is_empty() {
        for category in &front_matter.categories {
            if !ctx.rules.categories.contains(category) {
                issues.push(Issue::new(Rule::UnknownCategory, ctx.line_of("categories"),
                                       format!("category '{}' is not in the configured vocabulary", category)));
            }
        }
    }
}

fn check_unknown_keys(ctx: &PostContext, issues: &mut Vec<Issue>) {
    if ctx.rules.allow_unknown_keys {
        return;
    }

    for key in &ctx.post.front_matter.keys {
        let known = KNOWN_KEYS.contains(&key.as_str()) || ctx.rules.extra_keys.contains(key);
        if !known {
            issues.push(Issue::new(Rule::UnknownKey, ctx.line_of(key), format!("unknown key '{}'", key)));
        }
    }
}

fn check_file_name(ctx: &PostContext, issues: &mut Vec<Issue>) {
    let Some(ref name) = ctx.post.name else {
        let file_name = ctx.post.file_name.file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        issues.push(Issue::new(Rule::BadFileName, None,
                               format!("file name '{}' does not follow YYYY-MM-DD-slug.md", file_name)));
        return;
    };

    if let Some(date) = ctx.post.front_matter.date {
        if date.day() != name.date {
            issues.push(Issue::new(Rule::DateMismatch, ctx.line_of("date"),
                                   format!("date {} does not match the file name date {}", date, format_date(&name.date))));
        }
    }

    if !is_kebab_slug(&name.slug) {
        issues.push(Issue::new(Rule::SlugFormat, None,
                               format!("slug '{}' should be lowercase words joined by '-'", name.slug)));
    }
}

fn check_publish_date(ctx: &PostContext, issues: &mut Vec<Issue>) {
    let Some(date) = ctx.post.date() else {
        return;
    };
    let line = ctx.line_of("date");

    if !ctx.rules.allow_future && date > ctx.today {
        issues.push(Issue::new(Rule::FutureDate, line,
                               format!("post is dated {} and will not be published before then", format_date(&date))));
    }

    if let Some(earliest) = ctx.rules.earliest_date {
        if date < earliest.0 {
            issues.push(Issue::new(Rule::BeforeEarliestDate, line,
                                   format!("post is dated {}, before {}", format_date(&date), format_date(&earliest.0))));
        }
    }
}

fn check_body(ctx: &PostContext, issues: &mut Vec<Issue>) {
    let post = ctx.post;

    let Some(first) = post.body.lines().position(|line| !line.trim().is_empty()) else {
        issues.push(Issue::new(Rule::EmptyBody, Some(post.body_line), "post body is empty"));
        return;
    };

    if is_fenced_body(&post.body) {
        issues.push(Issue::new(Rule::FencedBody, Some(post.body_line + first),
                               "post body is wrapped in a code fence and will render as code"));
    }

    if post.front_matter.toc && extract_headings(&post.body).is_empty() {
        issues.push(Issue::new(Rule::TocWithoutHeadings, ctx.line_of("toc"),
                               "toc is enabled but the body has no '##' or '###' headings"));
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::util::toml_date::TomlDate;

    use super::*;

    fn run(file_name: &str, text: &str, rules: &Rules) -> Vec<Issue> {
        let post = Post::from_string(Path::new(file_name), text).unwrap();
        let ctx = PostContext {
            post: &post,
            rules,
            today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let mut issues = vec![];
        for check in POST_CHECKS {
            check(&ctx, &mut issues);
        }
        issues
    }

    fn post_text(front_matter: &str, body: &str) -> String {
        format!("---\n{}---\n{}", front_matter, body)
    }

    const GOOD: &str = "layout: post\ntitle: Redis leaderboards\ndate: 2024-05-20\ncategories: [Databases]\ntags: [redis]\n";

    #[test]
    fn test_good_post() {
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(GOOD, "Sorted sets.\n"), &Rules::default());
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_empty_title_and_layout() {
        let fm = "layout: default\ntitle: '  '\ndate: 2024-05-20\ncategories: [Databases]\ntags: []\n";
        let issues = run("2024-05-20-redis.md", &post_text(fm, "Body\n"), &Rules::default());
        let rules: Vec<Rule> = issues.iter().map(|i| i.rule).collect();
        assert_eq!(rules, [Rule::EmptyTitle, Rule::UnexpectedLayout]);
        assert_eq!(issues[0].line, Some(3));
        assert_eq!(issues[1].line, Some(2));
    }

    #[test]
    fn test_date_mismatch_uses_calendar_day() {
        let fm = GOOD.replace("date: 2024-05-20", "date: 2024-05-21 00:30:00 +0200");
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(&fm, "Body\n"), &Rules::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, Rule::DateMismatch);
        assert_eq!(issues[0].line, Some(4));
    }

    #[test]
    fn test_bad_file_name() {
        let issues = run("redis-leaderboards.md", &post_text(GOOD, "Body\n"), &Rules::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, Rule::BadFileName);
    }

    #[test]
    fn test_categories_vocabulary_and_empty_list() {
        let rules = Rules {
            categories: vec!["Networking".to_string()],
            ..Rules::default()
        };
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(GOOD, "Body\n"), &rules);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, Rule::UnknownCategory);

        let fm = GOOD.replace("[Databases]", "[]");
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(&fm, "Body\n"), &Rules::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, Rule::EmptyCategories);
    }

    #[test]
    fn test_unknown_keys() {
        let fm = format!("{}image: /a.png\ndescription: x\n", GOOD);
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(&fm, "Body\n"), &Rules::default());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.rule == Rule::UnknownKey));

        let rules = Rules {
            extra_keys: vec!["image".to_string()],
            ..Rules::default()
        };
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(&fm, "Body\n"), &rules);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("description"));

        let rules = Rules {
            allow_unknown_keys: true,
            ..Rules::default()
        };
        assert!(run("2024-05-20-redis-leaderboards.md", &post_text(&fm, "Body\n"), &rules).is_empty());
    }

    #[test]
    fn test_publish_dates() {
        let fm = GOOD.replace("2024-05-20", "2024-07-01");
        let issues = run("2024-07-01-redis-leaderboards.md", &post_text(&fm, "Body\n"), &Rules::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, Rule::FutureDate);

        let rules = Rules {
            allow_future: true,
            earliest_date: Some(TomlDate(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())),
            ..Rules::default()
        };
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(GOOD, "Body\n"), &rules);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, Rule::BeforeEarliestDate);
    }

    #[test]
    fn test_body_checks() {
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(GOOD, "\n  \n"), &Rules::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, Rule::EmptyBody);
        assert_eq!(issues[0].line, Some(8));

        let fm = format!("{}toc: true\n", GOOD);
        let issues = run("2024-05-20-redis-leaderboards.md", &post_text(&fm, "\n```markdown\nplain\n```\n"), &Rules::default());
        let rules: Vec<Rule> = issues.iter().map(|i| i.rule).collect();
        assert_eq!(rules, [Rule::FencedBody, Rule::TocWithoutHeadings]);
        assert_eq!(issues[0].line, Some(10));
        assert_eq!(issues[1].line, Some(7));
    }
}
