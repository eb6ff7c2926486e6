use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::content::Post;
use crate::lint::{Issue, Rule};

/// Findings that only show up when looking at all posts together. Posts are
/// expected in path order; the later file of a pair gets the finding.
pub fn check_site(posts: &[Post]) -> Vec<(PathBuf, Issue)> {
    let mut found = vec![];
    let mut slugs: HashMap<String, &Path> = HashMap::new();
    let mut titles: HashMap<String, &Path> = HashMap::new();

    for post in posts {
        let path = post.file_name.as_path();

        let slug = post.slug();
        if let Some(first) = slugs.get(&slug) {
            found.push((path.to_path_buf(), Issue::new(Rule::DuplicateSlug, None,
                                                        format!("slug '{}' is already used by {}", slug, first.display()))));
        } else {
            slugs.insert(slug, path);
        }

        let title = post.title().trim().to_lowercase();
        if title.is_empty() {
            continue;
        }
        if let Some(first) = titles.get(&title) {
            found.push((path.to_path_buf(), Issue::new(Rule::DuplicateTitle, post.front_matter.line_of("title"),
                                                        format!("title '{}' is already used by {}", post.title(), first.display()))));
        } else {
            titles.insert(title, path);
        }
    }

    found
}
