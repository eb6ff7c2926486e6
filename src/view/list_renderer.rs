use std::collections::BTreeMap;
use std::fmt::Write;
use std::io;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::post_cache::PostCache;
use crate::text_utils::format_date;

#[derive(Serialize)]
struct ListItem<'a> {
    date: Option<String>,
    slug: String,
    title: &'a str,
    categories: &'a [String],
    tags: &'a [String],
    path: &'a Path,
}

#[derive(Serialize)]
struct Taxonomy<'a> {
    categories: &'a BTreeMap<String, usize>,
    tags: &'a BTreeMap<String, usize>,
}

fn to_json<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error writing JSON: {}", e)))
}

fn items(cache: &PostCache) -> Vec<ListItem> {
    cache.posts().iter().map(|post| ListItem {
        date: post.date().map(|d| format_date(&d)),
        slug: post.slug(),
        title: post.title(),
        categories: &post.front_matter.categories,
        tags: &post.front_matter.tags,
        path: &post.file_name,
    }).collect()
}

/// One post per line: `date  slug  title`.
pub fn render_list_text(cache: &PostCache) -> String {
    let mut out = String::new();
    for item in items(cache) {
        let date = item.date.as_deref().unwrap_or("----------");
        let _ = writeln!(out, "{}  {}  {}", date, item.slug, item.title);
    }
    out
}

pub fn render_list_json(cache: &PostCache) -> io::Result<String> {
    to_json(&items(cache))
}

pub fn render_taxonomy_text(cache: &PostCache) -> String {
    let mut out = String::new();
    for (title, counts) in [("Categories", cache.categories()), ("Tags", cache.tags())] {
        let _ = writeln!(out, "{}:", title);
        for (name, count) in &counts {
            let _ = writeln!(out, "  {} ({})", name, count);
        }
    }
    out
}

pub fn render_taxonomy_json(cache: &PostCache) -> io::Result<String> {
    to_json(&Taxonomy {
        categories: &cache.categories(),
        tags: &cache.tags(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::content::Post;

    use super::*;

    fn cache() -> PostCache {
        let mut cache = PostCache::new();
        for (file_name, title, categories, tags) in [
            ("_posts/2024-02-01-cdn.md", "CDN basics", "[Networking]", "[caching, cdn]"),
            ("_posts/2024-03-01-consensus.md", "Raft vs Paxos", "[Distributed Systems]", "[raft]"),
            ("_posts/notes.md", "Loose notes", "[Networking]", "[]"),
        ] {
            let text = format!("---\ntitle: {}\ncategories: {}\ntags: {}\n---\n", title, categories, tags);
            cache.add(Post::from_string(Path::new(file_name), &text).unwrap()).unwrap();
        }
        cache.sort();
        cache
    }

    #[test]
    fn test_list_text() {
        assert_eq!(render_list_text(&cache()), "\
2024-03-01  consensus  Raft vs Paxos
2024-02-01  cdn  CDN basics
----------  notes  Loose notes
");
    }

    #[test]
    fn test_list_json() -> io::Result<()> {
        let json: Value = serde_json::from_str(&render_list_json(&cache())?)?;
        assert_eq!(json[0]["slug"], "consensus");
        assert_eq!(json[0]["date"], "2024-03-01");
        assert_eq!(json[0]["path"], "_posts/2024-03-01-consensus.md");
        assert_eq!(json[2]["date"], Value::Null);
        assert_eq!(json[1]["tags"][1], "cdn");
        Ok(())
    }

    #[test]
    fn test_taxonomy() -> io::Result<()> {
        assert_eq!(render_taxonomy_text(&cache()), "\
Categories:
  Distributed Systems (1)
  Networking (2)
Tags:
  caching (1)
  cdn (1)
  raft (1)
");

        let json: Value = serde_json::from_str(&render_taxonomy_json(&cache())?)?;
        assert_eq!(json["categories"]["Networking"], 2);
        assert_eq!(json["tags"]["raft"], 1);
        Ok(())
    }
}
