use std::collections::{BTreeMap, HashMap};
use std::io;
use std::io::ErrorKind;

use crate::content::Post;

/// Parsed posts, newest first once sorted.
pub struct PostCache {
    posts: Vec<Post>,
    slug_to_index: HashMap<String, usize>,
}

impl PostCache {
    pub fn new() -> PostCache {
        PostCache {
            posts: vec![],
            slug_to_index: Default::default(),
        }
    }

    pub fn add(&mut self, post: Post) -> io::Result<()> {
        let slug = post.slug();
        if let Some(&index) = self.slug_to_index.get(&slug) {
            return Err(io::Error::new(ErrorKind::AlreadyExists,
                                      format!("Slug {} is already used by {} - file={}",
                                              slug, self.posts[index].file_name.display(), post.file_name.display())));
        }

        self.slug_to_index.insert(slug, self.posts.len());
        self.posts.push(post);
        Ok(())
    }

    pub fn sort(&mut self) {
        self.posts.sort_by(|a, b| {
            b.date().cmp(&a.date())
                .then_with(|| a.slug().cmp(&b.slug()))
        });

        self.slug_to_index = self.posts.iter()
            .enumerate()
            .map(|(index, post)| (post.slug(), index))
            .collect();
    }

    pub fn from_slug(&self, slug: &str) -> Option<&Post> {
        self.slug_to_index.get(slug).map(|&index| &self.posts[index])
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn categories(&self) -> BTreeMap<String, usize> {
        Self::count(self.posts.iter().map(|p| &p.front_matter.categories))
    }

    pub fn tags(&self) -> BTreeMap<String, usize> {
        Self::count(self.posts.iter().map(|p| &p.front_matter.tags))
    }

    fn count<'a>(lists: impl Iterator<Item=&'a Vec<String>>) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for list in lists {
            // A post counts once per name even if it repeats it.
            let mut names: Vec<&str> = list.iter().map(|s| s.trim()).collect();
            names.sort();
            names.dedup();
            for name in names {
                *counts.entry(name.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl Default for PostCache {
    fn default() -> Self {
        Self::new()
    }
}
