use std::{fs, io};
use std::path::{Path, PathBuf};

use spdlog::debug;

use crate::content::content_file::ContentFile;

pub struct PostList {
    pub root_dir: PathBuf,
}

impl PostList {
    /// All post files below `root_dir`, sorted by path. Entries starting with
    /// `.` or `_` are drafts or includes and are skipped.
    pub fn retrieve_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut posts = vec![];
        Self::walk(self.root_dir.as_path(), &mut posts)?;
        posts.sort();
        Ok(posts)
    }

    fn walk(dir: &Path, posts: &mut Vec<PathBuf>) -> io::Result<()> {
        let entries = fs::read_dir(dir)?;
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                debug!("Skipping non UTF-8 entry {}", entry.path().display());
                continue;
            };
            if file_name.starts_with('.') || file_name.starts_with('_') {
                continue;
            }

            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                Self::walk(&entry.path(), posts)?;
            } else if file_type.is_file() && ContentFile::is_post_file(file_name) {
                posts.push(entry.path());
            }
        }
        Ok(())
    }
}
