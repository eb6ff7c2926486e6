use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct ContentFile {
    pub file_path: PathBuf,
    pub raw_content: String,
}

impl ContentFile {
    pub fn from_file(file_path: &Path) -> io::Result<ContentFile> {
        if !Self::is_markdown(file_path) {
            return Err(io::Error::new(ErrorKind::Unsupported, format!("Not a markdown file - file={}", file_path.display())));
        }

        let raw_content = fs::read_to_string(file_path)?;

        Ok(ContentFile {
            file_path: file_path.to_path_buf(),
            raw_content,
        })
    }

    pub fn is_post_file(file_name: &str) -> bool {
        Self::is_markdown(Path::new(file_name))
    }

    fn is_markdown(file_name: &Path) -> bool {
        matches!(file_name.extension().and_then(|ext| ext.to_str()), Some("md") | Some("markdown"))
    }
}
