use std::fs::{File, Permissions};
use std::io;
use std::path::Path;

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

fn with_file(e: io::Error, path: &Path) -> io::Error {
    io::Error::new(e.kind(), format!("{} - file={}", e, path.display()))
}

/// Writes `path` through a hidden temporary file in the same directory. The file
/// is moved into place only after `write` succeeds, so `path` never holds a partial
/// write. With `replace` false an existing `path` is an `AlreadyExists` error.
pub fn write_atomically<F>(path: &Path, replace: bool, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| with_file(e, path))?;

    let permissions = match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => new_file_permissions(),
    };
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }

    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    let persisted = if replace {
        tmp.persist(path)
    } else {
        tmp.persist_noclobber(path)
    };
    persisted.map_err(|e| with_file(e.error, path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{ErrorKind, Write};

    use super::*;

    #[test]
    fn test_failed_write_leaves_nothing() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("2024-05-04-partial.md");

        let res = write_atomically(&path, false, |file| {
            file.write_all(b"---\ntitle: half")?;
            Err(io::Error::new(ErrorKind::Other, "disk full"))
        });
        assert_eq!(res.err().unwrap().to_string(), "disk full");
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);

        write_atomically(&path, false, |file| file.write_all(b"complete"))?;
        assert_eq!(fs::read_to_string(&path)?, "complete");
        Ok(())
    }

    #[test]
    fn test_replace() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("questions.csv");
        fs::write(&path, "old")?;

        let err = write_atomically(&path, false, |file| file.write_all(b"new")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path)?, "old");

        write_atomically(&path, true, |file| file.write_all(b"new"))?;
        assert_eq!(fs::read_to_string(&path)?, "new");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
