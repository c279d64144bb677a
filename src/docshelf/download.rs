//! Saving produced files to disk, the counterpart of a browser download.
//!
//! The file is first written to a temporary file in the target directory and
//! then persisted under its final name without clobbering. If that fails the
//! bytes are written directly. An existing file is never overwritten; a
//! numbered name (`report (1).pdf`) is chosen instead.

use crate::error::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const MAX_NUMBERED_COPIES: u32 = 10_000;

/// Writes `bytes` into `dir` as `filename` and returns the path actually used.
pub fn save(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    save_with(dir, filename, bytes, persist_via_temp)
}

fn save_with<F>(dir: &Path, filename: &str, bytes: &[u8], persist: F) -> Result<PathBuf>
where
    F: Fn(&Path, &Path, &[u8]) -> io::Result<()>,
{
    fs::create_dir_all(dir)?;
    let name = sanitize_filename(filename);
    let target = available_path(dir, &name)?;

    match persist(dir, &target, bytes) {
        Ok(()) => debug!(path = %target.display(), "saved file"),
        Err(e) => {
            warn!(error = %e, path = %target.display(), "temp file save failed, writing directly");
            write_new(&target, bytes)?;
        }
    }
    Ok(target)
}

fn write_new(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;
    file.write_all(bytes)
}

fn persist_via_temp(dir: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist_noclobber(target).map_err(|e| e.error)?;
    Ok(())
}

/// Replaces path separators and control characters so the name stays inside `dir`.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.').to_string();
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed
    }
}

fn available_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    for n in 1..=MAX_NUMBERED_COPIES {
        let numbered = match extension {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = dir.join(numbered);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("Too many copies of {} in {}", name, dir.display()),
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_under_the_given_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(dir.path(), "report.pdf", b"%PDF").unwrap();
        assert_eq!(path, dir.path().join("report.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF");
    }

    #[test]
    fn never_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.pdf"), "old").unwrap();

        let first = save(dir.path(), "report.pdf", b"new").unwrap();
        let second = save(dir.path(), "report.pdf", b"newer").unwrap();
        assert_eq!(first, dir.path().join("report (1).pdf"));
        assert_eq!(second, dir.path().join("report (2).pdf"));
        assert_eq!(fs::read_to_string(dir.path().join("report.pdf")).unwrap(), "old");
    }

    fn failing_persist(_: &Path, _: &Path, _: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "no temp files here"))
    }

    #[test]
    fn writes_directly_when_temp_file_persist_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_with(dir.path(), "report.pdf", b"%PDF", failing_persist).unwrap();
        assert_eq!(path, dir.path().join("report.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF");
    }

    #[test]
    fn direct_write_fallback_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.pdf"), "old").unwrap();

        let path = save_with(dir.path(), "report.pdf", b"new", failing_persist).unwrap();
        assert_eq!(path, dir.path().join("report (1).pdf"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_to_string(dir.path().join("report.pdf")).unwrap(), "old");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out/pdfs");
        let path = save(&nested, "a.pdf", b"x").unwrap();
        assert!(path.starts_with(&nested));
    }

    #[test]
    fn strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("a\\b:c.pdf"), "a_b_c.pdf");
        assert_eq!(sanitize_filename("  "), "document");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }
}
