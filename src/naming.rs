//! Output file naming with collision suffixes.
//!
//! A converted file is written as `<stem>.<ext>`; when that name is taken the
//! candidates `<stem>_1.<ext>`, `<stem>_2.<ext>`, ... are tried in order.
//! Existence is re-checked for every file, so two sources with the same stem
//! in one run get monotonic suffixes.

use std::path::{Path, PathBuf};

/// Returns the first free candidate path in `dir` for `stem` and `ext`.
///
/// `exists` decides whether a candidate is taken, which keeps this function
/// independent of the filesystem.
///
/// ```
/// use officemd::naming::next_free_name;
/// use std::path::Path;
///
/// let taken = ["out/report.md", "out/report_1.md"];
/// let path = next_free_name(Path::new("out"), "report", "md", |p| {
///     taken.iter().any(|t| Path::new(t) == p)
/// });
/// assert_eq!(path, Path::new("out/report_2.md"));
/// ```
pub fn next_free_name<F>(dir: &Path, stem: &str, ext: &str, exists: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let mut candidate = dir.join(file_name(stem, None, ext));
    let mut counter: u32 = 1;

    while exists(&candidate) {
        candidate = dir.join(file_name(stem, Some(counter), ext));
        counter += 1;
    }

    candidate
}

/// [`next_free_name`] against the real filesystem.
pub fn next_free_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    next_free_name(dir, stem, ext, |p| p.exists())
}

/// Output path for `source` in `dir`, named after the source stem.
pub fn output_path_for(source: &Path, dir: &Path, ext: &str) -> PathBuf {
    next_free_path(dir, &source_stem(source), ext)
}

/// File stem of `source` as a UTF-8 string (lossy).
pub fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

fn file_name(stem: &str, counter: Option<u32>, ext: &str) -> String {
    let base = match counter {
        Some(n) => format!("{}_{}", stem, n),
        None => stem.to_string(),
    };
    if ext.is_empty() {
        base
    } else {
        format!("{}.{}", base, ext.trim_start_matches('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_free_name_without_collision() {
        let path = next_free_name(Path::new("out"), "report", "md", |_| false);
        assert_eq!(path, PathBuf::from("out/report.md"));
    }

    #[test]
    fn test_monotonic_suffixes() {
        let mut taken: HashSet<PathBuf> = HashSet::new();
        taken.insert(PathBuf::from("out/report.md"));

        let first = next_free_name(Path::new("out"), "report", "md", |p| taken.contains(p));
        assert_eq!(first, PathBuf::from("out/report_1.md"));
        taken.insert(first);

        let second = next_free_name(Path::new("out"), "report", "md", |p| taken.contains(p));
        assert_eq!(second, PathBuf::from("out/report_2.md"));
    }

    #[test]
    fn test_extension_with_leading_dot() {
        let path = next_free_name(Path::new("d"), "a", ".md", |_| false);
        assert_eq!(path, PathBuf::from("d/a.md"));
    }

    #[test]
    fn test_stem_with_dots() {
        let stem = source_stem(Path::new("docs/v1.2.notes.pdf"));
        assert_eq!(stem, "v1.2.notes");
    }

    #[test]
    fn test_next_free_path_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "x").unwrap();
        let path = next_free_path(dir.path(), "a", "md");
        assert_eq!(path, dir.path().join("a_1.md"));
    }
}
