//! Copies files under a name carrying a postfix.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// `<dir>/<stem><postfix><ext>` for `path`.
///
/// ```
/// use officemd::rename::postfixed_path;
/// use std::path::Path;
///
/// let path = postfixed_path(Path::new("out/report.docx"), "_final").unwrap();
/// assert_eq!(path, Path::new("out/report_final.docx"));
/// ```
pub fn postfixed_path(path: &Path, postfix: &str) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .ok_or_else(|| Error::InvalidData(format!("no file name in {}", path.display())))?;

    let mut name = stem.to_os_string();
    name.push(postfix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }

    Ok(path.with_file_name(name))
}

/// Copies `path` beside itself under the postfixed name, returning the new path.
///
/// An existing file with that name is overwritten.
pub fn copy_with_postfix(path: &Path, postfix: &str) -> Result<PathBuf> {
    let target = postfixed_path(path, postfix)?;
    if target == path {
        return Err(Error::InvalidData("postfix leaves the file name unchanged".into()));
    }

    std::fs::copy(path, &target)?;
    debug!(source = %path.display(), target = %target.display(), "copied");
    Ok(target)
}
