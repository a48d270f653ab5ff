//! ZIP container wrapper for OOXML packages (.docx, .pptx, .xlsx).

use crate::error::{Error, Result};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// ZIP container wrapper for OOXML files.
pub struct OoxmlPackage {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl OoxmlPackage {
    /// Opens a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Opens a package from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Opens a package from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = ZipArchive::new(cursor)?;
        Ok(Self { archive })
    }

    /// Reads a part from the archive as UTF-8 string.
    pub fn read_file(&mut self, path: &str) -> Result<String> {
        let data = self.read_binary(path)?;
        Ok(String::from_utf8(data)?)
    }

    /// Reads a binary part from the archive.
    pub fn read_binary(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Lists part names in archive order.
    pub fn list_files(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Lists part names matching `prefix` + digits + `suffix`, sorted by the number.
    ///
    /// `ppt/slides/slide10.xml` sorts after `ppt/slides/slide9.xml`.
    pub fn list_numbered(&self, prefix: &str, suffix: &str) -> Vec<String> {
        let mut numbered: Vec<(u32, String)> = self
            .archive
            .file_names()
            .filter_map(|name| {
                let number = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
                let n: u32 = number.parse().ok()?;
                Some((n, name.to_string()))
            })
            .collect();
        numbered.sort();
        numbered.into_iter().map(|(_, name)| name).collect()
    }

    /// Checks if a part exists in the archive.
    pub fn file_exists(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }

    /// Gives the underlying archive to callers that copy entries.
    pub fn archive_mut(&mut self) -> &mut ZipArchive<Cursor<Vec<u8>>> {
        &mut self.archive
    }
}

/// Resolves a relationship target against the part that owns the relationship.
///
/// `("xl/workbook.xml", "worksheets/sheet1.xml")` gives `xl/worksheets/sheet1.xml`;
/// absolute targets (`/xl/...`) are taken from the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rfind('/') {
        Some(pos) => source_part[..pos].split('/').collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn package(names: &[&str]) -> OoxmlPackage {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            for name in names {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(b"<x/>").unwrap();
            }
            zip.finish().unwrap();
        }
        OoxmlPackage::from_bytes(buffer).unwrap()
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/worksheets/sheet2.xml"),
            "xl/worksheets/sheet2.xml"
        );
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../media/image1.png"),
            "ppt/media/image1.png"
        );
    }

    #[test]
    fn test_list_numbered_sorts_numerically() {
        let mut pkg = package(&[
            "ppt/slides/slide10.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "ppt/slides/slide1.xml",
        ]);
        assert_eq!(
            pkg.list_numbered("ppt/slides/slide", ".xml"),
            vec![
                "ppt/slides/slide1.xml",
                "ppt/slides/slide2.xml",
                "ppt/slides/slide10.xml"
            ]
        );
        assert!(pkg.file_exists("ppt/slides/slide2.xml"));
        assert!(matches!(
            pkg.read_file("missing.xml"),
            Err(Error::MissingComponent(_))
        ));
    }
}
