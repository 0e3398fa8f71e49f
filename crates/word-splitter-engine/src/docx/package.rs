use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::LoadError;

/// Compound file signature used by legacy `.doc` files.
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// One named entry of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
}

/// A zip package held fully in memory, parts kept in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LoadError> {
        if bytes.starts_with(&OLE_SIGNATURE) {
            return Err(LoadError::UnsupportedFormat);
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry
                .read_to_end(&mut data)
                .map_err(zip::result::ZipError::Io)?;
            parts.push(Part {
                name: entry.name().to_string(),
                data,
            });
        }

        Ok(Self { parts })
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.data.as_slice())
    }

    /// Part contents as text, with any byte order mark removed.
    pub fn part_text(&self, name: &'static str) -> Result<Option<String>, LoadError> {
        let Some(data) = self.part(name) else {
            return Ok(None);
        };
        let text = std::str::from_utf8(data).map_err(|_| LoadError::Encoding(name))?;
        Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
    }

    /// Insert a part or replace the contents of an existing one.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|part| part.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Write the package, substituting `replacement` for the part it names.
    pub fn write_with<W: Write + Seek>(
        &self,
        writer: W,
        replacement: (&str, &[u8]),
    ) -> zip::result::ZipResult<W> {
        let (replaced_name, replaced_data) = replacement;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);

        for part in &self.parts {
            let data = if part.name == replaced_name {
                replaced_data
            } else {
                part.data.as_slice()
            };
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(data)?;
        }

        zip.finish()
    }

    pub fn to_bytes(&self) -> zip::result::ZipResult<Vec<u8>> {
        let cursor = self.write_with(Cursor::new(Vec::new()), ("", &[]))?;
        Ok(cursor.into_inner())
    }
}
