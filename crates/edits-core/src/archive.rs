//! Lazy extraction of data description documents from ZIP archives.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::AppError;

/// Suffix of entries holding data descriptions.
pub const DOCUMENT_SUFFIX: &str = ".yaml";

/// Upper bound on the buffer reserved up front for one entry.
const MAX_SIZE_HINT: u64 = 1024 * 1024;

/// One document found in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name as stored in the archive, including any directories.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A `.yaml` entry that could not be read.
#[derive(Debug)]
pub struct EntryError {
    /// Entry name, when the archive directory could be read for it.
    pub name: Option<String>,
    pub error: AppError,
}

impl EntryError {
    /// Where the failure happened: `archive!entry`, or `archive` when the name is unknown.
    pub fn origin(&self, archive: &str) -> String {
        match &self.name {
            Some(name) => format!("{}!{}", archive, name),
            None => archive.to_string(),
        }
    }
}

/// Iterator over the `.yaml` entries of an archive, in the archive's internal order.
///
/// Entries are decompressed one at a time as the iterator advances. A failure to
/// read one entry is yielded as an `Err` item and iteration continues with the next.
pub struct ArchiveEntries<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    next: usize,
}

/// Opens `bytes` as a ZIP archive.
///
/// Each call opens the archive afresh, so extracting the same bytes twice yields the
/// same entries in the same order. Entries whose name does not end in `.yaml`, and
/// directory entries, are skipped silently.
///
/// # Errors
///
/// Returns `AppError::ArchiveError` if `bytes` is not a readable ZIP archive.
pub fn extract(bytes: &[u8]) -> Result<ArchiveEntries<'_>, AppError> {
    let archive = ZipArchive::new(Cursor::new(bytes))?;
    tracing::debug!("Opened archive with {} entries", archive.len());
    Ok(ArchiveEntries { archive, next: 0 })
}

impl ArchiveEntries<'_> {
    fn read_entry(&mut self, index: usize) -> Option<Result<ArchiveEntry, EntryError>> {
        let mut file = match self.archive.by_index(index) {
            Ok(file) => file,
            Err(e) => {
                return Some(Err(EntryError {
                    name: None,
                    error: AppError::ArchiveError(format!(
                        "Failed to open entry #{}: {}",
                        index, e
                    )),
                }))
            }
        };

        let name = file.name().to_string();
        if file.is_dir() || !name.ends_with(DOCUMENT_SUFFIX) {
            return None;
        }

        // The declared size is untrusted, so it only bounds the initial allocation.
        let mut bytes = Vec::with_capacity(file.size().min(MAX_SIZE_HINT) as usize);
        Some(match file.read_to_end(&mut bytes) {
            Ok(_) => Ok(ArchiveEntry { name, bytes }),
            Err(e) => Err(EntryError {
                error: AppError::ArchiveError(format!("Failed to read {}: {}", name, e)),
                name: Some(name),
            }),
        })
    }
}

impl Iterator for ArchiveEntries<'_> {
    type Item = Result<ArchiveEntry, EntryError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.archive.len() {
            let index = self.next;
            self.next += 1;
            if let Some(item) = self.read_entry(index) {
                return Some(item);
            }
        }
        None
    }
}
