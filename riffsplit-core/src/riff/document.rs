use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::chunk::{Chunk, ListChunk, round_even};
use super::codec::{self, ChunkReader};
use super::fourcc::{FourCc, NULL, RIFF};
use crate::error::{Result, RiffError};

/// A whole RIFF file: one root `RIFF` list plus the path it is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RiffDocument {
    root: ListChunk,
    path: Option<PathBuf>,
}

impl Default for RiffDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RiffDocument {
    /// An empty document with form type `NULL` and no path.
    pub fn new() -> Self {
        Self::with_form_type(NULL)
    }

    pub fn with_form_type(form_type: FourCc) -> Self {
        Self {
            root: ListChunk::with_id(RIFF, form_type),
            path: None,
        }
    }

    /// Wrap an existing list as the root. Its identifier is forced to `RIFF`.
    pub fn from_root(mut root: ListChunk) -> Self {
        root.set_id(RIFF);
        Self { root, path: None }
    }

    /// Read and parse the file at `path`, binding the document to it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(RiffError::file_io(path))?;
        let mut doc = Self::from_bytes(&bytes)?;
        doc.path = Some(path.to_path_buf());
        debug!(path = %path.display(), bytes = bytes.len(), "opened RIFF document");
        Ok(doc)
    }

    /// Parse a document from an in-memory image of a RIFF file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let magic = bytes.get(..4).ok_or_else(|| {
            RiffError::Malformed(format!("file is only {} bytes long", bytes.len()))
        })?;
        let magic = FourCc::from_slice(magic)?;
        if magic != RIFF {
            return Err(RiffError::NotARiffFile(magic));
        }
        let mut r = ChunkReader::at(&bytes[4..], 4);
        let root = codec::parse_list(&mut r, RIFF, 0)?;
        Ok(Self { root, path: None })
    }

    pub fn root(&self) -> &ListChunk {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ListChunk {
        &mut self.root
    }

    pub fn form_type(&self) -> FourCc {
        self.root.form_type()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bind the document to a new path. Nothing is written until [`write`](Self::write).
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn size(&self) -> u64 {
        self.root.size()
    }

    pub fn total_size(&self) -> u64 {
        round_even(self.root.total_size())
    }

    /// First chunk below the root with identifier `id`, depth-first in file order.
    /// The root itself is reached through [`root`](Self::root).
    pub fn find_first(&self, id: FourCc) -> Option<&Chunk> {
        self.root.find_first(id)
    }

    pub fn find_first_mut(&mut self, id: FourCc) -> Option<&mut Chunk> {
        self.root.find_first_mut(id)
    }

    pub fn exists(&self, id: FourCc) -> bool {
        id == RIFF || self.find_first(id).is_some()
    }

    /// Write the document to its bound path, truncating any existing file.
    pub fn write(&self) -> Result<u64> {
        let path = self.path.as_deref().ok_or(RiffError::NoFilePathSet)?;
        let file = File::create(path).map_err(RiffError::file_io(path))?;
        let mut w = BufWriter::new(file);
        let written = codec::write_list(&self.root, &mut w).map_err(|e| match e {
            RiffError::Io(source) => RiffError::FileIo {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        w.flush().map_err(RiffError::file_io(path))?;
        debug!(path = %path.display(), bytes = written, "wrote RIFF document");
        Ok(written)
    }

    /// Serialize the document to an arbitrary sink.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<u64> {
        codec::write_list(&self.root, sink)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.total_size() as usize);
        self.write_to(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riff::chunk::DataChunk;
    use crate::riff::fourcc::{DATA, FMT, WAVE};

    #[test]
    fn new_document_is_empty_null_riff() {
        let doc = RiffDocument::new();
        assert_eq!(doc.root().id(), RIFF);
        assert_eq!(doc.form_type(), NULL);
        assert_eq!(doc.size(), 0);
        assert_eq!(doc.total_size(), 12);
        assert!(doc.path().is_none());
        assert_eq!(doc.to_bytes().unwrap(), b"RIFF\x04\0\0\0NULL");
    }

    #[test]
    fn rejects_non_riff_magic_before_parsing() {
        let err = RiffDocument::from_bytes(b"RIFXsome garbage").unwrap_err();
        assert!(matches!(err, RiffError::NotARiffFile(m) if m == FourCc::new(*b"RIFX")));
    }

    #[test]
    fn rejects_tiny_input() {
        assert!(matches!(
            RiffDocument::from_bytes(b"RI"),
            Err(RiffError::Malformed(_))
        ));
    }

    #[test]
    fn bytes_round_trip() {
        let mut doc = RiffDocument::with_form_type(WAVE);
        doc.root_mut().push(DataChunk::new(FMT, vec![0; 16]));
        doc.root_mut().push(DataChunk::new(DATA, vec![1, 2, 3]));
        let bytes = doc.to_bytes().unwrap();
        assert_eq!(bytes.len() as u64, doc.total_size());
        let back = RiffDocument::from_bytes(&bytes).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn write_without_path_fails() {
        let doc = RiffDocument::new();
        assert!(matches!(doc.write(), Err(RiffError::NoFilePathSet)));
    }

    #[test]
    fn from_root_forces_riff_identifier() {
        let doc = RiffDocument::from_root(ListChunk::new(WAVE));
        assert_eq!(doc.root().id(), RIFF);
        assert!(doc.exists(RIFF));
    }
}
