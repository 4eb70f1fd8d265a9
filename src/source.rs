//! Byte buffer access and the disassembly seam.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::handoff::BackgroundJob;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document has no file name")]
    NoPath,
}

/// Random access to the bytes being viewed.
pub trait ByteSource {
    fn len(&self) -> u64;

    /// Up to `length` bytes starting at `offset`; shorter (or empty) near
    /// and past the end.
    fn read(&self, offset: u64, length: usize) -> &[u8];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn byte_at(&self, offset: u64) -> Option<u8> {
        self.read(offset, 1).first().copied()
    }
}

impl ByteSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read(&self, offset: u64, length: usize) -> &[u8] {
        let total = <[u8]>::len(self);
        let Ok(start) = usize::try_from(offset) else {
            return &[];
        };
        if start >= total {
            return &[];
        }
        let end = start.saturating_add(length).min(total);
        &self[start..end]
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn read(&self, offset: u64, length: usize) -> &[u8] {
        ByteSource::read(self.as_slice(), offset, length)
    }
}

/// A file loaded fully into memory, with in-place byte edits.
#[derive(Debug, Default)]
pub struct HexDocument {
    path: Option<PathBuf>,
    data: Vec<u8>,
    modified: bool,
}

impl HexDocument {
    pub fn new() -> Self {
        HexDocument::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        HexDocument {
            path: None,
            data,
            modified: false,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        info!("loaded {} ({} bytes)", path.display(), data.len());
        Ok(HexDocument {
            path: Some(path.to_path_buf()),
            data,
            modified: false,
        })
    }

    /// Read `path` on a worker thread. `notify` runs on the worker once the
    /// result can be taken.
    pub fn load_in_background<N>(path: PathBuf, notify: N) -> BackgroundJob<Result<Self, DocumentError>>
    where
        N: FnOnce() + Send + 'static,
    {
        BackgroundJob::spawn("file loader", move || HexDocument::load(&path), notify)
    }

    /// Re-read the file from disk, dropping unsaved edits.
    pub fn reload(&mut self) -> Result<(), DocumentError> {
        let path = self.path.clone().ok_or(DocumentError::NoPath)?;
        *self = HexDocument::load(path)?;
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.path.clone().ok_or(DocumentError::NoPath)?;
        self.save_as(path)
    }

    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        fs::write(path, &self.data).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved {} ({} bytes)", path.display(), self.data.len());
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Overwrite one byte. Offsets past the end are ignored.
    pub fn edit_byte(&mut self, offset: u64, value: u8) -> bool {
        let Some(slot) = usize::try_from(offset).ok().and_then(|i| self.data.get_mut(i)) else {
            return false;
        };
        if *slot != value {
            debug!("edit {:08X}: {:02X} -> {:02X}", offset, *slot, value);
            *slot = value;
            self.modified = true;
        }
        true
    }
}

impl ByteSource for HexDocument {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read(&self, offset: u64, length: usize) -> &[u8] {
        ByteSource::read(self.data.as_slice(), offset, length)
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub text: String,
    pub len: usize,
}

/// Provider of disassembly text for the right-hand column.
pub trait Disassembler {
    fn decode(&self, bytes: &[u8], offset: u64) -> Option<Instruction>;
}

/// Disassembler that never decodes anything; the column stays empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisassembler;

impl Disassembler for NullDisassembler {
    fn decode(&self, _bytes: &[u8], _offset: u64) -> Option<Instruction> {
        None
    }
}

/// Annotation for the line starting at `offset`: the first instruction
/// decoded there.
pub fn line_annotation(
    source: &(impl ByteSource + ?Sized),
    disassembler: &dyn Disassembler,
    offset: u64,
    max_len: usize,
) -> Option<String> {
    let bytes = source.read(offset, max_len);
    if bytes.is_empty() {
        return None;
    }
    disassembler.decode(bytes, offset).map(|i| i.text)
}
