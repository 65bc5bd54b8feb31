//! Byte-exact file comparison.
//!
//! Engine behind the `cmp` toolbox binary: both files are read in lockstep
//! 4096-byte chunks and compared. The verdict is silent by contract; the
//! caller turns it into a process exit status.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Chunk size for the lockstep read loop.
pub const CHUNK_SIZE: usize = 4096;

/// Result of comparing two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareVerdict {
    Equal,
    Differ,
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("can't open file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read failed on {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompareError {
    /// Path of the file the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } => path,
        }
    }
}

/// Read until `buf` is full or EOF.
///
/// This gives the chunk loop `fread` semantics: a short result always means
/// end of stream, never a transient short read. Unequal chunk lengths can
/// therefore only mean a genuine length difference between the two files.
fn read_chunk(file: &mut File, buf: &mut [u8], path: &Path) -> Result<usize, CompareError> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(source) => {
                return Err(CompareError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }
    Ok(filled)
}

/// Compare two files for exact byte equality.
///
/// The loop ends at the first mismatch (unequal chunk lengths or any
/// differing byte) or when the first stream yields a short chunk, i.e.
/// end of input.
pub fn compare_files(path1: &Path, path2: &Path) -> Result<CompareVerdict, CompareError> {
    let mut f1 = File::open(path1).map_err(|source| CompareError::Open {
        path: path1.to_path_buf(),
        source,
    })?;
    let mut f2 = File::open(path2).map_err(|source| CompareError::Open {
        path: path2.to_path_buf(),
        source,
    })?;

    let mut buf1 = [0u8; CHUNK_SIZE];
    let mut buf2 = [0u8; CHUNK_SIZE];
    loop {
        let n1 = read_chunk(&mut f1, &mut buf1, path1)?;
        let n2 = read_chunk(&mut f2, &mut buf2, path2)?;
        if n1 != n2 || buf1[..n1] != buf2[..n2] {
            return Ok(CompareVerdict::Differ);
        }
        if n1 < CHUNK_SIZE {
            return Ok(CompareVerdict::Equal);
        }
    }
}
