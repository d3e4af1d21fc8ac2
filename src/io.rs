// File-level helpers for diffing and projecting files on disk.
//
// Files are opened as `ReaderSource`s, so only one read window per file is
// held in memory regardless of file size. With the `file-io` feature a
// SHA-256 digest of each file is computed as well.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::cancel::CancelToken;
use crate::engine::BinaryDiffer;
use crate::error::Result;
use crate::lines::{LineProjector, ProjectedLines};
use crate::script::{EditScript, EditSink};
use crate::source::{ReaderSource, WINDOW_SIZE};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Sizes and digests of two compared files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffStats {
    /// Base file size in bytes.
    pub base_size: u64,
    /// Version file size in bytes.
    pub version_size: u64,
    /// SHA-256 of the base file (if `file-io` feature is enabled).
    pub base_sha256: Option<[u8; 32]>,
    /// SHA-256 of the version file (if `file-io` feature is enabled).
    pub version_sha256: Option<[u8; 32]>,
}

impl DiffStats {
    /// Whether both files have the same content, judged by size and digest.
    ///
    /// `None` when digests were not computed and sizes are equal.
    pub fn identical(&self) -> Option<bool> {
        if self.base_size != self.version_size {
            return Some(false);
        }
        match (self.base_sha256, self.version_sha256) {
            (Some(a), Some(b)) => Some(a == b),
            _ => None,
        }
    }
}

/// Lowercase hex rendering of a digest.
pub fn hex_digest(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Opening files
// ---------------------------------------------------------------------------

/// Open `path` as a seekable byte source.
pub fn open_source(path: &Path) -> io::Result<ReaderSource<File>> {
    ReaderSource::new(File::open(path)?)
}

fn file_stats(base_path: &Path, version_path: &Path) -> io::Result<DiffStats> {
    Ok(DiffStats {
        base_size: std::fs::metadata(base_path)?.len(),
        version_size: std::fs::metadata(version_path)?.len(),
        base_sha256: file_sha256(base_path)?,
        version_sha256: file_sha256(version_path)?,
    })
}

#[cfg(feature = "file-io")]
fn file_sha256(path: &Path) -> io::Result<Option<[u8; 32]>> {
    let mut reader = BufReader::with_capacity(WINDOW_SIZE, File::open(path)?);
    let mut hasher = sha2::Sha256::new();
    let mut buf = vec![0u8; WINDOW_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Some(hasher.finalize().into()))
}

#[cfg(not(feature = "file-io"))]
fn file_sha256(_path: &Path) -> io::Result<Option<[u8; 32]>> {
    Ok(None)
}

/// Read a whole input into memory (used for stdin, which cannot seek).
pub fn read_all<R: Read>(reader: R) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    BufReader::with_capacity(WINDOW_SIZE, reader).read_to_end(&mut data)?;
    Ok(data)
}

// ---------------------------------------------------------------------------
// diff_files / project_files
// ---------------------------------------------------------------------------

/// Diff two files, collecting the edit script in memory.
pub fn diff_files(
    base_path: &Path,
    version_path: &Path,
    differ: &BinaryDiffer,
    cancel: &CancelToken,
) -> Result<(EditScript, DiffStats)> {
    let mut script = EditScript::new();
    let stats = diff_files_into(base_path, version_path, differ, cancel, &mut script)?;
    Ok((script, stats))
}

/// Diff two files, streaming operations into `sink`.
pub fn diff_files_into<K: EditSink + ?Sized>(
    base_path: &Path,
    version_path: &Path,
    differ: &BinaryDiffer,
    cancel: &CancelToken,
    sink: &mut K,
) -> Result<DiffStats> {
    let mut base = open_source(base_path)?;
    let mut version = open_source(version_path)?;
    differ.execute_into(&mut base, &mut version, cancel, sink)?;
    Ok(file_stats(base_path, version_path)?)
}

/// Diff two files and project the result into hex-dump line lists.
pub fn project_files(
    base_path: &Path,
    version_path: &Path,
    differ: &BinaryDiffer,
    projector: &LineProjector,
    cancel: &CancelToken,
) -> Result<(ProjectedLines, DiffStats)> {
    let (script, stats) = diff_files(base_path, version_path, differ, cancel)?;
    let mut base = open_source(base_path)?;
    let lines = projector.build(&mut base, script.ops())?;
    Ok((lines, stats))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
