// Edit scripts: the ordered copy/add operations that rebuild a version
// stream from a base stream, plus the sink trait the differ emits through.
//
// - `EditOp`: a single COPY (from base) or ADD (literal bytes)
// - `EditScript`: the default in-memory sink, with replay and summary
// - `EditSink`: emission seam; implement it to stream ops elsewhere
// - `OpWriter`: an `EditSink` that writes ops as text lines

use std::fmt;
use std::io::Write;

use crate::error::{DiffError, Result};

// ---------------------------------------------------------------------------
// EditOp
// ---------------------------------------------------------------------------

/// One step of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Base bytes `[base_offset, base_offset + length)` appear unchanged.
    Copy { base_offset: u64, length: u64 },
    /// Literal bytes with no counterpart in the base.
    Add { bytes: Vec<u8> },
}

impl EditOp {
    /// Number of version bytes this operation contributes.
    #[inline]
    pub fn len(&self) -> u64 {
        match self {
            Self::Copy { length, .. } => *length,
            Self::Add { bytes } => bytes.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy {
                base_offset,
                length,
            } => write!(f, "COPY {base_offset} {length}"),
            Self::Add { bytes } => {
                write!(f, "ADD {} ", bytes.len())?;
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EditSink
// ---------------------------------------------------------------------------

/// Receives operations as the differ finds them.
///
/// The matching algorithm only ever calls these two methods, so an
/// implementation can write ops to disk or a socket instead of collecting
/// them. Zero-length operations are never emitted.
pub trait EditSink {
    /// Literal version bytes with no base counterpart.
    fn emit_add(&mut self, bytes: Vec<u8>) -> Result<()>;

    /// `length` bytes copied unchanged from `base_offset`.
    fn emit_copy(&mut self, base_offset: u64, length: u64) -> Result<()>;
}

impl<S: EditSink + ?Sized> EditSink for &mut S {
    fn emit_add(&mut self, bytes: Vec<u8>) -> Result<()> {
        (**self).emit_add(bytes)
    }

    fn emit_copy(&mut self, base_offset: u64, length: u64) -> Result<()> {
        (**self).emit_copy(base_offset, length)
    }
}

// ---------------------------------------------------------------------------
// EditScript
// ---------------------------------------------------------------------------

/// Operation counts and byte totals for a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub copies: usize,
    pub adds: usize,
    pub copied_bytes: u64,
    pub added_bytes: u64,
}

/// An ordered list of edit operations with a cached total length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    ops: Vec<EditOp>,
    total_len: u64,
}

impl EditScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation. Empty operations are dropped.
    pub fn push(&mut self, op: EditOp) {
        if op.is_empty() {
            return;
        }
        self.total_len += op.len();
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<EditOp> {
        self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditOp> {
        self.ops.iter()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Sum of all operation lengths; equals the version length.
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    pub fn summary(&self) -> ScriptSummary {
        let mut s = ScriptSummary::default();
        for op in &self.ops {
            match op {
                EditOp::Copy { length, .. } => {
                    s.copies += 1;
                    s.copied_bytes += length;
                }
                EditOp::Add { bytes } => {
                    s.adds += 1;
                    s.added_bytes += bytes.len() as u64;
                }
            }
        }
        s
    }

    /// Rebuild the version stream from `base`.
    pub fn apply(&self, base: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.total_len as usize);
        for op in &self.ops {
            match op {
                EditOp::Copy {
                    base_offset,
                    length,
                } => {
                    let range = base_offset
                        .checked_add(*length)
                        .filter(|end| *end <= base.len() as u64)
                        .map(|end| *base_offset as usize..end as usize)
                        .ok_or_else(|| {
                            DiffError::InvalidInput(format!(
                                "copy of {length} bytes at {base_offset} exceeds base length {}",
                                base.len()
                            ))
                        })?;
                    out.extend_from_slice(&base[range]);
                }
                EditOp::Add { bytes } => out.extend_from_slice(bytes),
            }
        }
        Ok(out)
    }
}

impl EditSink for EditScript {
    fn emit_add(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.push(EditOp::Add { bytes });
        Ok(())
    }

    fn emit_copy(&mut self, base_offset: u64, length: u64) -> Result<()> {
        self.push(EditOp::Copy {
            base_offset,
            length,
        });
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a EditOp;
    type IntoIter = std::slice::Iter<'a, EditOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl FromIterator<EditOp> for EditScript {
    fn from_iter<I: IntoIterator<Item = EditOp>>(iter: I) -> Self {
        let mut script = Self::new();
        for op in iter {
            script.push(op);
        }
        script
    }
}

// ---------------------------------------------------------------------------
// OpWriter
// ---------------------------------------------------------------------------

/// Streams operations to a writer, one per line, without keeping them.
///
/// Lines look like `COPY <offset> <length>` and `ADD <length> <HEX>`.
pub struct OpWriter<W: Write> {
    out: W,
    summary: ScriptSummary,
}

impl<W: Write> OpWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            summary: ScriptSummary::default(),
        }
    }

    /// Counts of everything written so far.
    pub fn summary(&self) -> ScriptSummary {
        self.summary
    }

    /// Flush and return the writer together with the final summary.
    pub fn finish(mut self) -> Result<(W, ScriptSummary)> {
        self.out.flush()?;
        Ok((self.out, self.summary))
    }
}

impl<W: Write> EditSink for OpWriter<W> {
    fn emit_add(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.summary.adds += 1;
        self.summary.added_bytes += bytes.len() as u64;
        writeln!(self.out, "{}", EditOp::Add { bytes })?;
        Ok(())
    }

    fn emit_copy(&mut self, base_offset: u64, length: u64) -> Result<()> {
        self.summary.copies += 1;
        self.summary.copied_bytes += length;
        writeln!(
            self.out,
            "{}",
            EditOp::Copy {
                base_offset,
                length
            }
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EditScript {
        [
            EditOp::Copy {
                base_offset: 0,
                length: 4,
            },
            EditOp::Add {
                bytes: b"XY".to_vec(),
            },
            EditOp::Copy {
                base_offset: 6,
                length: 2,
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn total_len_tracks_pushes() {
        let script = sample();
        assert_eq!(script.len(), 3);
        assert_eq!(script.total_len(), 8);
    }

    #[test]
    fn empty_ops_are_dropped() {
        let mut script = EditScript::new();
        script.push(EditOp::Add { bytes: Vec::new() });
        script.push(EditOp::Copy {
            base_offset: 3,
            length: 0,
        });
        assert!(script.is_empty());
        assert_eq!(script.total_len(), 0);
    }

    #[test]
    fn apply_replays_copies_and_adds() {
        assert_eq!(sample().apply(b"ABCDEFGH").unwrap(), b"ABCDXYGH");
    }

    #[test]
    fn apply_rejects_copy_past_base_end() {
        let err = sample().apply(b"ABCDEFG").unwrap_err();
        assert!(matches!(err, DiffError::InvalidInput(_)));
    }

    #[test]
    fn summary_counts() {
        let s = sample().summary();
        assert_eq!(
            s,
            ScriptSummary {
                copies: 2,
                adds: 1,
                copied_bytes: 6,
                added_bytes: 2,
            }
        );
    }

    #[test]
    fn op_writer_streams_text_lines() {
        let mut w = OpWriter::new(Vec::new());
        w.emit_copy(0, 4).unwrap();
        w.emit_add(vec![0x58, 0x0A]).unwrap();
        let (out, summary) = w.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "COPY 0 4\nADD 2 580A\n");
        assert_eq!(summary.copies, 1);
        assert_eq!(summary.added_bytes, 2);
    }
}
