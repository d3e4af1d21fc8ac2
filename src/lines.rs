// Hex-dump line projection of an edit script.
//
// Renders the base and version streams as two lists of fixed-width hex-dump
// lines so a conventional line diff can highlight byte-level changes:
// deleted base bytes go only to the base list, added bytes only to the
// version list, copied bytes to both.
//
// Line layout (bytes_per_line = 4):
//
//   00000010    41 42 0A       AB.
//   ^^^^^^^^^^^^               prefix: LINE_PREFIX_LENGTH characters
//               ^^^^^^^^^^^^   hex column, always 3 * bytes_per_line wide
//                           ^^^  separator
//                              ASCII column, one char per byte present

use std::fmt::Write as _;

use log::debug;

use crate::error::{DiffError, Result};
use crate::footprint::config::DEFAULT_BYTES_PER_LINE;
use crate::script::EditOp;
use crate::source::{ByteSource, read_range};

/// Characters of positional metadata (8 hex digits + 4 spaces) at the start
/// of every rendered line. Line comparisons should skip them.
pub const LINE_PREFIX_LENGTH: usize = 12;

const COLUMN_GAP: &str = "   ";

/// Which region of the script a rendered line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Base bytes absent from the version.
    Deleted,
    /// Version bytes absent from the base.
    Inserted,
    /// Bytes copied unchanged; present in both lists.
    Shared,
}

/// The two parallel line lists produced by [`LineProjector::build`].
///
/// `base_kinds[i]` describes `base_lines[i]`, likewise for the version side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedLines {
    pub base_lines: Vec<String>,
    pub version_lines: Vec<String>,
    pub base_kinds: Vec<LineKind>,
    pub version_kinds: Vec<LineKind>,
}

impl ProjectedLines {
    /// Merge both lists into one unified listing.
    ///
    /// Deleted base lines come before inserted version lines within each
    /// changed block; shared lines appear once, with the version offset.
    pub fn interleaved(&self) -> Vec<(LineKind, &str)> {
        let mut out = Vec::with_capacity(self.base_lines.len().max(self.version_lines.len()));
        let (mut i, mut j) = (0, 0);
        loop {
            let base_kind = self.base_kinds.get(i).copied();
            let version_kind = self.version_kinds.get(j).copied();
            match (base_kind, version_kind) {
                (Some(LineKind::Deleted), _) => {
                    out.push((LineKind::Deleted, self.base_lines[i].as_str()));
                    i += 1;
                }
                (_, Some(LineKind::Inserted)) => {
                    out.push((LineKind::Inserted, self.version_lines[j].as_str()));
                    j += 1;
                }
                (Some(_), Some(_)) => {
                    out.push((LineKind::Shared, self.version_lines[j].as_str()));
                    i += 1;
                    j += 1;
                }
                // Shared lines come in pairs, so one list cannot run out
                // while the other still holds a shared line.
                _ => break,
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Line helpers
// ---------------------------------------------------------------------------

/// Render one line: offset prefix, padded hex column, ASCII column.
pub fn format_line(offset: u64, bytes: &[u8], bytes_per_line: usize) -> String {
    let mut line = String::with_capacity(line_width(bytes_per_line));
    let _ = write!(line, "{offset:08X}    ");
    for b in bytes {
        let _ = write!(line, "{b:02X} ");
    }
    for _ in bytes.len()..bytes_per_line {
        line.push_str("   ");
    }
    line.push_str(COLUMN_GAP);
    line.extend(bytes.iter().map(|&b| printable(b)));
    line
}

/// Length of a full line for `bytes_per_line`.
pub fn line_width(bytes_per_line: usize) -> usize {
    LINE_PREFIX_LENGTH + 3 * bytes_per_line + COLUMN_GAP.len() + bytes_per_line
}

/// A line without its positional prefix.
pub fn content(line: &str) -> &str {
    line.get(LINE_PREFIX_LENGTH..).unwrap_or("")
}

/// Recover the bytes dumped in a rendered line's hex column.
pub fn parse_hex_column(line: &str, bytes_per_line: usize) -> Option<Vec<u8>> {
    let hex = content(line).get(..3 * bytes_per_line)?;
    hex.split_ascii_whitespace()
        .map(|pair| u8::from_str_radix(pair, 16).ok())
        .collect()
}

#[inline]
fn printable(b: u8) -> char {
    if b == b' ' || b.is_ascii_graphic() {
        b as char
    } else {
        '.'
    }
}

// ---------------------------------------------------------------------------
// LineProjector
// ---------------------------------------------------------------------------

/// Projects a base stream plus its edit script into hex-dump line lists.
#[derive(Debug, Clone)]
pub struct LineProjector {
    bytes_per_line: usize,
}

impl Default for LineProjector {
    fn default() -> Self {
        Self {
            bytes_per_line: DEFAULT_BYTES_PER_LINE,
        }
    }
}

impl LineProjector {
    /// A projector dumping `bytes_per_line` bytes per line (>= 1).
    pub fn new(bytes_per_line: usize) -> Result<Self> {
        if bytes_per_line == 0 {
            return Err(DiffError::OutOfRange {
                name: "bytes_per_line",
                value: 0,
                min: 1,
                max: usize::MAX as u64,
            });
        }
        Ok(Self { bytes_per_line })
    }

    pub fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    /// Render `base` and the version described by `ops` as line lists.
    ///
    /// Copy bytes are read from `base`; add bytes come from the ops.
    pub fn build<B: ByteSource + ?Sized>(
        &self,
        base: &mut B,
        ops: &[EditOp],
    ) -> Result<ProjectedLines> {
        let mut out = Projection {
            bytes_per_line: self.bytes_per_line,
            lines: ProjectedLines::default(),
            base_line_pos: 0,
            version_line_pos: 0,
        };
        let mut base_position = 0u64;
        let mut version_position = 0u64;

        for op in ops {
            match op {
                EditOp::Add { bytes } => {
                    out.append_bytes(bytes, LineKind::Inserted);
                    version_position += bytes.len() as u64;
                }
                EditOp::Copy {
                    base_offset,
                    length,
                } => {
                    if base_position < *base_offset {
                        out.append_from(
                            base,
                            base_position,
                            base_offset - base_position,
                            LineKind::Deleted,
                        )?;
                    }
                    out.append_from(base, *base_offset, *length, LineKind::Shared)?;
                    base_position = base_offset + length;
                    version_position += length;
                }
            }
        }

        let base_len = base.len();
        if base_position < base_len {
            out.append_from(base, base_position, base_len - base_position, LineKind::Deleted)?;
        }

        debug!(
            "projected {} base lines, {} version lines ({} version bytes)",
            out.lines.base_lines.len(),
            out.lines.version_lines.len(),
            version_position
        );
        Ok(out.lines)
    }
}

struct Projection {
    bytes_per_line: usize,
    lines: ProjectedLines,
    base_line_pos: u64,
    version_line_pos: u64,
}

impl Projection {
    /// Render `len` bytes of `src` starting at `start`, one line at a time.
    fn append_from<S: ByteSource + ?Sized>(
        &mut self,
        src: &mut S,
        start: u64,
        len: u64,
        kind: LineKind,
    ) -> Result<()> {
        let mut pos = start;
        let end = start + len;
        while pos < end {
            let n = (end - pos).min(self.bytes_per_line as u64) as usize;
            let chunk = read_range(src, pos, n)?;
            self.append_line(&chunk, kind);
            pos += n as u64;
        }
        Ok(())
    }

    fn append_bytes(&mut self, bytes: &[u8], kind: LineKind) {
        for chunk in bytes.chunks(self.bytes_per_line) {
            self.append_line(chunk, kind);
        }
    }

    /// Append one line of at most `bytes_per_line` bytes to the list(s)
    /// `kind` belongs to. Each list prefixes with its own running offset.
    fn append_line(&mut self, chunk: &[u8], kind: LineKind) {
        let to_base = matches!(kind, LineKind::Deleted | LineKind::Shared);
        let to_version = matches!(kind, LineKind::Inserted | LineKind::Shared);

        if to_base {
            let line = format_line(self.base_line_pos, chunk, self.bytes_per_line);
            self.lines.base_lines.push(line);
            self.lines.base_kinds.push(kind);
            self.base_line_pos += chunk.len() as u64;
        }
        if to_version {
            let line = format_line(self.version_line_pos, chunk, self.bytes_per_line);
            self.lines.version_lines.push(line);
            self.lines.version_kinds.push(kind);
            self.version_line_pos += chunk.len() as u64;
        }
    }
}
