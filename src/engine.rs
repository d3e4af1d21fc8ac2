// Binary differ: Burns & Long's linear-time, constant-space differencing.
//
// Two cursors walk the base and version streams in lock step. Each step
// hashes the footprint under both cursors into a shared table; a bucket that
// already holds a footprint from the *other* stream is a candidate match,
// confirmed byte by byte. A confirmed match emits the pending ADD span and a
// maximally extended COPY, jumps both cursors past it and flushes the table.
//
// The result is near-optimal, not minimal: an optimal script needs quadratic
// time, which is not practical for large inputs.

use log::{debug, trace};

use crate::cancel::CancelToken;
use crate::error::{DiffError, Result};
use crate::footprint::config::DiffOptions;
use crate::footprint::rolling::Footprint;
use crate::footprint::table::{FootprintTable, Side, Slot};
use crate::script::{EditScript, EditSink};
use crate::source::{ByteSource, MemorySource, byte_in_bounds, read_range};

// ---------------------------------------------------------------------------
// BinaryDiffer
// ---------------------------------------------------------------------------

/// Computes copy/add scripts that rebuild a version stream from a base.
///
/// Configuration is read-only during a run; every call allocates its own
/// table and cursors, so one differ can serve any number of calls.
#[derive(Debug, Clone, Default)]
pub struct BinaryDiffer {
    opts: DiffOptions,
}

impl BinaryDiffer {
    pub fn new(opts: DiffOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.opts
    }

    pub fn footprint_length(&self) -> u32 {
        self.opts.footprint_length()
    }

    pub fn table_size(&self) -> usize {
        self.opts.table_size()
    }

    pub fn favor_last_match(&self) -> bool {
        self.opts.favor_last_match()
    }

    /// Set the footprint length (1..=31).
    pub fn set_footprint_length(&mut self, len: u32) -> Result<()> {
        self.opts.set_footprint_length(len)
    }

    /// Set the table bucket count (>= 1).
    pub fn set_table_size(&mut self, size: usize) -> Result<()> {
        self.opts.set_table_size(size)
    }

    pub fn set_favor_last_match(&mut self, favor: bool) {
        self.opts.set_favor_last_match(favor);
    }

    /// Diff two seekable sources, collecting the script in memory.
    ///
    /// # Example
    /// ```
    /// use oxidiff::{BinaryDiffer, CancelToken, EditOp, MemorySource};
    ///
    /// let mut differ = BinaryDiffer::default();
    /// differ.set_footprint_length(2).unwrap();
    /// let mut base = MemorySource::new(b"ABCDEFGH".as_slice());
    /// let mut version = MemorySource::new(b"ABCDXYGH".as_slice());
    /// let script = differ.execute(&mut base, &mut version, &CancelToken::new()).unwrap();
    /// assert_eq!(script.ops()[1], EditOp::Add { bytes: b"XY".to_vec() });
    /// ```
    pub fn execute<B, V>(
        &self,
        base: &mut B,
        version: &mut V,
        cancel: &CancelToken,
    ) -> Result<EditScript>
    where
        B: ByteSource + ?Sized,
        V: ByteSource + ?Sized,
    {
        let mut script = EditScript::new();
        self.execute_into(base, version, cancel, &mut script)?;
        Ok(script)
    }

    /// Diff two in-memory buffers without cancellation.
    pub fn diff_slices(&self, base: &[u8], version: &[u8]) -> Result<EditScript> {
        self.execute(
            &mut MemorySource::new(base),
            &mut MemorySource::new(version),
            &CancelToken::new(),
        )
    }

    /// Diff two seekable sources, emitting operations into `sink`.
    ///
    /// Returns the number of version bytes covered by the emitted
    /// operations, which always equals `version.len()`.
    pub fn execute_into<B, V, K>(
        &self,
        base: &mut B,
        version: &mut V,
        cancel: &CancelToken,
        sink: &mut K,
    ) -> Result<u64>
    where
        B: ByteSource + ?Sized,
        V: ByteSource + ?Sized,
        K: EditSink + ?Sized,
    {
        if !base.can_seek() || !version.can_seek() {
            return Err(DiffError::InvalidInput(
                "base and version sources must support seeking".into(),
            ));
        }

        let base_len = base.len();
        let version_len = version.len();
        debug!(
            "diff start: base={base_len} version={version_len} footprint={} table={} favor_last={}",
            self.opts.footprint_length(),
            self.opts.table_size(),
            self.opts.favor_last_match()
        );

        let mut scan = Scan {
            base,
            version,
            sink,
            opts: &self.opts,
            base_len,
            version_len,
            emitted: 0,
            matches: 0,
        };
        let emitted = scan.run(cancel).inspect_err(|e| {
            if matches!(e, DiffError::Cancelled) {
                debug!("diff cancelled");
            }
        })?;

        assert_eq!(
            emitted, version_len,
            "edit script covers {emitted} bytes of a {version_len}-byte version"
        );
        Ok(emitted)
    }
}

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

struct Scan<'a, B: ?Sized, V: ?Sized, K: ?Sized> {
    base: &'a mut B,
    version: &'a mut V,
    sink: &'a mut K,
    opts: &'a DiffOptions,
    base_len: u64,
    version_len: u64,
    emitted: u64,
    matches: u64,
}

impl<B, V, K> Scan<'_, B, V, K>
where
    B: ByteSource + ?Sized,
    V: ByteSource + ?Sized,
    K: EditSink + ?Sized,
{
    fn run(&mut self, cancel: &CancelToken) -> Result<u64> {
        let d = self.opts.footprint_length();
        let d64 = d as u64;
        let power_d = self.opts.power_d();
        let favor_last = self.opts.favor_last_match();

        let mut table = FootprintTable::new(self.opts.table_size());
        let mut version_fp = Footprint::new();
        let mut base_fp = Footprint::new();

        let mut version_pos = 0u64;
        let mut base_pos = 0u64;
        let mut version_start = 0u64;
        let mut base_active = true;

        while version_pos + d64 <= self.version_len {
            cancel.check()?;

            let version_hash = version_fp.hash_at(&mut *self.version, version_pos, d, power_d)?;
            let version_bucket = table.get_or_insert(version_hash, Slot::version(version_pos));

            // A forward match below can move `base_pos` back into range, so
            // only the check after it retires the base side.
            let base_fits = base_active && base_pos + d64 <= self.base_len;
            let base_bucket = if base_fits {
                let base_hash = base_fp.hash_at(&mut *self.base, base_pos, d, power_d)?;
                Some(table.get_or_insert(base_hash, Slot::base(base_pos)))
            } else {
                None
            };

            // Forward: the version footprint was seen earlier in the base.
            if let Some(Slot {
                side: Side::Base,
                offset,
            }) = table.get(version_bucket)
                && self.verify_footprint(offset, version_pos)?
            {
                let len = self.emit(offset, version_pos, version_start)?;
                trace!("forward match: base={offset} version={version_pos} len={len}");
                base_pos = offset + len;
                version_pos += len;
                version_start = version_pos;
                table.flush();
                self.matches += 1;
                continue;
            } else if favor_last {
                table.set(version_bucket, Slot::version(version_pos));
            }

            base_active = base_active && base_pos + d64 <= self.base_len;

            // Backward: the base footprint was seen earlier in the version,
            // no earlier than the pending ADD span.
            if let Some(base_bucket) = base_bucket.filter(|_| base_active) {
                if let Some(Slot {
                    side: Side::Version,
                    offset,
                }) = table.get(base_bucket)
                    && offset >= version_start
                    && self.verify_footprint(base_pos, offset)?
                {
                    let len = self.emit(base_pos, offset, version_start)?;
                    trace!("backward match: base={base_pos} version={offset} len={len}");
                    version_pos = offset + len;
                    base_pos += len;
                    version_start = version_pos;
                    table.flush();
                    self.matches += 1;
                    continue;
                } else if favor_last {
                    table.set(base_bucket, Slot::base(base_pos));
                }
            }

            version_pos += 1;
            base_pos += 1;
        }

        // Whatever follows the last match is literal.
        self.emit(self.base_len, self.version_len, version_start)?;

        debug!(
            "diff done: {} matches, {} bytes emitted",
            self.matches, self.emitted
        );
        Ok(self.emitted)
    }

    /// Byte-compare the footprints at `base_pos` and `version_pos`.
    fn verify_footprint(&mut self, base_pos: u64, version_pos: u64) -> Result<bool> {
        let d = self.opts.footprint_length() as u64;
        if base_pos + d > self.base_len || version_pos + d > self.version_len {
            return Ok(false);
        }
        for i in 0..d {
            if byte_in_bounds(&mut *self.base, base_pos + i)?
                != byte_in_bounds(&mut *self.version, version_pos + i)?
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Emit the ADD for `[version_start, version_pos)`, then the COPY found
    /// by extending `(base_pos, version_pos)` forward. Returns the COPY length.
    fn emit(&mut self, base_pos: u64, version_pos: u64, version_start: u64) -> Result<u64> {
        if version_pos > version_start {
            let len = (version_pos - version_start) as usize;
            let bytes = read_range(&mut *self.version, version_start, len)?;
            self.emitted += len as u64;
            self.sink.emit_add(bytes)?;
        }

        let len = self.extend(base_pos, version_pos)?;
        if len > 0 {
            self.emitted += len;
            self.sink.emit_copy(base_pos, len)?;
        }
        Ok(len)
    }

    /// Length of the common run starting at `(base_pos, version_pos)`.
    fn extend(&mut self, base_pos: u64, version_pos: u64) -> Result<u64> {
        let max = self
            .base_len
            .saturating_sub(base_pos)
            .min(self.version_len.saturating_sub(version_pos));
        let mut len = 0u64;
        while len < max
            && byte_in_bounds(&mut *self.base, base_pos + len)?
                == byte_in_bounds(&mut *self.version, version_pos + len)?
        {
            len += 1;
        }
        Ok(len)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
