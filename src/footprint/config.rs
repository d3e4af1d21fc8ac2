// Differ tuning parameters and their accepted ranges.

use crate::error::{DiffError, Result};

/// Default number of bytes hashed into one footprint.
pub const DEFAULT_FOOTPRINT_LENGTH: u32 = 8;

/// Smallest accepted footprint length.
pub const MIN_FOOTPRINT_LENGTH: u32 = 1;

/// Largest accepted footprint length (`power_d` must fit a 32-bit hash).
pub const MAX_FOOTPRINT_LENGTH: u32 = 31;

/// Default bucket count. Prime, for an even spread under `hash % size`.
pub const DEFAULT_TABLE_SIZE: usize = 1009;

/// Default hex-dump width used by the line projector.
pub const DEFAULT_BYTES_PER_LINE: usize = 16;

/// Validated differ configuration.
///
/// Fields are private so `power_d` can never disagree with
/// `footprint_length`; use the setters or `with_*` builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    footprint_length: u32,
    table_size: usize,
    favor_last_match: bool,
    power_d: u32,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            footprint_length: DEFAULT_FOOTPRINT_LENGTH,
            table_size: DEFAULT_TABLE_SIZE,
            favor_last_match: false,
            power_d: power_d(DEFAULT_FOOTPRINT_LENGTH),
        }
    }
}

impl DiffOptions {
    /// Bytes per footprint (1..=31).
    pub fn footprint_length(&self) -> u32 {
        self.footprint_length
    }

    /// `2^(footprint_length - 1)`, the weight of the byte leaving the window.
    pub fn power_d(&self) -> u32 {
        self.power_d
    }

    /// Number of footprint table buckets (>= 1).
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// Whether an occupied bucket is overwritten by the latest offset
    /// (`true`) or keeps the first one seen (`false`).
    pub fn favor_last_match(&self) -> bool {
        self.favor_last_match
    }

    pub fn set_footprint_length(&mut self, len: u32) -> Result<()> {
        if !(MIN_FOOTPRINT_LENGTH..=MAX_FOOTPRINT_LENGTH).contains(&len) {
            return Err(DiffError::OutOfRange {
                name: "footprint_length",
                value: len as u64,
                min: MIN_FOOTPRINT_LENGTH as u64,
                max: MAX_FOOTPRINT_LENGTH as u64,
            });
        }
        self.footprint_length = len;
        self.power_d = power_d(len);
        Ok(())
    }

    pub fn set_table_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(DiffError::OutOfRange {
                name: "table_size",
                value: 0,
                min: 1,
                max: usize::MAX as u64,
            });
        }
        self.table_size = size;
        Ok(())
    }

    pub fn set_favor_last_match(&mut self, favor: bool) {
        self.favor_last_match = favor;
    }

    pub fn with_footprint_length(mut self, len: u32) -> Result<Self> {
        self.set_footprint_length(len)?;
        Ok(self)
    }

    pub fn with_table_size(mut self, size: usize) -> Result<Self> {
        self.set_table_size(size)?;
        Ok(self)
    }

    pub fn with_favor_last_match(mut self, favor: bool) -> Self {
        self.favor_last_match = favor;
        self
    }
}

#[inline]
fn power_d(footprint_length: u32) -> u32 {
    1u32 << (footprint_length - 1)
}
