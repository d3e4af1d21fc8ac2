// Footprint table: a fixed number of buckets, each remembering one
// (stream side, offset) where a footprint hash was seen.
//
// Lookups insert into empty buckets and never overwrite, so the first
// offset wins unless the caller explicitly calls `set`. The whole table is
// flushed after every match because earlier offsets no longer line up with
// the advanced scan positions.

/// Which of the two compared streams a slot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Base,
    Version,
}

/// A remembered footprint position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub side: Side,
    pub offset: u64,
}

impl Slot {
    pub fn base(offset: u64) -> Self {
        Self {
            side: Side::Base,
            offset,
        }
    }

    pub fn version(offset: u64) -> Self {
        Self {
            side: Side::Version,
            offset,
        }
    }
}

/// Fixed-size table of optional slots indexed by `hash % size`.
pub struct FootprintTable {
    slots: Vec<Option<Slot>>,
}

impl FootprintTable {
    /// Allocate `size` empty buckets. `size` must be at least 1.
    pub fn new(size: usize) -> Self {
        debug_assert!(size > 0);
        Self {
            slots: vec![None; size.max(1)],
        }
    }

    #[inline(always)]
    pub fn bucket(&self, hash: u32) -> usize {
        (hash as u64 % self.slots.len() as u64) as usize
    }

    /// Return the bucket for `hash`, inserting `slot` first if it is empty.
    #[inline]
    pub fn get_or_insert(&mut self, hash: u32, slot: Slot) -> usize {
        let bucket = self.bucket(hash);
        self.slots[bucket].get_or_insert(slot);
        bucket
    }

    #[inline]
    pub fn get(&self, bucket: usize) -> Option<Slot> {
        self.slots[bucket]
    }

    /// Overwrite a bucket unconditionally.
    #[inline]
    pub fn set(&mut self, bucket: usize, slot: Slot) {
        self.slots[bucket] = Some(slot);
    }

    /// Empty every bucket.
    pub fn flush(&mut self) {
        self.slots.fill(None);
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied buckets.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
